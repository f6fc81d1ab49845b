//! Event adapter for converting browser keyboard events into `KeyPress`
//!
//! The engines only understand `crate::input::KeyPress`. This module
//! translates `KeyboardEvent.key` and its modifier flags at the page edge.

use web_sys::KeyboardEvent;

use crate::input::{KeyModifiers, KeyPress};

/// Modifier flags as reported on a DOM keyboard event
pub fn modifiers_from_flags(shift: bool, ctrl: bool, alt: bool, meta: bool) -> KeyModifiers {
    let mut modifiers = KeyModifiers::NONE;
    if shift {
        modifiers |= KeyModifiers::SHIFT;
    }
    if ctrl {
        modifiers |= KeyModifiers::CONTROL;
    }
    if alt {
        modifiers |= KeyModifiers::ALT;
    }
    if meta {
        modifiers |= KeyModifiers::META;
    }
    modifiers
}

/// Convert a DOM keyboard event
pub fn key_press_from_event(event: &KeyboardEvent) -> KeyPress {
    KeyPress::new(
        event.key(),
        modifiers_from_flags(
            event.shift_key(),
            event.ctrl_key(),
            event.alt_key(),
            event.meta_key(),
        ),
    )
}
