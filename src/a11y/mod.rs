//! Accessibility settings: the persisted record, presets, the engine that
//! applies them, and the focus trap used by the settings panel

mod engine;
mod focus_trap;
mod presets;
mod settings;

pub use engine::{
    format_slider_value, spacing_em, AccessibilityEngine, ApplyOutcome, SliderField, Toggle,
    USING_KEYBOARD_CLASS,
};
pub use focus_trap::{FocusTrap, TRAP_ACTIVE_CLASS, TRAP_ATTRIBUTE};
pub use presets::{builtin_preset, builtin_presets, PresetRecord, CLEAR_PRESET};
pub use settings::{load_settings, save_settings, AccessibilitySettings, FontFamily};
