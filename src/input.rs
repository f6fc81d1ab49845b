//! Keyboard input types shared by the switcher shortcut and the focus trap
//!
//! Browser `KeyboardEvent`s are converted into `KeyPress` at the host edge so
//! the engines can be driven identically from tests.

use std::fmt;
use std::str::FromStr;

bitflags::bitflags! {
    /// Modifier keys held during a key press
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct KeyModifiers: u8 {
        const NONE = 0b0000_0000;
        const SHIFT = 0b0000_0001;
        const CONTROL = 0b0000_0010;
        const ALT = 0b0000_0100;
        const META = 0b0000_1000;
    }
}

/// A key press as reported by the host (`KeyboardEvent.key` plus modifiers)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
    pub key: String,
    pub modifiers: KeyModifiers,
}

impl KeyPress {
    pub fn new(key: impl Into<String>, modifiers: KeyModifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
        }
    }

    pub fn plain(key: impl Into<String>) -> Self {
        Self::new(key, KeyModifiers::NONE)
    }

    pub fn tab() -> Self {
        Self::plain("Tab")
    }

    pub fn shift_tab() -> Self {
        Self::new("Tab", KeyModifiers::SHIFT)
    }

    pub fn is_tab(&self) -> bool {
        self.key == "Tab"
    }

    pub fn shift(&self) -> bool {
        self.modifiers.contains(KeyModifiers::SHIFT)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyComboError {
    #[error("key combination is empty")]
    Empty,
    #[error("unknown modifier '{0}'")]
    UnknownModifier(String),
}

/// A configurable shortcut such as `Alt+T`
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyCombo {
    pub key: String,
    pub modifiers: KeyModifiers,
}

impl KeyCombo {
    /// Exact modifier match; the key compares case-insensitively
    pub fn matches(&self, press: &KeyPress) -> bool {
        press.modifiers == self.modifiers && press.key.eq_ignore_ascii_case(&self.key)
    }
}

impl FromStr for KeyCombo {
    type Err = KeyComboError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts: Vec<&str> = s.split('+').map(str::trim).collect();
        let key = match parts.pop() {
            Some(key) if !key.is_empty() => key.to_string(),
            _ => return Err(KeyComboError::Empty),
        };

        let mut modifiers = KeyModifiers::NONE;
        for part in parts {
            modifiers |= match part.to_ascii_lowercase().as_str() {
                "alt" | "option" => KeyModifiers::ALT,
                "ctrl" | "control" => KeyModifiers::CONTROL,
                "shift" => KeyModifiers::SHIFT,
                "meta" | "cmd" | "super" => KeyModifiers::META,
                _ => return Err(KeyComboError::UnknownModifier(part.to_string())),
            };
        }
        Ok(Self { key, modifiers })
    }
}

impl TryFrom<String> for KeyCombo {
    type Error = KeyComboError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<KeyCombo> for String {
    fn from(combo: KeyCombo) -> Self {
        combo.to_string()
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (flag, name) in [
            (KeyModifiers::CONTROL, "Ctrl"),
            (KeyModifiers::ALT, "Alt"),
            (KeyModifiers::SHIFT, "Shift"),
            (KeyModifiers::META, "Meta"),
        ] {
            if self.modifiers.contains(flag) {
                write!(f, "{}+", name)?;
            }
        }
        write!(f, "{}", self.key)
    }
}
