//! Accessibility settings record and its persistence
//!
//! Stored as one flat camelCase JSON object under a single storage key.
//! Reads are forward compatible: missing fields take their defaults, while
//! an unreadable blob (bad JSON, wrong field types) reads as all defaults.

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

use crate::host::KeyValueStore;

/// Reading font selected in the settings panel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum FontFamily {
    #[default]
    Default,
    #[serde(rename = "opendyslexic")]
    OpenDyslexic,
    Atkinson,
    ComicSans,
    Verdana,
    Arial,
    Tahoma,
}

impl FontFamily {
    pub const ALL: [FontFamily; 7] = [
        FontFamily::Default,
        FontFamily::OpenDyslexic,
        FontFamily::Atkinson,
        FontFamily::ComicSans,
        FontFamily::Verdana,
        FontFamily::Arial,
        FontFamily::Tahoma,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FontFamily::Default => "default",
            FontFamily::OpenDyslexic => "opendyslexic",
            FontFamily::Atkinson => "atkinson",
            FontFamily::ComicSans => "comic-sans",
            FontFamily::Verdana => "verdana",
            FontFamily::Arial => "arial",
            FontFamily::Tahoma => "tahoma",
        }
    }

    /// Unknown names read as `Default`
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|family| family.as_str() == name)
            .unwrap_or_default()
    }

    /// Body class for this font, `None` for the stylesheet default
    pub fn class_name(self) -> Option<String> {
        match self {
            FontFamily::Default => None,
            other => Some(format!("a11y-font-{}", other.as_str())),
        }
    }
}

impl<'de> Deserialize<'de> for FontFamily {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(FontFamily::from_name(&name))
    }
}

/// User accessibility preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct AccessibilitySettings {
    pub text_only: bool,
    pub highlight_links: bool,
    pub dyslexia_font: bool,
    pub font_family: FontFamily,
    /// Root font size in percent
    pub font_size: u32,
    /// Extra letter spacing in 0.05em steps
    pub letter_spacing: u32,
    /// Extra word spacing in 0.05em steps
    pub word_spacing: u32,
    /// Line height in percent; 100 keeps the stylesheet value
    pub line_height: u32,
    /// Settings-panel theme name, resolved to a catalog id through the alias table
    pub theme: String,
    pub reduce_motion: bool,
    pub enhanced_focus: bool,
    pub screen_reader_mode: bool,
}

impl Default for AccessibilitySettings {
    fn default() -> Self {
        Self {
            text_only: false,
            highlight_links: false,
            dyslexia_font: false,
            font_family: FontFamily::Default,
            font_size: 100,
            letter_spacing: 0,
            word_spacing: 0,
            line_height: 100,
            theme: "default".to_string(),
            reduce_motion: false,
            enhanced_focus: false,
            screen_reader_mode: false,
        }
    }
}

impl AccessibilitySettings {
    /// Parse a persisted blob, falling back to defaults when it is unreadable
    pub fn from_json_or_default(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::debug!("Ignoring unreadable accessibility settings: {}", e);
                Self::default()
            }
        }
    }
}

/// Read the settings stored under `key`
pub fn load_settings(store: &dyn KeyValueStore, key: &str) -> AccessibilitySettings {
    match store.get(key) {
        Ok(Some(json)) => AccessibilitySettings::from_json_or_default(&json),
        Ok(None) => AccessibilitySettings::default(),
        Err(e) => {
            tracing::debug!("Could not read accessibility settings: {}", e);
            AccessibilitySettings::default()
        }
    }
}

/// Persist the full record under `key`; failures are logged and dropped
pub fn save_settings(store: &dyn KeyValueStore, key: &str, settings: &AccessibilitySettings) {
    let json = match serde_json::to_string(settings) {
        Ok(json) => json,
        Err(e) => {
            tracing::warn!("Failed to serialize accessibility settings: {}", e);
            return;
        }
    };
    if let Err(e) = store.set(key, &json) {
        tracing::debug!("Could not save accessibility settings: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryStore;

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(AccessibilitySettings::default()).unwrap();
        assert_eq!(json["textOnly"], false);
        assert_eq!(json["fontFamily"], "default");
        assert_eq!(json["fontSize"], 100);
        assert_eq!(json["screenReaderMode"], false);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let settings =
            AccessibilitySettings::from_json_or_default(r#"{"fontSize":130,"theme":"dark"}"#);
        assert_eq!(settings.font_size, 130);
        assert_eq!(settings.theme, "dark");
        assert_eq!(settings.line_height, 100);
        assert!(!settings.enhanced_focus);
    }

    #[test]
    fn test_unknown_font_family_reads_as_default() {
        let json = r#"{"fontFamily":"papyrus","fontSize":120}"#;
        let settings = AccessibilitySettings::from_json_or_default(json);
        assert_eq!(settings.font_family, FontFamily::Default);
        assert_eq!(settings.font_size, 120);
    }

    #[test]
    fn test_malformed_blob_reads_as_defaults() {
        for blob in ["not json", r#"{"fontSize":"big"}"#, "[]"] {
            assert_eq!(
                AccessibilitySettings::from_json_or_default(blob),
                AccessibilitySettings::default(),
                "{}",
                blob
            );
        }
    }

    #[test]
    fn test_font_class_names() {
        assert_eq!(FontFamily::Default.class_name(), None);
        assert_eq!(
            FontFamily::ComicSans.class_name().as_deref(),
            Some("a11y-font-comic-sans")
        );
        assert_eq!(FontFamily::from_name("opendyslexic"), FontFamily::OpenDyslexic);
    }

    #[test]
    fn test_storage_failures_are_tolerated() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        assert_eq!(load_settings(&store, "a11y-settings"), AccessibilitySettings::default());
        save_settings(&store, "a11y-settings", &AccessibilitySettings::default());

        store.set_unavailable(false);
        store.set_quota_exceeded(true);
        save_settings(&store, "a11y-settings", &AccessibilitySettings::default());
        assert_eq!(store.peek("a11y-settings"), None);
    }
}
