//! Named partial overrides of the settings record
//!
//! Applying a preset merges its fields over the current settings; fields the
//! preset leaves out keep their current values. `clear` sets every field and
//! so doubles as a full reset.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::settings::{AccessibilitySettings, FontFamily};

/// Name of the preset that restores every field to its default
pub const CLEAR_PRESET: &str = "clear";

/// A partial `AccessibilitySettings`; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct PresetRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight_links: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dyslexia_font: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<FontFamily>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_spacing: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reduce_motion: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enhanced_focus: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen_reader_mode: Option<bool>,
}

impl PresetRecord {
    /// Preset setting every field to `settings`
    pub fn full(settings: &AccessibilitySettings) -> Self {
        Self {
            text_only: Some(settings.text_only),
            highlight_links: Some(settings.highlight_links),
            dyslexia_font: Some(settings.dyslexia_font),
            font_family: Some(settings.font_family),
            font_size: Some(settings.font_size),
            letter_spacing: Some(settings.letter_spacing),
            word_spacing: Some(settings.word_spacing),
            line_height: Some(settings.line_height),
            theme: Some(settings.theme.clone()),
            reduce_motion: Some(settings.reduce_motion),
            enhanced_focus: Some(settings.enhanced_focus),
            screen_reader_mode: Some(settings.screen_reader_mode),
        }
    }

    /// `base` with every field this preset sets replaced
    pub fn merge_over(&self, base: &AccessibilitySettings) -> AccessibilitySettings {
        let mut merged = base.clone();
        if let Some(v) = self.text_only {
            merged.text_only = v;
        }
        if let Some(v) = self.highlight_links {
            merged.highlight_links = v;
        }
        if let Some(v) = self.dyslexia_font {
            merged.dyslexia_font = v;
        }
        if let Some(v) = self.font_family {
            merged.font_family = v;
        }
        if let Some(v) = self.font_size {
            merged.font_size = v;
        }
        if let Some(v) = self.letter_spacing {
            merged.letter_spacing = v;
        }
        if let Some(v) = self.word_spacing {
            merged.word_spacing = v;
        }
        if let Some(v) = self.line_height {
            merged.line_height = v;
        }
        if let Some(v) = &self.theme {
            merged.theme = v.clone();
        }
        if let Some(v) = self.reduce_motion {
            merged.reduce_motion = v;
        }
        if let Some(v) = self.enhanced_focus {
            merged.enhanced_focus = v;
        }
        if let Some(v) = self.screen_reader_mode {
            merged.screen_reader_mode = v;
        }
        merged
    }
}

/// Built-in presets in panel order
pub fn builtin_presets() -> Vec<(&'static str, PresetRecord)> {
    vec![
        (
            "dyslexia",
            PresetRecord {
                font_family: Some(FontFamily::OpenDyslexic),
                font_size: Some(110),
                letter_spacing: Some(3),
                word_spacing: Some(4),
                line_height: Some(150),
                ..PresetRecord::default()
            },
        ),
        (
            "low-vision",
            PresetRecord {
                font_size: Some(150),
                theme: Some("high-contrast".to_string()),
                enhanced_focus: Some(true),
                ..PresetRecord::default()
            },
        ),
        (
            "color-blind",
            PresetRecord {
                theme: Some("deuteranopia".to_string()),
                ..PresetRecord::default()
            },
        ),
        (
            "motor",
            PresetRecord {
                enhanced_focus: Some(true),
                font_size: Some(120),
                reduce_motion: Some(true),
                ..PresetRecord::default()
            },
        ),
        (
            "cognitive",
            PresetRecord {
                reduce_motion: Some(true),
                font_size: Some(110),
                line_height: Some(160),
                ..PresetRecord::default()
            },
        ),
        (
            CLEAR_PRESET,
            PresetRecord::full(&AccessibilitySettings::default()),
        ),
    ]
}

/// Built-in preset by name
pub fn builtin_preset(name: &str) -> Option<PresetRecord> {
    builtin_presets()
        .into_iter()
        .find_map(|(preset_name, record)| (preset_name == name).then_some(record))
}
