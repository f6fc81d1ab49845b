//! Engine configuration
//!
//! Every field has a default matching the site's shipped behavior, so an
//! empty JSON object (or no config at all) yields a working engine.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use crate::input::KeyCombo;
use crate::theme::{default_preview_sources, ThemeDescriptor, PreviewSource, BUILTIN_THEMES};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Storage keys used by the engines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct StorageKeys {
    /// Key holding the accessibility settings JSON blob
    pub settings: String,
    /// Key holding the chosen theme id
    pub theme: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            settings: "a11y-settings".to_string(),
            theme: "color-theme".to_string(),
        }
    }
}

/// Configuration for the theme switcher and the accessibility engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct EngineConfig {
    /// Theme used on cold start and when a persisted id is unknown
    pub default_theme: String,

    /// Theme catalog, in cycling order
    pub themes: Vec<ThemeDescriptor>,

    /// Persisted ids from older releases and the id each now maps to
    pub legacy_theme_ids: BTreeMap<String, String>,

    /// Settings-panel theme names and the catalog id each selects.
    /// Names without an alias are passed to the switcher unchanged.
    pub theme_aliases: BTreeMap<String, String>,

    pub storage: StorageKeys,

    /// Element id of the live theme stylesheet link
    pub link_element_id: String,

    /// Element id of the polite live region used for announcements
    pub announcer_element_id: String,

    /// How long an announcement stays in the live region
    pub announcement_clear_ms: u64,

    /// Delay before reading the computed background for `<meta name="theme-color">`
    pub theme_color_delay_ms: u64,

    /// Computed root properties tried in order for the mobile theme color
    pub theme_color_properties: Vec<String>,

    /// Mobile theme color when no property resolves
    pub theme_color_fallback: String,

    /// Shortcut that cycles to the next theme
    #[schemars(with = "String")]
    pub cycle_shortcut: KeyCombo,

    /// Resolve listeners of superseded switches with `ThemeError::Superseded`
    /// instead of running their success path
    pub supersede_stale_switches: bool,

    /// Stylesheets scanned for theme card preview swatches
    pub preview_sources: Vec<PreviewSource>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let theme_aliases = [
            "dark",
            "cream",
            "high-contrast",
            "protanopia",
            "deuteranopia",
            "tritanopia",
            "monochrome",
        ]
        .into_iter()
        .map(|name| (name.to_string(), format!("a11y-{}", name)))
        .collect();

        Self {
            default_theme: "default".to_string(),
            themes: BUILTIN_THEMES.iter().map(ThemeDescriptor::from).collect(),
            legacy_theme_ids: BTreeMap::from([(
                "walking-with-a-smile".to_string(),
                "default".to_string(),
            )]),
            theme_aliases,
            storage: StorageKeys::default(),
            link_element_id: "dynamic-theme-css".to_string(),
            announcer_element_id: "theme-announcer".to_string(),
            announcement_clear_ms: 1000,
            theme_color_delay_ms: 50,
            theme_color_properties: vec![
                "--page-bg".to_string(),
                "--color-Primary-500".to_string(),
            ],
            theme_color_fallback: "#8FA68A".to_string(),
            cycle_shortcut: KeyCombo {
                key: "t".to_string(),
                modifiers: crate::input::KeyModifiers::ALT,
            },
            supersede_stale_switches: false,
            preview_sources: default_preview_sources(),
        }
    }
}

impl EngineConfig {
    /// Parse a JSON config; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON config file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn announcement_clear_after(&self) -> Duration {
        Duration::from_millis(self.announcement_clear_ms)
    }

    pub fn theme_color_delay(&self) -> Duration {
        Duration::from_millis(self.theme_color_delay_ms)
    }

    /// Catalog id for a settings-panel theme name
    pub fn resolve_theme_alias<'a>(&'a self, name: &'a str) -> &'a str {
        self.theme_aliases
            .get(name)
            .map(String::as_str)
            .unwrap_or(name)
    }
}
