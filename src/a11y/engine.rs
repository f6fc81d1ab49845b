//! Accessibility settings engine
//!
//! Applies an `AccessibilitySettings` record to the document: toggle classes
//! on `<body>`, one font class at most, inline font size and spacing styles,
//! and a theme request delegated to the `ThemeSwitcher`. Applying is
//! idempotent; the engine never reads document state back.

use std::cell::RefCell;
use std::collections::BTreeMap;

use super::presets::{builtin_presets, PresetRecord, CLEAR_PRESET};
use super::settings::{load_settings, save_settings, AccessibilitySettings, FontFamily};
use crate::config::EngineConfig;
use crate::host::{DocTarget, Host};
use crate::input::KeyPress;
use crate::theme::{SwitchHandle, ThemeSwitcher};

/// Body class added while the user navigates with the keyboard
pub const USING_KEYBOARD_CLASS: &str = "using-keyboard";

const SETTINGS_UPDATED: &str = "Accessibility settings updated";

/// Boolean settings, each projected as one body class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Toggle {
    TextOnly,
    HighlightLinks,
    DyslexiaFont,
    ReduceMotion,
    EnhancedFocus,
    ScreenReaderMode,
}

impl Toggle {
    pub const ALL: [Toggle; 6] = [
        Toggle::TextOnly,
        Toggle::HighlightLinks,
        Toggle::DyslexiaFont,
        Toggle::ReduceMotion,
        Toggle::EnhancedFocus,
        Toggle::ScreenReaderMode,
    ];

    pub fn class_name(self) -> &'static str {
        match self {
            Toggle::TextOnly => "a11y-text-only",
            Toggle::HighlightLinks => "a11y-highlight-links",
            Toggle::DyslexiaFont => "a11y-dyslexia-font",
            Toggle::ReduceMotion => "a11y-reduce-motion",
            Toggle::EnhancedFocus => "a11y-enhanced-focus",
            Toggle::ScreenReaderMode => "a11y-screen-reader-mode",
        }
    }

    /// Settings record field name (`textOnly`, ...)
    pub fn name(self) -> &'static str {
        match self {
            Toggle::TextOnly => "textOnly",
            Toggle::HighlightLinks => "highlightLinks",
            Toggle::DyslexiaFont => "dyslexiaFont",
            Toggle::ReduceMotion => "reduceMotion",
            Toggle::EnhancedFocus => "enhancedFocus",
            Toggle::ScreenReaderMode => "screenReaderMode",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|toggle| toggle.name() == name)
    }

    pub fn get(self, settings: &AccessibilitySettings) -> bool {
        match self {
            Toggle::TextOnly => settings.text_only,
            Toggle::HighlightLinks => settings.highlight_links,
            Toggle::DyslexiaFont => settings.dyslexia_font,
            Toggle::ReduceMotion => settings.reduce_motion,
            Toggle::EnhancedFocus => settings.enhanced_focus,
            Toggle::ScreenReaderMode => settings.screen_reader_mode,
        }
    }

    fn set(self, settings: &mut AccessibilitySettings, on: bool) {
        let field = match self {
            Toggle::TextOnly => &mut settings.text_only,
            Toggle::HighlightLinks => &mut settings.highlight_links,
            Toggle::DyslexiaFont => &mut settings.dyslexia_font,
            Toggle::ReduceMotion => &mut settings.reduce_motion,
            Toggle::EnhancedFocus => &mut settings.enhanced_focus,
            Toggle::ScreenReaderMode => &mut settings.screen_reader_mode,
        };
        *field = on;
    }
}

/// Numeric settings driven by sliders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SliderField {
    FontSize,
    LetterSpacing,
    WordSpacing,
    LineHeight,
}

impl SliderField {
    pub const ALL: [SliderField; 4] = [
        SliderField::FontSize,
        SliderField::LetterSpacing,
        SliderField::WordSpacing,
        SliderField::LineHeight,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SliderField::FontSize => "fontSize",
            SliderField::LetterSpacing => "letterSpacing",
            SliderField::WordSpacing => "wordSpacing",
            SliderField::LineHeight => "lineHeight",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }

    pub fn get(self, settings: &AccessibilitySettings) -> u32 {
        match self {
            SliderField::FontSize => settings.font_size,
            SliderField::LetterSpacing => settings.letter_spacing,
            SliderField::WordSpacing => settings.word_spacing,
            SliderField::LineHeight => settings.line_height,
        }
    }

    fn set(self, settings: &mut AccessibilitySettings, value: u32) {
        match self {
            SliderField::FontSize => settings.font_size = value,
            SliderField::LetterSpacing => settings.letter_spacing = value,
            SliderField::WordSpacing => settings.word_spacing = value,
            SliderField::LineHeight => settings.line_height = value,
        }
    }
}

/// Label shown next to a slider
pub fn format_slider_value(field: SliderField, value: u32) -> String {
    match field {
        SliderField::FontSize => format!("{}%", value),
        SliderField::LetterSpacing | SliderField::WordSpacing => {
            if value == 0 {
                "Normal".to_string()
            } else {
                format!("+{}", value)
            }
        }
        SliderField::LineHeight => {
            if value == 100 {
                "Normal".to_string()
            } else {
                format!("{}%", value)
            }
        }
    }
}

/// CSS length for a spacing step count (one step is 0.05em)
pub fn spacing_em(steps: u32) -> String {
    let hundredths = u64::from(steps) * 5;
    let whole = hundredths / 100;
    let fraction = hundredths % 100;
    if fraction == 0 {
        format!("{}em", whole)
    } else {
        let digits = format!("{:02}", fraction);
        format!("{}.{}em", whole, digits.trim_end_matches('0'))
    }
}

/// Result of applying a settings record
#[derive(Debug)]
pub struct ApplyOutcome {
    /// Theme switch requested for `settings.theme`; applying never waits on it
    pub theme_switch: SwitchHandle,
}

/// Settings engine bound to a host and a theme switcher
pub struct AccessibilityEngine {
    host: Host,
    config: EngineConfig,
    switcher: ThemeSwitcher,
    settings: RefCell<AccessibilitySettings>,
    presets: RefCell<BTreeMap<String, PresetRecord>>,
}

impl AccessibilityEngine {
    pub fn new(host: Host, config: EngineConfig, switcher: ThemeSwitcher) -> Self {
        let presets = builtin_presets()
            .into_iter()
            .map(|(name, record)| (name.to_string(), record))
            .collect();
        Self {
            host,
            config,
            switcher,
            settings: RefCell::new(AccessibilitySettings::default()),
            presets: RefCell::new(presets),
        }
    }

    pub fn switcher(&self) -> &ThemeSwitcher {
        &self.switcher
    }

    /// Settings most recently restored or changed through this engine
    pub fn settings(&self) -> AccessibilitySettings {
        self.settings.borrow().clone()
    }

    /// Read persisted settings, defaults filling anything missing
    pub fn load(&self) -> AccessibilitySettings {
        load_settings(self.host.store.as_ref(), &self.config.storage.settings)
    }

    pub fn save(&self, settings: &AccessibilitySettings) {
        save_settings(self.host.store.as_ref(), &self.config.storage.settings, settings);
    }

    /// Load persisted settings and apply them (page load)
    pub fn restore(&self) -> ApplyOutcome {
        let settings = self.load();
        *self.settings.borrow_mut() = settings.clone();
        self.apply(&settings)
    }

    /// Project `settings` onto the document
    pub fn apply(&self, settings: &AccessibilitySettings) -> ApplyOutcome {
        let dom = &self.host.dom;

        for toggle in Toggle::ALL {
            dom.toggle_class(DocTarget::Body, toggle.class_name(), toggle.get(settings));
        }

        for family in FontFamily::ALL {
            if let Some(class) = family.class_name() {
                dom.remove_class(DocTarget::Body, &class);
            }
        }
        if let Some(class) = settings.font_family.class_name() {
            dom.add_class(DocTarget::Body, &class);
        }

        dom.set_style(DocTarget::Root, "font-size", &format!("{}%", settings.font_size));
        self.apply_spacing("letter-spacing", settings.letter_spacing);
        self.apply_spacing("word-spacing", settings.word_spacing);
        if settings.line_height > 100 {
            dom.set_style(DocTarget::Body, "line-height", &format!("{}%", settings.line_height));
        } else {
            dom.clear_style(DocTarget::Body, "line-height");
        }

        let theme_id = self.config.resolve_theme_alias(&settings.theme);
        let theme_switch = self.switcher.switch_theme(theme_id);

        if settings.screen_reader_mode {
            self.switcher.announcer().announce(SETTINGS_UPDATED);
        }
        tracing::debug!("Applied accessibility settings");

        ApplyOutcome { theme_switch }
    }

    fn apply_spacing(&self, property: &str, steps: u32) {
        if steps > 0 {
            self.host
                .dom
                .set_style(DocTarget::Body, property, &spacing_em(steps));
        } else {
            self.host.dom.clear_style(DocTarget::Body, property);
        }
    }

    /// Replace the current settings, persist and apply
    pub fn update(&self, settings: AccessibilitySettings) -> ApplyOutcome {
        self.save(&settings);
        *self.settings.borrow_mut() = settings.clone();
        self.apply(&settings)
    }

    fn modify(&self, change: impl FnOnce(&mut AccessibilitySettings)) -> ApplyOutcome {
        let mut settings = self.settings();
        change(&mut settings);
        self.update(settings)
    }

    pub fn set_toggle(&self, toggle: Toggle, on: bool) -> ApplyOutcome {
        self.modify(|settings| toggle.set(settings, on))
    }

    pub fn set_slider(&self, field: SliderField, value: u32) -> ApplyOutcome {
        self.modify(|settings| field.set(settings, value))
    }

    pub fn set_font_family(&self, family: FontFamily) -> ApplyOutcome {
        self.modify(|settings| settings.font_family = family)
    }

    /// Select a settings-panel theme name (`dark`, `cream`, ...)
    pub fn set_theme(&self, theme: &str) -> ApplyOutcome {
        self.modify(|settings| settings.theme = theme.to_string())
    }

    /// Merge a named preset over the current settings, persist and apply.
    /// Unknown names change nothing and return `None`.
    pub fn apply_preset(&self, name: &str) -> Option<ApplyOutcome> {
        let Some(preset) = self.presets.borrow().get(name).cloned() else {
            tracing::debug!("Unknown accessibility preset: {}", name);
            return None;
        };
        let merged = preset.merge_over(&self.settings.borrow());
        Some(self.update(merged))
    }

    /// Restore every field to its default
    pub fn reset(&self) -> ApplyOutcome {
        match self.apply_preset(CLEAR_PRESET) {
            Some(outcome) => outcome,
            None => self.update(AccessibilitySettings::default()),
        }
    }

    /// Add or replace a named preset
    pub fn register_preset(&self, name: &str, preset: PresetRecord) {
        self.presets.borrow_mut().insert(name.to_string(), preset);
    }

    pub fn preset_names(&self) -> Vec<String> {
        self.presets.borrow().keys().cloned().collect()
    }

    /// Document keydown: Tab marks keyboard navigation
    pub fn handle_key_down(&self, key: &KeyPress) {
        if key.is_tab() {
            self.host.dom.add_class(DocTarget::Body, USING_KEYBOARD_CLASS);
        }
    }

    /// Document mousedown ends keyboard navigation mode
    pub fn handle_mouse_down(&self) {
        self.host
            .dom
            .remove_class(DocTarget::Body, USING_KEYBOARD_CLASS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Dom, MemoryHost};

    fn engine(host: &MemoryHost) -> AccessibilityEngine {
        let config = EngineConfig::default();
        let switcher = ThemeSwitcher::new(host.host(), config.clone());
        host.dom.ensure_theme_link(&config.link_element_id);
        AccessibilityEngine::new(host.host(), config, switcher)
    }

    #[test]
    fn test_spacing_em() {
        assert_eq!(spacing_em(1), "0.05em");
        assert_eq!(spacing_em(3), "0.15em");
        assert_eq!(spacing_em(4), "0.2em");
        assert_eq!(spacing_em(20), "1em");
        assert_eq!(spacing_em(25), "1.25em");
    }

    #[test]
    fn test_field_names_match_record() {
        let json = serde_json::to_value(AccessibilitySettings::default()).unwrap();
        for toggle in Toggle::ALL {
            assert!(json.get(toggle.name()).is_some(), "{}", toggle.name());
            assert_eq!(Toggle::from_name(toggle.name()), Some(toggle));
        }
        for field in SliderField::ALL {
            assert!(json.get(field.name()).is_some(), "{}", field.name());
            assert_eq!(SliderField::from_name(field.name()), Some(field));
        }
        assert_eq!(Toggle::from_name("fontSize"), None);
    }

    #[test]
    fn test_format_slider_value() {
        assert_eq!(format_slider_value(SliderField::FontSize, 120), "120%");
        assert_eq!(format_slider_value(SliderField::LetterSpacing, 0), "Normal");
        assert_eq!(format_slider_value(SliderField::WordSpacing, 4), "+4");
        assert_eq!(format_slider_value(SliderField::LineHeight, 100), "Normal");
        assert_eq!(format_slider_value(SliderField::LineHeight, 150), "150%");
    }

    #[test]
    fn test_apply_projects_settings() {
        let host = MemoryHost::new();
        let engine = engine(&host);
        let settings = AccessibilitySettings {
            text_only: true,
            reduce_motion: true,
            font_family: FontFamily::Atkinson,
            font_size: 125,
            letter_spacing: 2,
            line_height: 140,
            ..AccessibilitySettings::default()
        };
        engine.apply(&settings);

        let dom = &host.dom;
        assert!(dom.has_class(DocTarget::Body, "a11y-text-only"));
        assert!(dom.has_class(DocTarget::Body, "a11y-reduce-motion"));
        assert!(!dom.has_class(DocTarget::Body, "a11y-enhanced-focus"));
        assert!(dom.has_class(DocTarget::Body, "a11y-font-atkinson"));
        assert_eq!(dom.style(DocTarget::Root, "font-size").as_deref(), Some("125%"));
        assert_eq!(dom.style(DocTarget::Body, "letter-spacing").as_deref(), Some("0.1em"));
        assert_eq!(dom.style(DocTarget::Body, "word-spacing"), None);
        assert_eq!(dom.style(DocTarget::Body, "line-height").as_deref(), Some("140%"));
    }

    #[test]
    fn test_apply_is_idempotent() {
        let host = MemoryHost::new();
        let engine = engine(&host);
        let settings = AccessibilitySettings {
            highlight_links: true,
            font_family: FontFamily::Verdana,
            word_spacing: 4,
            ..AccessibilitySettings::default()
        };
        engine.apply(&settings);
        host.dom.complete_link_load();
        let classes = host.dom.classes(DocTarget::Body);
        let writes = host.dom.href_writes();

        engine.apply(&settings);
        assert_eq!(host.dom.classes(DocTarget::Body), classes);
        assert_eq!(host.dom.href_writes(), writes);
    }

    #[test]
    fn test_zero_spacing_and_normal_line_height_clear_styles() {
        let host = MemoryHost::new();
        let engine = engine(&host);
        engine.set_slider(SliderField::WordSpacing, 3);
        engine.set_slider(SliderField::LineHeight, 160);
        assert!(host.dom.style(DocTarget::Body, "word-spacing").is_some());

        engine.set_slider(SliderField::WordSpacing, 0);
        engine.set_slider(SliderField::LineHeight, 100);
        assert_eq!(host.dom.style(DocTarget::Body, "word-spacing"), None);
        assert_eq!(host.dom.style(DocTarget::Body, "line-height"), None);
    }

    #[test]
    fn test_theme_is_delegated_through_alias() {
        let host = MemoryHost::new();
        let engine = engine(&host);
        let mut outcome = engine.set_theme("dark");
        assert_eq!(outcome.theme_switch.theme(), "a11y-dark");
        assert_eq!(engine.switcher().current_theme().as_deref(), Some("a11y-dark"));
        host.dom.complete_link_load();
        assert_eq!(outcome.theme_switch.try_result(), Some(Ok("a11y-dark".to_string())));
    }

    #[test]
    fn test_setters_persist() {
        let host = MemoryHost::new();
        let engine = engine(&host);
        engine.set_toggle(Toggle::EnhancedFocus, true);
        engine.set_font_family(FontFamily::Tahoma);

        let stored = engine.load();
        assert!(stored.enhanced_focus);
        assert_eq!(stored.font_family, FontFamily::Tahoma);
        assert_eq!(engine.settings(), stored);
    }

    #[test]
    fn test_screen_reader_mode_announces() {
        let host = MemoryHost::new();
        let engine = engine(&host);
        engine.switcher().announcer().ensure_region();
        engine.set_toggle(Toggle::ScreenReaderMode, true);
        assert_eq!(
            host.dom.live_region_text("theme-announcer").as_deref(),
            Some("Accessibility settings updated")
        );
    }

    #[test]
    fn test_unknown_preset_changes_nothing() {
        let host = MemoryHost::new();
        let engine = engine(&host);
        assert!(engine.apply_preset("sparkly").is_none());
        assert_eq!(host.store.writes(), 0);
        assert!(host.dom.classes(DocTarget::Body).is_empty());
    }

    #[test]
    fn test_reset_clears_and_persists() {
        let host = MemoryHost::new();
        let engine = engine(&host);
        engine.apply_preset("dyslexia").unwrap();
        assert!(host.dom.has_class(DocTarget::Body, "a11y-font-opendyslexic"));

        engine.reset();
        assert_eq!(engine.settings(), AccessibilitySettings::default());
        assert_eq!(engine.load(), AccessibilitySettings::default());
        assert!(!host.dom.has_class(DocTarget::Body, "a11y-font-opendyslexic"));
        assert_eq!(host.dom.style(DocTarget::Root, "font-size").as_deref(), Some("100%"));
    }

    #[test]
    fn test_keyboard_detection() {
        let host = MemoryHost::new();
        let engine = engine(&host);
        engine.handle_key_down(&KeyPress::plain("a"));
        assert!(!host.dom.has_class(DocTarget::Body, USING_KEYBOARD_CLASS));
        engine.handle_key_down(&KeyPress::shift_tab());
        assert!(host.dom.has_class(DocTarget::Body, USING_KEYBOARD_CLASS));
        engine.handle_mouse_down();
        assert!(!host.dom.has_class(DocTarget::Body, USING_KEYBOARD_CLASS));
    }
}
