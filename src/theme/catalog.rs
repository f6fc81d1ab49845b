//! Theme catalog - ordered id to stylesheet mapping
//!
//! Registration order is the enumeration order used by theme pickers and by
//! `ThemeSwitcher::cycle_theme`. Re-registering an id replaces its descriptor
//! in place.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::error::ThemeError;

/// A theme known to the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ThemeDescriptor {
    pub id: String,
    pub stylesheet_url: String,
    /// Human-readable name used in announcements
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ThemeDescriptor {
    pub fn new(id: impl Into<String>, stylesheet_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            stylesheet_url: stylesheet_url.into(),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Label if present, otherwise the id
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

/// A theme shipped with the site
#[derive(Debug, Clone, Copy)]
pub struct BuiltinTheme {
    pub id: &'static str,
    pub stylesheet_url: &'static str,
    pub label: &'static str,
}

impl From<&BuiltinTheme> for ThemeDescriptor {
    fn from(theme: &BuiltinTheme) -> Self {
        ThemeDescriptor::new(theme.id, theme.stylesheet_url).with_label(theme.label)
    }
}

/// Shipped themes: the brand theme first, then the accessibility themes
pub const BUILTIN_THEMES: &[BuiltinTheme] = &[
    BuiltinTheme {
        id: "default",
        stylesheet_url: "/src/styles/themes/brand/BrandDefault.css",
        label: "Default Theme",
    },
    BuiltinTheme {
        id: "a11y-dark",
        stylesheet_url: "/src/styles/themes/a11y/a11y-dark.css",
        label: "Dark Mode",
    },
    BuiltinTheme {
        id: "a11y-high-contrast",
        stylesheet_url: "/src/styles/themes/a11y/a11y-high-contrast.css",
        label: "High Contrast",
    },
    BuiltinTheme {
        id: "a11y-cream",
        stylesheet_url: "/src/styles/themes/a11y/a11y-cream.css",
        label: "Cream",
    },
    BuiltinTheme {
        id: "a11y-monochrome",
        stylesheet_url: "/src/styles/themes/a11y/a11y-monochrome.css",
        label: "Monochrome",
    },
    BuiltinTheme {
        id: "a11y-protanopia",
        stylesheet_url: "/src/styles/themes/a11y/a11y-protanopia.css",
        label: "Protanopia (Red-blind)",
    },
    BuiltinTheme {
        id: "a11y-deuteranopia",
        stylesheet_url: "/src/styles/themes/a11y/a11y-deuteranopia.css",
        label: "Deuteranopia (Green-blind)",
    },
    BuiltinTheme {
        id: "a11y-tritanopia",
        stylesheet_url: "/src/styles/themes/a11y/a11y-tritanopia.css",
        label: "Tritanopia (Blue-blind)",
    },
];

/// Ordered set of theme descriptors, unique by id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThemeCatalog {
    themes: Vec<ThemeDescriptor>,
}

impl ThemeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog holding `BUILTIN_THEMES`
    pub fn builtin() -> Self {
        Self::from_descriptors(BUILTIN_THEMES.iter().map(ThemeDescriptor::from))
    }

    pub fn from_descriptors(descriptors: impl IntoIterator<Item = ThemeDescriptor>) -> Self {
        let mut catalog = Self::new();
        for descriptor in descriptors {
            catalog.register_descriptor(descriptor);
        }
        catalog
    }

    /// Add or overwrite a theme (last registration wins)
    pub fn register(&mut self, id: impl Into<String>, stylesheet_url: impl Into<String>) {
        self.register_descriptor(ThemeDescriptor::new(id, stylesheet_url));
    }

    pub fn register_descriptor(&mut self, descriptor: ThemeDescriptor) {
        match self.themes.iter_mut().find(|t| t.id == descriptor.id) {
            Some(existing) => *existing = descriptor,
            None => self.themes.push(descriptor),
        }
    }

    /// Remove a theme; absent ids are ignored
    pub fn unregister(&mut self, id: &str) {
        self.themes.retain(|t| t.id != id);
    }

    pub fn resolve(&self, id: &str) -> Result<&ThemeDescriptor, ThemeError> {
        self.get(id)
            .ok_or_else(|| ThemeError::NotFound(id.to_string()))
    }

    pub fn get(&self, id: &str) -> Option<&ThemeDescriptor> {
        self.themes.iter().find(|t| t.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Theme ids in registration order
    pub fn list_ids(&self) -> Vec<String> {
        self.themes.iter().map(|t| t.id.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ThemeDescriptor> {
        self.themes.iter()
    }

    pub fn len(&self) -> usize {
        self.themes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }

    /// Theme after `current` in registration order, wrapping to the first.
    /// An unknown or absent `current` yields the first theme.
    pub fn next_after(&self, current: Option<&str>) -> Option<&ThemeDescriptor> {
        let next = current
            .and_then(|id| self.themes.iter().position(|t| t.id == id))
            .map(|index| (index + 1) % self.themes.len())
            .unwrap_or(0);
        self.themes.get(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog() {
        let catalog = ThemeCatalog::builtin();
        assert_eq!(catalog.len(), 8);
        assert_eq!(catalog.list_ids()[0], "default");
        assert_eq!(
            catalog.resolve("a11y-dark").unwrap().stylesheet_url,
            "/src/styles/themes/a11y/a11y-dark.css"
        );
        assert_eq!(catalog.get("a11y-cream").unwrap().display_name(), "Cream");
    }

    #[test]
    fn test_register_overwrites_in_place() {
        let mut catalog = ThemeCatalog::new();
        catalog.register("default", "/a.css");
        catalog.register("dark", "/b.css");
        catalog.register("default", "/c.css");
        assert_eq!(catalog.list_ids(), vec!["default", "dark"]);
        assert_eq!(catalog.resolve("default").unwrap().stylesheet_url, "/c.css");
    }

    #[test]
    fn test_unregister_and_resolve() {
        let mut catalog = ThemeCatalog::new();
        catalog.register("dark", "/b.css");
        catalog.unregister("dark");
        catalog.unregister("never-registered");
        assert!(catalog.is_empty());
        assert_eq!(
            catalog.resolve("dark"),
            Err(ThemeError::NotFound("dark".to_string()))
        );
    }

    #[test]
    fn test_next_after_wraps() {
        let mut catalog = ThemeCatalog::new();
        catalog.register("a", "/a.css");
        catalog.register("b", "/b.css");
        catalog.register("c", "/c.css");
        assert_eq!(catalog.next_after(None).unwrap().id, "a");
        assert_eq!(catalog.next_after(Some("a")).unwrap().id, "b");
        assert_eq!(catalog.next_after(Some("c")).unwrap().id, "a");
        assert_eq!(catalog.next_after(Some("zzz")).unwrap().id, "a");
        assert!(ThemeCatalog::new().next_after(Some("a")).is_none());
    }

    #[test]
    fn test_display_name_falls_back_to_id() {
        let descriptor = ThemeDescriptor::new("ocean", "/ocean.css");
        assert_eq!(descriptor.display_name(), "ocean");
    }
}
