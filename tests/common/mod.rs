// Common test utilities
#![allow(dead_code)]

pub mod tracing;

use themekit::a11y::AccessibilityEngine;
use themekit::host::{Dom, MemoryHost, MemoryStore};
use themekit::theme::ThemeSwitcher;
use themekit::EngineConfig;

/// A simulated page: in-memory host plus the switcher and engine wired to it
pub struct Page {
    pub host: MemoryHost,
    pub config: EngineConfig,
    pub switcher: ThemeSwitcher,
    pub engine: AccessibilityEngine,
}

impl Page {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self::build(MemoryHost::new(), config)
    }

    /// Page whose storage already holds `entries`
    pub fn with_stored(entries: &[(&str, &str)]) -> Self {
        let store = entries
            .iter()
            .fold(MemoryStore::new(), |store, (key, value)| store.with_entry(key, value));
        let host = MemoryHost {
            store: std::rc::Rc::new(store),
            ..MemoryHost::new()
        };
        Self::build(host, EngineConfig::default())
    }

    fn build(host: MemoryHost, config: EngineConfig) -> Self {
        self::tracing::init_tracing_from_env();
        let switcher = ThemeSwitcher::new(host.host(), config.clone());
        let engine = AccessibilityEngine::new(host.host(), config.clone(), switcher.clone());
        Self {
            host,
            config,
            switcher,
            engine,
        }
    }

    /// Initialize the switcher and let the first stylesheet load
    pub fn boot(&self) {
        let mut first = self.switcher.initialize();
        self.host.dom.complete_link_load();
        assert!(first.try_result().is_some_and(|r| r.is_ok()));
    }

    pub fn stored_theme(&self) -> Option<String> {
        self.host.store.peek(&self.config.storage.theme)
    }

    pub fn link_href(&self) -> Option<String> {
        self.host.dom.theme_link_href()
    }
}
