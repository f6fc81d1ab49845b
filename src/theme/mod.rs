//! Theme module - catalog, stylesheet switching and preview tokens
//!
//! This module is organized into:
//!
//! - **`catalog`**: `ThemeCatalog` mapping theme ids to stylesheet urls,
//!   seeded from `BUILTIN_THEMES`
//! - **`switcher`**: `ThemeSwitcher`, the owner of the active theme. Swaps the
//!   live stylesheet link, waits for load confirmation, persists and announces
//! - **`tokens`**: line-oriented custom property extraction and the preview
//!   swatch batch (`--theme-preview-<id>-<slot>`)
//! - **`core_tokens`**: build-time scan of a themes directory into a
//!   `coretokens.css` `:root` block
//! - **`announcer`**: polite live-region writer shared with the settings engine
//!
//! # Usage
//!
//! ```ignore
//! use themekit::host::MemoryHost;
//! use themekit::theme::ThemeSwitcher;
//! use themekit::EngineConfig;
//!
//! let host = MemoryHost::new();
//! let switcher = ThemeSwitcher::new(host.host(), EngineConfig::default());
//! let mut first = switcher.initialize();
//! host.dom.complete_link_load();
//! assert_eq!(first.try_result(), Some(Ok("default".to_string())));
//! ```

mod announcer;
mod catalog;
pub mod core_tokens;
mod error;
mod switcher;
mod tokens;

pub use announcer::LiveAnnouncer;
pub use catalog::{BuiltinTheme, ThemeCatalog, ThemeDescriptor, BUILTIN_THEMES};
pub use error::ThemeError;
pub use switcher::{
    theme_body_class, ActiveThemeState, SwitchHandle, ThemeChanged, ThemeSwitcher,
    SWITCHING_CLASS, THEME_CHANGED_EVENT, THEME_CLASS_PREFIX,
};
pub use tokens::{
    default_preview_sources, extract_tokens, fetch_and_extract, load_preview_tokens,
    preview_property_name, PreviewSource, PREVIEW_SLOTS,
};
