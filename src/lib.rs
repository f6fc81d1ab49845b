// themekit library - theme switching and accessibility settings for a static site

// Core types and config are always available (needed for schema generation)
pub mod config;
pub mod input;

// Engines and the host seams they are written against
pub mod a11y;
pub mod host;
pub mod theme;

// WASM browser build modules
#[cfg(feature = "wasm")]
pub mod wasm;

pub use config::EngineConfig;
