//! Core token generation from a themes directory (build time)
//!
//! Every theme stylesheet declares its core colors as
//! `--<prefix>-c-{bg,text,primary,accent}`. This module scans a directory of
//! theme files and renders those values into a single `coretokens.css`
//! `:root` block, so theme cards can show swatches without fetching every
//! theme at runtime.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Write as _;
use std::io;
use std::path::{Path, PathBuf};

/// Directory skipped while scanning; it holds the generated output
pub const PREVIEW_DIR: &str = "Preview";

/// Core token slots in output order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreSlot {
    Bg,
    Text,
    Primary,
    Accent,
}

impl CoreSlot {
    pub const ALL: [CoreSlot; 4] = [
        CoreSlot::Bg,
        CoreSlot::Text,
        CoreSlot::Primary,
        CoreSlot::Accent,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CoreSlot::Bg => "bg",
            CoreSlot::Text => "text",
            CoreSlot::Primary => "primary",
            CoreSlot::Accent => "accent",
        }
    }
}

static CORE_PATTERNS: Lazy<Vec<(CoreSlot, Regex)>> = Lazy::new(|| {
    CoreSlot::ALL
        .iter()
        .filter_map(|slot| {
            let pattern = format!(r"(?i)--[\w-]+-c-{}\s*:\s*([^;]+);", slot.as_str());
            match Regex::new(&pattern) {
                Ok(regex) => Some((*slot, regex)),
                Err(e) => {
                    tracing::error!("Invalid core token pattern {}: {}", pattern, e);
                    None
                }
            }
        })
        .collect()
});

/// Core color values found in one theme file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoreTokens {
    pub bg: Option<String>,
    pub text: Option<String>,
    pub primary: Option<String>,
    pub accent: Option<String>,
}

impl CoreTokens {
    pub fn get(&self, slot: CoreSlot) -> Option<&str> {
        match slot {
            CoreSlot::Bg => self.bg.as_deref(),
            CoreSlot::Text => self.text.as_deref(),
            CoreSlot::Primary => self.primary.as_deref(),
            CoreSlot::Accent => self.accent.as_deref(),
        }
    }

    fn set(&mut self, slot: CoreSlot, value: String) {
        match slot {
            CoreSlot::Bg => self.bg = Some(value),
            CoreSlot::Text => self.text = Some(value),
            CoreSlot::Primary => self.primary = Some(value),
            CoreSlot::Accent => self.accent = Some(value),
        }
    }

    pub fn is_empty(&self) -> bool {
        CoreSlot::ALL.iter().all(|slot| self.get(*slot).is_none())
    }
}

/// Scan stylesheet text line by line; a later literal value replaces an
/// earlier one, `var()` references are ignored
pub fn extract_core_tokens(css_text: &str) -> CoreTokens {
    let mut tokens = CoreTokens::default();
    for line in css_text.lines() {
        for (slot, pattern) in CORE_PATTERNS.iter() {
            let Some(value) = pattern.captures(line).and_then(|c| c.get(1)) else {
                continue;
            };
            if !value.as_str().contains("var(") {
                tokens.set(*slot, value.as_str().trim().to_string());
            }
        }
    }
    tokens
}

/// `BrandDefault.css` is the `default` theme; `a11y-` prefixes are dropped
pub fn theme_name_for_file(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    if stem == "BrandDefault" {
        return "default".to_string();
    }
    stem.strip_prefix("a11y-").unwrap_or(&stem).to_string()
}

/// All `.css` files below `dir`, skipping the `Preview` directory, sorted
pub fn collect_theme_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            if path.file_name().is_some_and(|name| name == PREVIEW_DIR) {
                continue;
            }
            files.extend(collect_theme_files(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "css") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Core tokens extracted for one theme
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreTokenEntry {
    pub theme: String,
    pub tokens: CoreTokens,
}

/// Extract core tokens from every theme file below `dir`.
/// Files without any core token are left out.
pub fn scan_theme_dir(dir: &Path) -> io::Result<Vec<CoreTokenEntry>> {
    let mut entries = Vec::new();
    for path in collect_theme_files(dir)? {
        let css_text = std::fs::read_to_string(&path)?;
        let tokens = extract_core_tokens(&css_text);
        let theme = theme_name_for_file(&path);
        if tokens.is_empty() {
            tracing::debug!("No core tokens in {}", path.display());
            continue;
        }
        tracing::info!("Extracted tokens for: {}", theme);
        entries.push(CoreTokenEntry { theme, tokens });
    }
    Ok(entries)
}

fn token_prefix(theme: &str) -> String {
    if theme == "default" {
        "brand".to_string()
    } else {
        format!("a11y-{}", theme)
    }
}

/// Render the generated `coretokens.css`
pub fn render_core_tokens_css(entries: &[CoreTokenEntry]) -> String {
    let mut css = String::from(
        "/**\n * Core Theme Tokens - Auto-generated\n * DO NOT EDIT MANUALLY\n *\n * Generated from theme CSS files by `themekit core-tokens`\n */\n\n:root {\n  /* Core theme tokens - extracted from all theme files */\n",
    );

    for entry in entries {
        let prefix = token_prefix(&entry.theme);
        let _ = write!(css, "\n  /* {} theme */\n", entry.theme);
        for slot in CoreSlot::ALL {
            if let Some(value) = entry.tokens.get(slot) {
                let _ = writeln!(css, "  --{}-c-{}: {};", prefix, slot.as_str(), value);
            }
        }
    }

    css.push_str("}\n");
    css
}
