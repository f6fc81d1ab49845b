//! Theme token extraction for preview swatches
//!
//! Tokens are pulled out of raw stylesheet text with a literal, line-oriented
//! scan rather than a CSS parser. The first declaration of a
//! token wins, and a value that is itself a `var(...)` reference counts as
//! unresolved and is left out.

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::host::{CssFetcher, DocTarget, Dom, FetchError, FetchResponse};

/// Preview slots, positionally matched against each source's token names
pub const PREVIEW_SLOTS: [&str; 4] = ["bg", "primary", "text", "accent"];

/// A stylesheet whose tokens feed one theme card's preview swatch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PreviewSource {
    /// Preview key used in the property name (`--theme-preview-<key>-<slot>`)
    pub key: String,
    pub url: String,
    /// Token names in slot order: background, primary, text, accent
    pub tokens: [String; 4],
}

impl PreviewSource {
    pub fn new(key: &str, url: &str, tokens: [&str; 4]) -> Self {
        Self {
            key: key.to_string(),
            url: url.to_string(),
            tokens: tokens.map(str::to_string),
        }
    }
}

/// Preview sources for the shipped themes
pub fn default_preview_sources() -> Vec<PreviewSource> {
    // Each accessibility theme namespaces its tokens (`--a11y-<ns>-<slot>`)
    let a11y = |key: &str, file: &str, ns: &str| PreviewSource {
        key: key.to_string(),
        url: format!("/src/styles/themes/a11y/a11y-{}.css", file),
        tokens: PREVIEW_SLOTS.map(|slot| format!("--a11y-{}-{}", ns, slot)),
    };

    vec![
        PreviewSource::new(
            "default",
            "/src/styles/themes/brand/BrandDefault.css",
            [
                "--color-Background-50",
                "--color-Primary-500",
                "--color-Text-800",
                "--color-Secondary-500",
            ],
        ),
        a11y("dark", "dark", "dark"),
        a11y("cream", "cream", "cream"),
        a11y("hc", "high-contrast", "hc"),
        a11y("protanopia", "protanopia", "proto"),
        a11y("deuteranopia", "deuteranopia", "deuter"),
        a11y("tritanopia", "tritanopia", "trit"),
        a11y("mono", "monochrome", "mono"),
    ]
}

/// `--theme-preview-<key>-<slot>`
pub fn preview_property_name(key: &str, slot: &str) -> String {
    format!("--theme-preview-{}-{}", key, slot)
}

/// Declaration pattern for one token: the name must not be the tail of a
/// longer property name, and the value may not cross a line
fn declaration_pattern(token: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r"(?i)(?:^|[^\w-]){}\s*:\s*([^;]+);",
        regex::escape(token)
    ))
}

fn is_indirection(value: &str) -> bool {
    value
        .get(..4)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("var("))
}

/// Extract the requested custom properties from stylesheet text.
///
/// Tokens that are missing, empty, or unresolved `var()` references are
/// absent from the result.
pub fn extract_tokens<S: AsRef<str>>(css_text: &str, token_names: &[S]) -> HashMap<String, String> {
    let mut tokens = HashMap::new();

    for name in token_names {
        let name = name.as_ref();
        let pattern = match declaration_pattern(name) {
            Ok(pattern) => pattern,
            Err(e) => {
                tracing::warn!("Skipping token {}: {}", name, e);
                continue;
            }
        };

        let first = css_text
            .lines()
            .find_map(|line| pattern.captures(line))
            .and_then(|captures| captures.get(1))
            .map(|value| value.as_str().trim().to_string());

        match first {
            Some(value) if !value.is_empty() && !is_indirection(&value) => {
                tokens.insert(name.to_string(), value);
            }
            Some(value) if !value.is_empty() => {
                tracing::debug!("Token {} is an unresolved reference ({})", name, value);
            }
            _ => {}
        }
    }

    tokens
}

fn tokens_from_response<S: AsRef<str>>(
    url: &str,
    response: Result<FetchResponse, FetchError>,
    token_names: &[S],
) -> HashMap<String, String> {
    match response {
        Ok(response) if response.is_success() => extract_tokens(&response.body, token_names),
        Ok(response) => {
            tracing::warn!("Failed to fetch {}: {}", url, response.status);
            HashMap::new()
        }
        Err(e) => {
            tracing::warn!("Error fetching {}: {}", url, e);
            HashMap::new()
        }
    }
}

/// Fetch a stylesheet and extract tokens from it.
///
/// Never fails: a bad status or transport error logs a warning and yields
/// an empty map.
pub async fn fetch_and_extract<S: AsRef<str>>(
    fetcher: &dyn CssFetcher,
    url: &str,
    token_names: &[S],
) -> HashMap<String, String> {
    let response = fetcher.fetch(url).await;
    tokens_from_response(url, response, token_names)
}

/// Fetch every source concurrently and write the resolved tokens as
/// `--theme-preview-<key>-<slot>` properties on the document root.
///
/// Returns the number of properties written.
pub async fn load_preview_tokens(
    fetcher: &dyn CssFetcher,
    dom: &dyn Dom,
    sources: &[PreviewSource],
) -> usize {
    let urls: Vec<String> = sources.iter().map(|s| s.url.clone()).collect();
    let responses = fetcher.fetch_all(&urls).await;

    let mut written = 0;
    for (source, response) in sources.iter().zip(responses) {
        let tokens = tokens_from_response(&source.url, response, &source.tokens);
        for (token, slot) in source.tokens.iter().zip(PREVIEW_SLOTS) {
            if let Some(value) = tokens.get(token) {
                dom.set_style(DocTarget::Root, &preview_property_name(&source.key, slot), value);
                written += 1;
            }
        }
    }

    tracing::debug!("Theme preview tokens loaded: {} properties", written);
    written
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{MemoryDom, MemoryFetcher};

    const DARK_CSS: &str = r#"
:root {
  --a11y-dark-bg: #121212;
  --a11y-dark-primary:#bb86fc ;
  --a11y-dark-text: var(--a11y-dark-fg);
  --page-bg: var(--a11y-dark-bg);
}
.card { --a11y-dark-bg: #000000; }
"#;

    #[test]
    fn test_extract_first_match_wins() {
        let tokens = extract_tokens(DARK_CSS, &["--a11y-dark-bg", "--a11y-dark-primary"]);
        assert_eq!(tokens.get("--a11y-dark-bg").map(String::as_str), Some("#121212"));
        assert_eq!(tokens.get("--a11y-dark-primary").map(String::as_str), Some("#bb86fc"));
    }

    #[test]
    fn test_var_indirection_is_unresolved() {
        let tokens = extract_tokens(DARK_CSS, &["--a11y-dark-text", "--page-bg"]);
        assert!(tokens.is_empty());
    }

    #[test]
    fn test_missing_tokens_are_absent() {
        let tokens = extract_tokens(DARK_CSS, &["--a11y-dark-accent"]);
        assert!(tokens.is_empty());
    }

    #[test]
    fn test_name_must_not_be_a_suffix() {
        let css = "--theme--bg: red;\n--bg: blue;";
        let tokens = extract_tokens(css, &["--bg"]);
        assert_eq!(tokens.get("--bg").map(String::as_str), Some("blue"));
    }

    #[test]
    fn test_declaration_does_not_span_lines() {
        let css = "--bg:\n  red;";
        assert!(extract_tokens(css, &["--bg"]).is_empty());
    }

    #[test]
    fn test_case_insensitive_name() {
        let css = "--COLOR-primary-500: #8fa68a;";
        let tokens = extract_tokens(css, &["--color-Primary-500"]);
        assert_eq!(
            tokens.get("--color-Primary-500").map(String::as_str),
            Some("#8fa68a")
        );
    }

    #[tokio::test]
    async fn test_fetch_and_extract_degrades_to_empty() {
        let fetcher = MemoryFetcher::new()
            .with_css("/dark.css", DARK_CSS)
            .with_response("/broken.css", Err(FetchError::Transport("offline".into())));

        let ok = fetch_and_extract(&fetcher, "/dark.css", &["--a11y-dark-bg"]).await;
        assert_eq!(ok.len(), 1);
        assert!(fetch_and_extract(&fetcher, "/broken.css", &["--a11y-dark-bg"]).await.is_empty());
        assert!(fetch_and_extract(&fetcher, "/missing.css", &["--a11y-dark-bg"]).await.is_empty());
    }

    #[tokio::test]
    async fn test_load_preview_tokens_maps_slots_by_position() {
        let css = "--bg: #111;\n--fg: #eee;\n--pri: #f00;\n--acc: var(--pri);";
        let fetcher = MemoryFetcher::new().with_css("/t.css", css);
        let dom = MemoryDom::new();
        let sources = vec![
            PreviewSource::new("t", "/t.css", ["--bg", "--pri", "--fg", "--acc"]),
            PreviewSource::new("gone", "/gone.css", ["--bg", "--pri", "--fg", "--acc"]),
        ];

        let written = load_preview_tokens(&fetcher, &dom, &sources).await;

        assert_eq!(written, 3);
        assert_eq!(dom.style(DocTarget::Root, "--theme-preview-t-bg").as_deref(), Some("#111"));
        assert_eq!(
            dom.style(DocTarget::Root, "--theme-preview-t-primary").as_deref(),
            Some("#f00")
        );
        assert_eq!(dom.style(DocTarget::Root, "--theme-preview-t-text").as_deref(), Some("#eee"));
        assert_eq!(dom.style(DocTarget::Root, "--theme-preview-t-accent"), None);
        assert_eq!(dom.style(DocTarget::Root, "--theme-preview-gone-bg"), None);
        assert_eq!(fetcher.requests(), vec!["/t.css", "/gone.css"]);
    }

    #[test]
    fn test_default_sources() {
        let sources = default_preview_sources();
        assert_eq!(sources.len(), 8);
        let hc = sources.iter().find(|s| s.key == "hc").unwrap();
        assert_eq!(hc.url, "/src/styles/themes/a11y/a11y-high-contrast.css");
        assert_eq!(hc.tokens[3], "--a11y-hc-accent");
    }
}
