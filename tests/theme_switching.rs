//! Integration tests for the theme switcher lifecycle.
//!
//! Drives `ThemeSwitcher` against the in-memory host: stylesheet load and
//! error events are fired explicitly, timers advance on demand.

mod common;

use common::Page;
use std::time::Duration;
use themekit::host::{DocTarget, Dom, HeadNode};
use themekit::input::{KeyModifiers, KeyPress};
use themekit::theme::{ThemeCatalog, ThemeError, ThemeSwitcher, SWITCHING_CLASS};
use themekit::EngineConfig;

#[test]
fn test_cold_start_uses_default_theme() {
    let page = Page::new();
    let mut first = page.switcher.initialize();

    assert_eq!(page.switcher.current_theme().as_deref(), Some("default"));
    assert_eq!(
        page.link_href().as_deref(),
        Some("/src/styles/themes/brand/BrandDefault.css")
    );
    assert!(page.switcher.is_loading());

    page.host.dom.complete_link_load();
    assert_eq!(first.try_result(), Some(Ok("default".to_string())));
    assert_eq!(page.stored_theme().as_deref(), Some("default"));
}

#[test]
fn test_initialize_creates_single_link_at_end_of_head() {
    let page = Page::new();
    page.host.dom.set_meta_theme_color("#000");
    page.boot();
    page.switcher.initialize();

    let head = page.host.dom.head();
    let links: Vec<&HeadNode> = head
        .iter()
        .filter(|node| matches!(node, HeadNode::ThemeLink { .. }))
        .collect();
    assert_eq!(links.len(), 1);
    assert!(matches!(
        head.last(),
        Some(HeadNode::ThemeLink { id, .. }) if id == "dynamic-theme-css"
    ));
}

#[test]
fn test_cold_start_with_two_theme_catalog() {
    let config = EngineConfig::default();
    let page = Page::with_config(config.clone());
    let mut catalog = ThemeCatalog::new();
    catalog.register("default", "/themes/default.css");
    catalog.register("dark", "/themes/dark.css");
    let switcher = ThemeSwitcher::with_catalog(page.host.host(), config, catalog);

    switcher.initialize();
    assert_eq!(switcher.current_theme().as_deref(), Some("default"));
    assert_eq!(page.link_href().as_deref(), Some("/themes/default.css"));
}

#[test]
fn test_restores_persisted_theme() {
    let page = Page::with_stored(&[("color-theme", "a11y-cream")]);
    page.boot();
    assert_eq!(page.switcher.current_theme().as_deref(), Some("a11y-cream"));
    assert!(page.host.dom.has_class(DocTarget::Body, "a11y-theme-cream"));
}

#[test]
fn test_legacy_theme_id_is_migrated() {
    let page = Page::with_stored(&[("color-theme", "walking-with-a-smile")]);
    page.switcher.initialize();

    // Storage is rewritten before the stylesheet even loads
    assert_eq!(page.stored_theme().as_deref(), Some("default"));
    page.host.dom.complete_link_load();
    assert_eq!(page.switcher.current_theme().as_deref(), Some("default"));
}

#[test]
fn test_unknown_persisted_theme_falls_back_to_default() {
    let page = Page::with_stored(&[("color-theme", "a11y-neon")]);
    page.boot();
    assert_eq!(page.switcher.current_theme().as_deref(), Some("default"));
    assert_eq!(page.stored_theme().as_deref(), Some("default"));
}

#[test]
fn test_unavailable_storage_does_not_block_switching() {
    let page = Page::new();
    page.host.store.set_unavailable(true);
    page.boot();

    let mut handle = page.switcher.switch_theme("a11y-dark");
    page.host.dom.complete_link_load();
    assert_eq!(handle.try_result(), Some(Ok("a11y-dark".to_string())));
    assert_eq!(page.stored_theme(), None);
}

#[test]
fn test_switching_to_active_theme_is_a_no_op() {
    let page = Page::new();
    page.boot();

    let mut first = page.switcher.switch_theme("a11y-dark");
    page.host.dom.complete_link_load();
    assert_eq!(first.try_result(), Some(Ok("a11y-dark".to_string())));
    let writes = page.host.dom.href_writes();

    let mut second = page.switcher.switch_theme("a11y-dark");
    assert_eq!(second.try_result(), Some(Ok("a11y-dark".to_string())));
    assert_eq!(page.host.dom.href_writes(), writes);
    assert_eq!(page.host.dom.pending_link_listeners(), 0);
    assert!(!page.switcher.is_loading());
}

#[test]
fn test_unknown_theme_rejected_and_state_kept() {
    let page = Page::new();
    page.boot();
    let classes = page.host.dom.classes(DocTarget::Body);

    let mut handle = page.switcher.switch_theme("does-not-exist");
    match handle.try_result() {
        Some(Err(e)) => {
            assert_eq!(e, ThemeError::NotFound("does-not-exist".to_string()));
            assert_eq!(e.to_string(), "Theme \"does-not-exist\" not found");
        }
        other => panic!("expected rejection, got {:?}", other),
    }
    assert_eq!(page.switcher.current_theme().as_deref(), Some("default"));
    assert_eq!(page.host.dom.classes(DocTarget::Body), classes);
    assert_eq!(page.host.dom.pending_link_listeners(), 0);
}

#[test]
fn test_load_failure_reverts_and_retry_loads_again() {
    let page = Page::new();
    page.boot();

    let mut failed = page.switcher.switch_theme("a11y-dark");
    assert_eq!(page.host.dom.fail_link_load(), 1);
    assert_eq!(
        failed.try_result(),
        Some(Err(ThemeError::LoadFailed("a11y-dark".to_string())))
    );
    assert_eq!(page.switcher.current_theme().as_deref(), Some("default"));
    assert_eq!(page.stored_theme().as_deref(), Some("default"));
    assert!(!page.host.dom.has_class(DocTarget::Body, SWITCHING_CLASS));

    let writes = page.host.dom.href_writes();
    let mut retry = page.switcher.switch_theme("a11y-dark");
    assert_eq!(page.host.dom.href_writes(), writes + 1);
    assert_eq!(page.host.dom.pending_link_listeners(), 1);
    page.host.dom.complete_link_load();
    assert_eq!(retry.try_result(), Some(Ok("a11y-dark".to_string())));
}

#[test]
fn test_one_listener_per_switch() {
    let page = Page::new();
    page.boot();
    for theme in ["a11y-dark", "a11y-cream", "default"] {
        page.switcher.switch_theme(theme);
        assert_eq!(page.host.dom.pending_link_listeners(), 1);
        page.host.dom.complete_link_load();
        assert_eq!(page.host.dom.pending_link_listeners(), 0);
    }
}

#[test]
fn test_later_switch_wins_the_link() {
    let page = Page::new();
    page.boot();

    page.switcher.switch_theme("a11y-dark");
    page.switcher.switch_theme("a11y-monochrome");
    assert_eq!(
        page.link_href().as_deref(),
        Some("/src/styles/themes/a11y/a11y-monochrome.css")
    );
    page.host.dom.complete_link_load();

    assert_eq!(page.switcher.current_theme().as_deref(), Some("a11y-monochrome"));
    assert_eq!(page.stored_theme().as_deref(), Some("a11y-monochrome"));
    assert!(page.host.dom.has_class(DocTarget::Body, "a11y-theme-monochrome"));
    assert!(!page.host.dom.has_class(DocTarget::Body, "a11y-theme-dark"));
}

#[test]
fn test_superseded_switch_has_no_side_effects() {
    let config = EngineConfig {
        supersede_stale_switches: true,
        ..EngineConfig::default()
    };
    let page = Page::with_config(config);
    page.boot();
    page.switcher.announcer().ensure_region();
    let announced = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
    let seen = announced.clone();
    page.switcher
        .subscribe(move |change| seen.borrow_mut().push(change.theme.clone()));

    let mut stale = page.switcher.switch_theme("a11y-dark");
    let mut latest = page.switcher.switch_theme("a11y-cream");
    page.host.dom.complete_link_load();

    assert_eq!(
        stale.try_result(),
        Some(Err(ThemeError::Superseded("a11y-dark".to_string())))
    );
    assert_eq!(latest.try_result(), Some(Ok("a11y-cream".to_string())));
    assert_eq!(*announced.borrow(), vec!["a11y-cream"]);
}

#[test]
fn test_announcement_uses_label_and_clears() {
    let page = Page::new();
    page.boot();

    page.switcher.switch_theme("a11y-high-contrast");
    page.host.dom.complete_link_load();
    assert_eq!(
        page.host.dom.live_region_text("theme-announcer").as_deref(),
        Some("Color theme changed to High Contrast")
    );

    page.host.timers.advance(Duration::from_millis(1000));
    assert_eq!(page.host.dom.live_region_text("theme-announcer").as_deref(), Some(""));
}

#[test]
fn test_meta_theme_color_follows_computed_background() {
    let page = Page::new();
    page.boot();
    page.host.timers.run_all();
    assert_eq!(page.host.dom.meta_theme_color().as_deref(), Some("#8FA68A"));

    page.host.dom.set_computed_root_property("--page-bg", "#121212");
    page.switcher.switch_theme("a11y-dark");
    page.host.dom.complete_link_load();
    page.host.timers.advance(Duration::from_millis(50));
    assert_eq!(page.host.dom.meta_theme_color().as_deref(), Some("#121212"));
}

#[test]
fn test_selector_controls_reflect_active_theme() {
    let page = Page::new();
    let body = page.host.dom.body();
    let selectors: Vec<_> = ["default", "a11y-dark", "a11y-cream"]
        .into_iter()
        .map(|theme| (theme, page.host.dom.add_theme_selector(body, theme)))
        .collect();
    page.boot();

    page.switcher.switch_theme("a11y-cream");
    page.host.dom.complete_link_load();
    for (theme, element) in selectors {
        let pressed = page.host.dom.attribute(element, "aria-pressed");
        let expected = if theme == "a11y-cream" { "true" } else { "false" };
        assert_eq!(pressed.as_deref(), Some(expected), "{}", theme);
        assert_eq!(page.host.dom.element_has_class(element, "active"), theme == "a11y-cream");
    }
}

#[test]
fn test_alt_t_cycles_through_catalog() {
    let page = Page::new();
    page.boot();
    let ids = page.switcher.available_themes();
    let shortcut = KeyPress::new("T", KeyModifiers::ALT);

    let mut visited = Vec::new();
    for _ in 0..ids.len() {
        let handle = page.switcher.handle_key(&shortcut).expect("shortcut cycles");
        visited.push(handle.theme().to_string());
        page.host.dom.complete_link_load();
    }

    let mut expected: Vec<String> = ids[1..].to_vec();
    expected.push(ids[0].clone());
    assert_eq!(visited, expected);
    assert!(page
        .switcher
        .handle_key(&KeyPress::new("t", KeyModifiers::ALT | KeyModifiers::SHIFT))
        .is_none());
}

#[test]
fn test_runtime_catalog_changes() {
    let page = Page::new();
    page.boot();
    page.switcher.add_theme("ocean", "/themes/ocean.css");

    let mut handle = page.switcher.switch_theme("ocean");
    assert_eq!(page.link_href().as_deref(), Some("/themes/ocean.css"));
    page.host.dom.complete_link_load();
    assert_eq!(handle.try_result(), Some(Ok("ocean".to_string())));
    assert!(page.host.dom.has_class(DocTarget::Body, "a11y-theme-ocean"));

    page.switcher.remove_theme("a11y-dark");
    let mut removed = page.switcher.switch_theme("a11y-dark");
    assert!(matches!(removed.try_result(), Some(Err(ThemeError::NotFound(_)))));
}

#[test]
fn test_switch_issued_before_initialize_still_loads() {
    let page = Page::new();

    let mut early = page.switcher.switch_theme("default");
    assert_eq!(
        page.link_href().as_deref(),
        Some("/src/styles/themes/brand/BrandDefault.css")
    );
    assert_eq!(page.host.dom.pending_link_listeners(), 1);

    let mut init = page.switcher.initialize();
    assert_eq!(init.try_result(), Some(Ok("default".to_string())));
    assert_eq!(page.host.dom.href_writes(), 1);

    page.host.dom.complete_link_load();
    assert_eq!(early.try_result(), Some(Ok("default".to_string())));
    assert!(!page.switcher.is_loading());
    assert!(!page.host.dom.has_class(DocTarget::Body, SWITCHING_CLASS));
    assert_eq!(page.stored_theme().as_deref(), Some("default"));
}
