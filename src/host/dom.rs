//! Document abstraction used by the theme switcher and the settings engine

/// Opaque handle to an element owned by a `Dom` implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

/// Document-level element that carries classes and inline styles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocTarget {
    /// The `<html>` element (root font size, preview custom properties)
    Root,
    /// The `<body>` element (setting toggles, theme class, spacing styles)
    Body,
}

/// Outcome reported by the live theme stylesheet link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    Load,
    Error,
}

/// Once-listener attached to the theme link's next load/error event
pub type LinkListener = Box<dyn FnOnce(LinkEvent)>;

/// A control that selects a theme (an element carrying `data-theme`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeSelector {
    pub element: ElementId,
    pub theme: String,
}

/// Element facts needed to decide whether it takes part in Tab navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusCandidate {
    pub element: ElementId,
    /// Lowercase tag name
    pub tag: String,
    pub has_href: bool,
    pub disabled: bool,
    pub tab_index: Option<i32>,
}

impl FocusCandidate {
    /// Mirrors the selector list
    /// `a[href], button:not([disabled]), input:not([disabled]),
    /// select:not([disabled]), textarea:not([disabled]), [tabindex]:not([tabindex="-1"])`
    pub fn is_focusable(&self) -> bool {
        let anchor = self.tag == "a" && self.has_href;
        let control = matches!(
            self.tag.as_str(),
            "button" | "input" | "select" | "textarea"
        ) && !self.disabled;
        let tabbable = self.tab_index.is_some_and(|index| index >= 0);
        anchor || control || tabbable
    }
}

/// The document as seen by the engines
///
/// Methods take `&self`: implementations are handles onto a single-threaded
/// document and use interior mutability, the same way browser DOM bindings do.
pub trait Dom {
    /// Make sure the stylesheet link with `element_id` exists, appending it
    /// at the end of `<head>` when absent. Returns true if it was created.
    fn ensure_theme_link(&self, element_id: &str) -> bool;

    /// Current href of the theme link, if set
    fn theme_link_href(&self) -> Option<String>;

    /// Point the theme link at a new stylesheet; a load or error event follows
    fn set_theme_link_href(&self, href: &str);

    /// Attach a once-listener for the next load/error event of the theme link.
    ///
    /// Every attached listener fires on that event, in attachment order, and
    /// is dropped after firing.
    fn on_theme_link_settled(&self, listener: LinkListener);

    /// Append a `<link rel="preload" as="style">` for `href`
    fn append_preload_link(&self, href: &str);

    fn add_class(&self, target: DocTarget, class: &str);
    fn remove_class(&self, target: DocTarget, class: &str);
    fn has_class(&self, target: DocTarget, class: &str) -> bool;
    fn classes(&self, target: DocTarget) -> Vec<String>;

    fn toggle_class(&self, target: DocTarget, class: &str, on: bool) {
        if on {
            self.add_class(target, class);
        } else {
            self.remove_class(target, class);
        }
    }

    /// Set an inline style property (custom properties included)
    fn set_style(&self, target: DocTarget, property: &str, value: &str);
    /// Remove an inline style property so the stylesheet value applies
    fn clear_style(&self, target: DocTarget, property: &str);
    fn style(&self, target: DocTarget, property: &str) -> Option<String>;

    /// Computed value of a custom property on the root element
    fn computed_root_property(&self, name: &str) -> Option<String>;

    /// Write `<meta name="theme-color">`, creating it when absent
    fn set_meta_theme_color(&self, color: &str);

    /// Make sure a visually hidden `aria-live="polite"` region exists
    fn ensure_live_region(&self, element_id: &str);
    fn set_live_region_text(&self, element_id: &str, text: &str);
    fn live_region_text(&self, element_id: &str) -> Option<String>;

    /// All theme selector controls in document order
    fn theme_selectors(&self) -> Vec<ThemeSelector>;
    /// Set `aria-pressed` and the `active` class on a selector control
    fn set_selector_pressed(&self, element: ElementId, pressed: bool);

    fn set_attribute(&self, element: ElementId, name: &str, value: &str);
    fn remove_attribute(&self, element: ElementId, name: &str);

    fn active_element(&self) -> Option<ElementId>;
    fn focus(&self, element: ElementId);
    /// Descendants of `container` in document order
    fn focus_candidates(&self, container: ElementId) -> Vec<FocusCandidate>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(tag: &str) -> FocusCandidate {
        FocusCandidate {
            element: ElementId(1),
            tag: tag.to_string(),
            has_href: false,
            disabled: false,
            tab_index: None,
        }
    }

    #[test]
    fn test_anchor_needs_href() {
        let mut anchor = candidate("a");
        assert!(!anchor.is_focusable());
        anchor.has_href = true;
        assert!(anchor.is_focusable());
    }

    #[test]
    fn test_disabled_controls_are_skipped() {
        for tag in ["button", "input", "select", "textarea"] {
            let mut control = candidate(tag);
            assert!(control.is_focusable(), "{} should be focusable", tag);
            control.disabled = true;
            assert!(!control.is_focusable(), "disabled {} should be skipped", tag);
        }
    }

    #[test]
    fn test_tab_index() {
        let mut div = candidate("div");
        assert!(!div.is_focusable());
        div.tab_index = Some(0);
        assert!(div.is_focusable());
        div.tab_index = Some(3);
        assert!(div.is_focusable());
        div.tab_index = Some(-1);
        assert!(!div.is_focusable());
    }
}
