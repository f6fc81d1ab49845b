//! In-memory document for tests and native tooling
//!
//! Models just enough of a page for the engines: `<html>` and `<body>`
//! elements with classes, attributes and inline styles, a `<head>` list,
//! arbitrary child elements for focus handling, and a theme link whose
//! load/error events are fired explicitly by the caller.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

use super::dom::{DocTarget, Dom, ElementId, FocusCandidate, LinkEvent, LinkListener, ThemeSelector};

const ROOT: ElementId = ElementId(0);
const BODY: ElementId = ElementId(1);

/// Entry in the simulated `<head>`, in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadNode {
    /// `<link rel="stylesheet" id=...>` used for dynamic theming
    ThemeLink { id: String, href: Option<String> },
    /// `<link rel="preload" as="style">`
    Preload { href: String },
    /// `<meta name=... content=...>`
    Meta { name: String, content: String },
}

#[derive(Debug, Default)]
struct Node {
    tag: String,
    parent: Option<ElementId>,
    attributes: BTreeMap<String, String>,
    classes: Vec<String>,
    styles: BTreeMap<String, String>,
    text: String,
}

#[derive(Default)]
struct DomState {
    nodes: Vec<Node>,
    head: Vec<HeadNode>,
    theme_link_id: Option<String>,
    link_listeners: Vec<LinkListener>,
    href_writes: usize,
    computed: HashMap<String, String>,
    live_regions: BTreeMap<String, ElementId>,
    active: Option<ElementId>,
}

impl DomState {
    fn node(&self, id: ElementId) -> Option<&Node> {
        self.nodes.get(id.0 as usize)
    }

    fn node_mut(&mut self, id: ElementId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0 as usize)
    }

    fn theme_link_mut(&mut self) -> Option<&mut Option<String>> {
        let wanted = self.theme_link_id.clone()?;
        self.head.iter_mut().find_map(|node| match node {
            HeadNode::ThemeLink { id, href } if *id == wanted => Some(href),
            _ => None,
        })
    }

    fn is_descendant(&self, node: ElementId, ancestor: ElementId) -> bool {
        let mut current = self.node(node).and_then(|n| n.parent);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.node(parent).and_then(|n| n.parent);
        }
        false
    }
}

fn target_id(target: DocTarget) -> ElementId {
    match target {
        DocTarget::Root => ROOT,
        DocTarget::Body => BODY,
    }
}

/// Single-threaded in-memory `Dom`
pub struct MemoryDom {
    state: RefCell<DomState>,
}

impl MemoryDom {
    pub fn new() -> Self {
        let mut state = DomState::default();
        state.nodes.push(Node {
            tag: "html".to_string(),
            ..Node::default()
        });
        state.nodes.push(Node {
            tag: "body".to_string(),
            parent: Some(ROOT),
            ..Node::default()
        });
        Self {
            state: RefCell::new(state),
        }
    }

    pub fn root(&self) -> ElementId {
        ROOT
    }

    pub fn body(&self) -> ElementId {
        BODY
    }

    /// Append a new element under `parent` (document order = creation order)
    pub fn create_element(&self, parent: ElementId, tag: &str) -> ElementId {
        let mut state = self.state.borrow_mut();
        let id = ElementId(state.nodes.len() as u64);
        state.nodes.push(Node {
            tag: tag.to_ascii_lowercase(),
            parent: Some(parent),
            ..Node::default()
        });
        id
    }

    /// Add a `<button data-theme=...>` selector control under `parent`
    pub fn add_theme_selector(&self, parent: ElementId, theme: &str) -> ElementId {
        let button = self.create_element(parent, "button");
        self.set_attribute(button, "data-theme", theme);
        button
    }

    pub fn attribute(&self, element: ElementId, name: &str) -> Option<String> {
        let state = self.state.borrow();
        state.node(element)?.attributes.get(name).cloned()
    }

    pub fn element_has_class(&self, element: ElementId, class: &str) -> bool {
        let state = self.state.borrow();
        state
            .node(element)
            .is_some_and(|node| node.classes.iter().any(|c| c == class))
    }

    pub fn head(&self) -> Vec<HeadNode> {
        self.state.borrow().head.clone()
    }

    /// Number of times the theme link href has been written
    pub fn href_writes(&self) -> usize {
        self.state.borrow().href_writes
    }

    pub fn pending_link_listeners(&self) -> usize {
        self.state.borrow().link_listeners.len()
    }

    /// Simulate the theme stylesheet finishing its load; returns listeners fired
    pub fn complete_link_load(&self) -> usize {
        self.fire_link_event(LinkEvent::Load)
    }

    /// Simulate the theme stylesheet failing to load; returns listeners fired
    pub fn fail_link_load(&self) -> usize {
        self.fire_link_event(LinkEvent::Error)
    }

    fn fire_link_event(&self, event: LinkEvent) -> usize {
        // Listeners may attach new listeners; those wait for the next event
        let listeners = std::mem::take(&mut self.state.borrow_mut().link_listeners);
        let fired = listeners.len();
        for listener in listeners {
            listener(event);
        }
        fired
    }

    /// Value the next `computed_root_property` read returns for `name`
    pub fn set_computed_root_property(&self, name: &str, value: &str) {
        self.state
            .borrow_mut()
            .computed
            .insert(name.to_string(), value.to_string());
    }

    pub fn meta_theme_color(&self) -> Option<String> {
        self.state.borrow().head.iter().find_map(|node| match node {
            HeadNode::Meta { name, content } if name == "theme-color" => Some(content.clone()),
            _ => None,
        })
    }
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom for MemoryDom {
    fn ensure_theme_link(&self, element_id: &str) -> bool {
        let mut state = self.state.borrow_mut();
        let exists = state
            .head
            .iter()
            .any(|node| matches!(node, HeadNode::ThemeLink { id, .. } if id == element_id));
        state.theme_link_id = Some(element_id.to_string());
        if exists {
            return false;
        }
        state.head.push(HeadNode::ThemeLink {
            id: element_id.to_string(),
            href: None,
        });
        true
    }

    fn theme_link_href(&self) -> Option<String> {
        self.state.borrow_mut().theme_link_mut()?.clone()
    }

    fn set_theme_link_href(&self, href: &str) {
        let mut state = self.state.borrow_mut();
        if let Some(slot) = state.theme_link_mut() {
            *slot = Some(href.to_string());
            state.href_writes += 1;
        }
    }

    fn on_theme_link_settled(&self, listener: LinkListener) {
        self.state.borrow_mut().link_listeners.push(listener);
    }

    fn append_preload_link(&self, href: &str) {
        self.state.borrow_mut().head.push(HeadNode::Preload {
            href: href.to_string(),
        });
    }

    fn add_class(&self, target: DocTarget, class: &str) {
        let mut state = self.state.borrow_mut();
        if let Some(node) = state.node_mut(target_id(target)) {
            if !node.classes.iter().any(|c| c == class) {
                node.classes.push(class.to_string());
            }
        }
    }

    fn remove_class(&self, target: DocTarget, class: &str) {
        let mut state = self.state.borrow_mut();
        if let Some(node) = state.node_mut(target_id(target)) {
            node.classes.retain(|c| c != class);
        }
    }

    fn has_class(&self, target: DocTarget, class: &str) -> bool {
        self.element_has_class(target_id(target), class)
    }

    fn classes(&self, target: DocTarget) -> Vec<String> {
        let state = self.state.borrow();
        state
            .node(target_id(target))
            .map(|node| node.classes.clone())
            .unwrap_or_default()
    }

    fn set_style(&self, target: DocTarget, property: &str, value: &str) {
        let mut state = self.state.borrow_mut();
        if let Some(node) = state.node_mut(target_id(target)) {
            node.styles.insert(property.to_string(), value.to_string());
        }
    }

    fn clear_style(&self, target: DocTarget, property: &str) {
        let mut state = self.state.borrow_mut();
        if let Some(node) = state.node_mut(target_id(target)) {
            node.styles.remove(property);
        }
    }

    fn style(&self, target: DocTarget, property: &str) -> Option<String> {
        let state = self.state.borrow();
        state.node(target_id(target))?.styles.get(property).cloned()
    }

    fn computed_root_property(&self, name: &str) -> Option<String> {
        self.state.borrow().computed.get(name).cloned()
    }

    fn set_meta_theme_color(&self, color: &str) {
        let mut state = self.state.borrow_mut();
        let existing = state.head.iter_mut().find_map(|node| match node {
            HeadNode::Meta { name, content } if name == "theme-color" => Some(content),
            _ => None,
        });
        match existing {
            Some(content) => *content = color.to_string(),
            None => state.head.push(HeadNode::Meta {
                name: "theme-color".to_string(),
                content: color.to_string(),
            }),
        }
    }

    fn ensure_live_region(&self, element_id: &str) {
        if self.state.borrow().live_regions.contains_key(element_id) {
            return;
        }
        let region = self.create_element(BODY, "div");
        self.set_attribute(region, "id", element_id);
        self.set_attribute(region, "aria-live", "polite");
        self.set_attribute(region, "aria-atomic", "true");
        self.state
            .borrow_mut()
            .live_regions
            .insert(element_id.to_string(), region);
    }

    fn set_live_region_text(&self, element_id: &str, text: &str) {
        let mut state = self.state.borrow_mut();
        let Some(region) = state.live_regions.get(element_id).copied() else {
            return;
        };
        if let Some(node) = state.node_mut(region) {
            node.text = text.to_string();
        }
    }

    fn live_region_text(&self, element_id: &str) -> Option<String> {
        let state = self.state.borrow();
        let region = state.live_regions.get(element_id)?;
        state.node(*region).map(|node| node.text.clone())
    }

    fn theme_selectors(&self) -> Vec<ThemeSelector> {
        let state = self.state.borrow();
        state
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| {
                node.attributes.get("data-theme").map(|theme| ThemeSelector {
                    element: ElementId(index as u64),
                    theme: theme.clone(),
                })
            })
            .collect()
    }

    fn set_selector_pressed(&self, element: ElementId, pressed: bool) {
        let mut state = self.state.borrow_mut();
        if let Some(node) = state.node_mut(element) {
            node.attributes
                .insert("aria-pressed".to_string(), pressed.to_string());
            node.classes.retain(|c| c != "active");
            if pressed {
                node.classes.push("active".to_string());
            }
        }
    }

    fn set_attribute(&self, element: ElementId, name: &str, value: &str) {
        let mut state = self.state.borrow_mut();
        if let Some(node) = state.node_mut(element) {
            node.attributes.insert(name.to_string(), value.to_string());
        }
    }

    fn remove_attribute(&self, element: ElementId, name: &str) {
        let mut state = self.state.borrow_mut();
        if let Some(node) = state.node_mut(element) {
            node.attributes.remove(name);
        }
    }

    fn active_element(&self) -> Option<ElementId> {
        self.state.borrow().active
    }

    fn focus(&self, element: ElementId) {
        self.state.borrow_mut().active = Some(element);
    }

    fn focus_candidates(&self, container: ElementId) -> Vec<FocusCandidate> {
        let state = self.state.borrow();
        state
            .nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (ElementId(index as u64), node))
            .filter(|(id, _)| state.is_descendant(*id, container))
            .map(|(id, node)| FocusCandidate {
                element: id,
                tag: node.tag.clone(),
                has_href: node.attributes.contains_key("href"),
                disabled: node.attributes.contains_key("disabled"),
                tab_index: node
                    .attributes
                    .get("tabindex")
                    .and_then(|value| value.trim().parse().ok()),
            })
            .collect()
    }
}
