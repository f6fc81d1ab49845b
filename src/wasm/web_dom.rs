//! `Dom` implementation over the live page through web-sys
//!
//! Elements handed out as `ElementId` are kept in a registry so the engines
//! can refer to them without holding JS references. Each registered element
//! carries its id in a `data-themekit-id` attribute, so lookups in either
//! direction are constant time; detached elements are pruned on every focus
//! scan.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlLinkElement, Window};

use crate::host::{
    DocTarget, Dom, ElementId, FocusCandidate, LinkEvent, LinkListener, ThemeSelector,
};

const VISUALLY_HIDDEN: &str = concat!(
    "position:absolute;width:1px;height:1px;padding:0;margin:-1px;",
    "overflow:hidden;clip:rect(0,0,0,0);white-space:nowrap;border:0",
);

/// Attribute holding an element's registry id
pub const ELEMENT_ID_ATTRIBUTE: &str = "data-themekit-id";

/// The browser document
pub struct WebDom {
    window: Window,
    document: Document,
    link_id: RefCell<Option<String>>,
    listeners: Rc<RefCell<Vec<LinkListener>>>,
    link_events_attached: Cell<bool>,
    elements: RefCell<HashMap<u64, Element>>,
    next_element_id: Cell<u64>,
}

/// Registry id carried in an element's `data-themekit-id` value.
/// Only plain decimal digits are accepted, so hand-edited tags are re-issued.
fn parse_element_tag(value: &str) -> Option<u64> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

impl WebDom {
    /// Bind to the current window; `None` outside a browser document
    pub fn from_window() -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        Some(Self {
            window,
            document,
            link_id: RefCell::new(None),
            listeners: Rc::new(RefCell::new(Vec::new())),
            link_events_attached: Cell::new(false),
            elements: RefCell::new(HashMap::new()),
            next_element_id: Cell::new(0),
        })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Registry id for `element`, registering it on first sight
    pub fn id_of(&self, element: &Element) -> ElementId {
        let tagged = element
            .get_attribute(ELEMENT_ID_ATTRIBUTE)
            .and_then(|value| parse_element_tag(&value));
        let mut elements = self.elements.borrow_mut();
        if let Some(id) = tagged {
            // A cloned node carries its source's id; it gets a fresh one below
            let copied = elements.get(&id).is_some_and(|known| known != element);
            if !copied {
                self.next_element_id.set(self.next_element_id.get().max(id + 1));
                elements.insert(id, element.clone());
                return ElementId(id);
            }
        }

        let id = self.next_element_id.get();
        self.next_element_id.set(id + 1);
        if let Err(e) = element.set_attribute(ELEMENT_ID_ATTRIBUTE, &id.to_string()) {
            tracing::warn!("Failed to tag element: {:?}", e);
        }
        elements.insert(id, element.clone());
        ElementId(id)
    }

    pub fn element(&self, id: ElementId) -> Option<Element> {
        self.elements.borrow().get(&id.0).cloned()
    }

    /// Drop registry entries for elements no longer in the document
    pub fn prune_detached(&self) {
        self.elements
            .borrow_mut()
            .retain(|_, element| element.is_connected());
    }

    pub fn element_by_id(&self, element_id: &str) -> Option<ElementId> {
        let element = self.document.get_element_by_id(element_id)?;
        Some(self.id_of(&element))
    }

    fn target(&self, target: DocTarget) -> Option<HtmlElement> {
        match target {
            DocTarget::Root => self
                .document
                .document_element()
                .and_then(|element| element.dyn_into::<HtmlElement>().ok()),
            DocTarget::Body => self.document.body(),
        }
    }

    fn theme_link(&self) -> Option<HtmlLinkElement> {
        let id = self.link_id.borrow().clone()?;
        self.document
            .get_element_by_id(&id)
            .and_then(|element| element.dyn_into::<HtmlLinkElement>().ok())
    }

    /// One persistent listener per event type drains the once-listener queue
    fn attach_link_events(&self, link: &HtmlLinkElement) {
        if self.link_events_attached.replace(true) {
            return;
        }
        for (event_name, event) in [("load", LinkEvent::Load), ("error", LinkEvent::Error)] {
            let listeners = Rc::clone(&self.listeners);
            let callback = Closure::<dyn FnMut(web_sys::Event)>::new(move |_: web_sys::Event| {
                let pending = std::mem::take(&mut *listeners.borrow_mut());
                for listener in pending {
                    listener(event);
                }
            });
            if let Err(e) =
                link.add_event_listener_with_callback(event_name, callback.as_ref().unchecked_ref())
            {
                tracing::warn!("Failed to attach {} listener: {:?}", event_name, e);
            }
            callback.forget();
        }
    }

    fn create(&self, tag: &str) -> Option<Element> {
        match self.document.create_element(tag) {
            Ok(element) => Some(element),
            Err(e) => {
                tracing::warn!("Failed to create <{}>: {:?}", tag, e);
                None
            }
        }
    }
}

impl Dom for WebDom {
    fn ensure_theme_link(&self, element_id: &str) -> bool {
        *self.link_id.borrow_mut() = Some(element_id.to_string());
        if let Some(existing) = self.theme_link() {
            self.attach_link_events(&existing);
            return false;
        }
        let (Some(head), Some(element)) = (self.document.head(), self.create("link")) else {
            return false;
        };
        let Ok(link) = element.dyn_into::<HtmlLinkElement>() else {
            return false;
        };
        link.set_id(element_id);
        link.set_rel("stylesheet");
        self.attach_link_events(&link);
        head.append_child(&link).is_ok()
    }

    fn theme_link_href(&self) -> Option<String> {
        self.theme_link()?.get_attribute("href")
    }

    fn set_theme_link_href(&self, href: &str) {
        match self.theme_link() {
            Some(link) => link.set_href(href),
            None => tracing::warn!("Theme link is missing; cannot load {}", href),
        }
    }

    fn on_theme_link_settled(&self, listener: LinkListener) {
        self.listeners.borrow_mut().push(listener);
    }

    fn append_preload_link(&self, href: &str) {
        let (Some(head), Some(element)) = (self.document.head(), self.create("link")) else {
            return;
        };
        if let Ok(link) = element.dyn_into::<HtmlLinkElement>() {
            link.set_rel("preload");
            link.set_href(href);
            let _ = link.set_attribute("as", "style");
            let _ = head.append_child(&link);
        }
    }

    fn add_class(&self, target: DocTarget, class: &str) {
        if let Some(element) = self.target(target) {
            let _ = element.class_list().add_1(class);
        }
    }

    fn remove_class(&self, target: DocTarget, class: &str) {
        if let Some(element) = self.target(target) {
            let _ = element.class_list().remove_1(class);
        }
    }

    fn has_class(&self, target: DocTarget, class: &str) -> bool {
        self.target(target)
            .is_some_and(|element| element.class_list().contains(class))
    }

    fn classes(&self, target: DocTarget) -> Vec<String> {
        let Some(element) = self.target(target) else {
            return Vec::new();
        };
        let list = element.class_list();
        (0..list.length()).filter_map(|i| list.item(i)).collect()
    }

    fn set_style(&self, target: DocTarget, property: &str, value: &str) {
        if let Some(element) = self.target(target) {
            let _ = element.style().set_property(property, value);
        }
    }

    fn clear_style(&self, target: DocTarget, property: &str) {
        if let Some(element) = self.target(target) {
            let _ = element.style().remove_property(property);
        }
    }

    fn style(&self, target: DocTarget, property: &str) -> Option<String> {
        let value = self.target(target)?.style().get_property_value(property).ok()?;
        (!value.is_empty()).then_some(value)
    }

    fn computed_root_property(&self, name: &str) -> Option<String> {
        let root = self.document.document_element()?;
        let computed = self.window.get_computed_style(&root).ok()??;
        let value = computed.get_property_value(name).ok()?;
        (!value.trim().is_empty()).then_some(value)
    }

    fn set_meta_theme_color(&self, color: &str) {
        if let Ok(Some(meta)) = self.document.query_selector("meta[name=\"theme-color\"]") {
            let _ = meta.set_attribute("content", color);
            return;
        }
        let (Some(head), Some(meta)) = (self.document.head(), self.create("meta")) else {
            return;
        };
        let _ = meta.set_attribute("name", "theme-color");
        let _ = meta.set_attribute("content", color);
        let _ = head.append_child(&meta);
    }

    fn ensure_live_region(&self, element_id: &str) {
        if self.document.get_element_by_id(element_id).is_some() {
            return;
        }
        let (Some(body), Some(region)) = (self.document.body(), self.create("div")) else {
            return;
        };
        region.set_id(element_id);
        let _ = region.set_attribute("aria-live", "polite");
        let _ = region.set_attribute("aria-atomic", "true");
        let _ = region.set_attribute("style", VISUALLY_HIDDEN);
        let _ = body.append_child(&region);
    }

    fn set_live_region_text(&self, element_id: &str, text: &str) {
        if let Some(region) = self.document.get_element_by_id(element_id) {
            region.set_text_content(Some(text));
        }
    }

    fn live_region_text(&self, element_id: &str) -> Option<String> {
        self.document.get_element_by_id(element_id)?.text_content()
    }

    fn theme_selectors(&self) -> Vec<ThemeSelector> {
        let Ok(nodes) = self.document.query_selector_all("[data-theme]") else {
            return Vec::new();
        };
        (0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .filter_map(|element| {
                let theme = element.get_attribute("data-theme")?;
                Some(ThemeSelector {
                    element: self.id_of(&element),
                    theme,
                })
            })
            .collect()
    }

    fn set_selector_pressed(&self, element: ElementId, pressed: bool) {
        let Some(element) = self.element(element) else {
            return;
        };
        let _ = element.set_attribute("aria-pressed", if pressed { "true" } else { "false" });
        let classes = element.class_list();
        let _ = if pressed {
            classes.add_1("active")
        } else {
            classes.remove_1("active")
        };
    }

    fn set_attribute(&self, element: ElementId, name: &str, value: &str) {
        if let Some(element) = self.element(element) {
            let _ = element.set_attribute(name, value);
        }
    }

    fn remove_attribute(&self, element: ElementId, name: &str) {
        if let Some(element) = self.element(element) {
            let _ = element.remove_attribute(name);
        }
    }

    fn active_element(&self) -> Option<ElementId> {
        let active = self.document.active_element()?;
        Some(self.id_of(&active))
    }

    fn focus(&self, element: ElementId) {
        let Some(element) = self.element(element) else {
            return;
        };
        if let Ok(element) = element.dyn_into::<HtmlElement>() {
            let _ = element.focus();
        }
    }

    fn focus_candidates(&self, container: ElementId) -> Vec<FocusCandidate> {
        self.prune_detached();
        let Some(container) = self.element(container) else {
            return Vec::new();
        };
        let Ok(nodes) = container.query_selector_all("*") else {
            return Vec::new();
        };
        (0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .map(|element| FocusCandidate {
                element: self.id_of(&element),
                tag: element.tag_name().to_ascii_lowercase(),
                has_href: element.has_attribute("href"),
                disabled: element.has_attribute("disabled"),
                tab_index: element
                    .get_attribute("tabindex")
                    .and_then(|value| value.trim().parse().ok()),
            })
            .collect()
    }
}
