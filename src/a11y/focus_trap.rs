//! Keeps Tab navigation inside a modal-like container

use std::cell::Cell;
use std::rc::Rc;

use crate::host::{DocTarget, Dom, ElementId};
use crate::input::KeyPress;

/// Body class present while any trap is active
pub const TRAP_ACTIVE_CLASS: &str = "focus-trap-active";
/// Attribute marking the trapping container
pub const TRAP_ATTRIBUTE: &str = "data-focus-trap";

/// Focus trap over one container element.
///
/// Focusable descendants are recomputed on activation and on every Tab, as
/// the container's content may change while the trap is active. Only the
/// wrap-around at either end is handled; moves between interior elements are
/// left to the browser.
pub struct FocusTrap {
    dom: Rc<dyn Dom>,
    container: ElementId,
    previously_focused: Cell<Option<ElementId>>,
    active: Cell<bool>,
}

impl FocusTrap {
    pub fn new(dom: Rc<dyn Dom>, container: ElementId) -> Self {
        Self {
            dom,
            container,
            previously_focused: Cell::new(None),
            active: Cell::new(false),
        }
    }

    pub fn container(&self) -> ElementId {
        self.container
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    /// First and last focusable descendants in document order
    fn bounds(&self) -> Option<(ElementId, ElementId)> {
        let focusable: Vec<ElementId> = self
            .dom
            .focus_candidates(self.container)
            .into_iter()
            .filter(|candidate| candidate.is_focusable())
            .map(|candidate| candidate.element)
            .collect();
        Some((*focusable.first()?, *focusable.last()?))
    }

    pub fn activate(&self) {
        self.previously_focused.set(self.dom.active_element());
        self.dom.add_class(DocTarget::Body, TRAP_ACTIVE_CLASS);
        self.dom.set_attribute(self.container, TRAP_ATTRIBUTE, "active");
        self.active.set(true);

        if let Some((first, _)) = self.bounds() {
            self.dom.focus(first);
        }
    }

    pub fn deactivate(&self) {
        self.dom.remove_class(DocTarget::Body, TRAP_ACTIVE_CLASS);
        self.dom.remove_attribute(self.container, TRAP_ATTRIBUTE);
        self.active.set(false);

        if let Some(previous) = self.previously_focused.take() {
            self.dom.focus(previous);
        }
    }

    /// Keydown inside the container. Returns true when focus was wrapped and
    /// the browser's default Tab handling must be prevented.
    pub fn handle_key(&self, key: &KeyPress) -> bool {
        if !self.active.get() || !key.is_tab() {
            return false;
        }
        let Some((first, last)) = self.bounds() else {
            return false;
        };
        let current = self.dom.active_element();

        if key.shift() {
            if current == Some(first) {
                self.dom.focus(last);
                return true;
            }
        } else if current == Some(last) {
            self.dom.focus(first);
            return true;
        }
        false
    }
}
