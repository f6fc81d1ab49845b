//! Screen reader announcements through a polite live region
//!
//! Text is written, then cleared after a fixed delay. Clearing matters:
//! screen readers skip live-region updates that leave the text unchanged, so
//! announcing the same sentence twice only works if the region was emptied
//! in between.

use std::rc::Rc;
use std::time::Duration;

use crate::host::{Dom, Timers};

#[derive(Clone)]
pub struct LiveAnnouncer {
    dom: Rc<dyn Dom>,
    timers: Rc<dyn Timers>,
    region_id: String,
    clear_after: Duration,
}

impl LiveAnnouncer {
    pub fn new(
        dom: Rc<dyn Dom>,
        timers: Rc<dyn Timers>,
        region_id: impl Into<String>,
        clear_after: Duration,
    ) -> Self {
        Self {
            dom,
            timers,
            region_id: region_id.into(),
            clear_after,
        }
    }

    pub fn region_id(&self) -> &str {
        &self.region_id
    }

    /// Create the visually hidden `aria-live="polite"` region if missing
    pub fn ensure_region(&self) {
        self.dom.ensure_live_region(&self.region_id);
    }

    /// Announce `message`, clearing it after the configured delay unless a
    /// newer announcement replaced it first
    pub fn announce(&self, message: &str) {
        self.dom.set_live_region_text(&self.region_id, message);
        tracing::debug!("Announced: {}", message);

        let dom = Rc::clone(&self.dom);
        let region_id = self.region_id.clone();
        let message = message.to_string();
        self.timers.set_timeout(
            self.clear_after,
            Box::new(move || {
                if dom.live_region_text(&region_id).as_deref() == Some(message.as_str()) {
                    dom.set_live_region_text(&region_id, "");
                }
            }),
        );
    }
}
