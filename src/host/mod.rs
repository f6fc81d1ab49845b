//! Host seams - everything the engines touch outside their own state
//!
//! The theme switcher and the accessibility engine never talk to a browser
//! directly. They go through four traits:
//!
//! - **`Dom`**: the document (theme link, classes, inline styles, live region,
//!   theme selector controls, focus)
//! - **`KeyValueStore`**: durable client storage (localStorage in a browser)
//! - **`Timers`**: deferred callbacks (`setTimeout`)
//! - **`CssFetcher`**: stylesheet text retrieval for preview tokens
//!
//! Each trait has an in-memory implementation used by tests and native tools.
//! The browser implementations live in `crate::wasm`.

mod dom;
mod fetch;
mod memory_dom;
mod storage;
mod timer;

use std::rc::Rc;

pub use dom::{DocTarget, Dom, ElementId, FocusCandidate, LinkEvent, LinkListener, ThemeSelector};
#[cfg(feature = "runtime")]
pub use fetch::DirFetcher;
pub use fetch::{CssFetcher, FetchError, FetchResponse, MemoryFetcher};
pub use memory_dom::{HeadNode, MemoryDom};
pub use storage::{KeyValueStore, MemoryStore, StorageError};
pub use timer::{ManualTimers, Timers};

/// Bundle of host handles shared by the switcher and the settings engine
///
/// All handles are reference counted; cloning a `Host` is cheap and every
/// clone talks to the same document and storage.
#[derive(Clone)]
pub struct Host {
    pub dom: Rc<dyn Dom>,
    pub store: Rc<dyn KeyValueStore>,
    pub timers: Rc<dyn Timers>,
}

impl Host {
    pub fn new(dom: Rc<dyn Dom>, store: Rc<dyn KeyValueStore>, timers: Rc<dyn Timers>) -> Self {
        Self { dom, store, timers }
    }
}

/// Typed handles to an in-memory host, for tests and native tooling
///
/// Keeps the concrete types around so callers can drive simulated events
/// (stylesheet load/error, timer advance) while the engines hold the
/// type-erased `Host`.
#[derive(Clone)]
pub struct MemoryHost {
    pub dom: Rc<MemoryDom>,
    pub store: Rc<MemoryStore>,
    pub timers: Rc<ManualTimers>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self {
            dom: Rc::new(MemoryDom::new()),
            store: Rc::new(MemoryStore::new()),
            timers: Rc::new(ManualTimers::new()),
        }
    }

    /// Type-erased view of this host for engine constructors
    pub fn host(&self) -> Host {
        Host::new(self.dom.clone(), self.store.clone(), self.timers.clone())
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}
