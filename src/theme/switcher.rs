//! Theme switcher - owns the active theme and the live stylesheet link
//!
//! State machine:
//!
//! ```text
//! Uninitialized -> Idle(current) -> Switching(target) -> Idle(target)    (load)
//!                                                     -> Idle(previous)  (error)
//! ```
//!
//! `ActiveThemeState` is the source of truth. Body classes, `aria-pressed`
//! on selector controls and the mobile theme color are a projection of it,
//! written once per transition and never read back.
//!
//! The current id is updated optimistically when a switch starts, so two
//! near-simultaneous switches never both read a stale value: the later call
//! writes the link href last and its target becomes canonical. Every switch
//! attaches one once-listener to the link; all attached listeners fire on
//! the next load/error event, so an earlier switch still runs its success
//! path for its (stale) target unless `supersede_stale_switches` is set.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use serde::Serialize;
use tokio::sync::oneshot;

use super::announcer::LiveAnnouncer;
use super::catalog::{ThemeCatalog, ThemeDescriptor};
use super::error::ThemeError;
use crate::config::EngineConfig;
use crate::host::{DocTarget, Host, LinkEvent};
use crate::input::KeyPress;

/// Body class present while a stylesheet swap is in flight
pub const SWITCHING_CLASS: &str = "theme-switching";

/// Prefix of the per-theme body class
pub const THEME_CLASS_PREFIX: &str = "a11y-theme-";

/// Body class for a theme id: `a11y-dark` and `dark` both map to `a11y-theme-dark`
pub fn theme_body_class(id: &str) -> String {
    format!("{}{}", THEME_CLASS_PREFIX, id.strip_prefix("a11y-").unwrap_or(id))
}

/// Active theme as owned by the switcher
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveThemeState {
    /// `None` until the first switch, so the first switch always loads
    pub current_theme_id: Option<String>,
    /// True while at least one stylesheet swap awaits its load/error event
    pub is_loading: bool,
}

/// Name of the window event the browser binding dispatches for `ThemeChanged`
pub const THEME_CHANGED_EVENT: &str = "themeChanged";

/// Notification sent to subscribers after a theme finished loading.
/// Serializes as the browser event's `detail` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThemeChanged {
    pub theme: String,
    #[serde(rename = "previousTheme")]
    pub previous: Option<String>,
}

type Settled = Result<String, ThemeError>;

/// Pending result of `ThemeSwitcher::switch_theme`
///
/// Resolves with the theme id once the stylesheet has loaded. Await it on
/// any executor, or poll it without one through `try_result`.
#[derive(Debug)]
pub struct SwitchHandle {
    theme: String,
    receiver: Option<oneshot::Receiver<Settled>>,
    settled: Option<Settled>,
}

impl SwitchHandle {
    fn pending(theme: &str) -> (Self, oneshot::Sender<Settled>) {
        let (sender, receiver) = oneshot::channel();
        let handle = Self {
            theme: theme.to_string(),
            receiver: Some(receiver),
            settled: None,
        };
        (handle, sender)
    }

    fn ready(theme: &str, result: Settled) -> Self {
        Self {
            theme: theme.to_string(),
            receiver: None,
            settled: Some(result),
        }
    }

    /// Theme id this switch targets
    pub fn theme(&self) -> &str {
        &self.theme
    }

    /// Outcome if the switch has settled, `None` while it is still pending
    pub fn try_result(&mut self) -> Option<Settled> {
        if self.settled.is_none() {
            let receiver = self.receiver.as_mut()?;
            match receiver.try_recv() {
                Ok(result) => self.settled = Some(result),
                Err(oneshot::error::TryRecvError::Empty) => return None,
                Err(oneshot::error::TryRecvError::Closed) => {
                    self.settled = Some(Err(ThemeError::Dropped(self.theme.clone())));
                }
            }
            self.receiver = None;
        }
        self.settled.clone()
    }

    pub fn is_settled(&mut self) -> bool {
        self.try_result().is_some()
    }
}

impl Future for SwitchHandle {
    type Output = Settled;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if let Some(settled) = self.settled.take() {
            return Poll::Ready(settled);
        }
        let theme = self.theme.clone();
        let Some(receiver) = self.receiver.as_mut() else {
            return Poll::Ready(Err(ThemeError::Dropped(theme)));
        };
        match Pin::new(receiver).poll(cx) {
            Poll::Ready(result) => {
                self.receiver = None;
                Poll::Ready(result.unwrap_or(Err(ThemeError::Dropped(theme))))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

type Observer = Rc<dyn Fn(&ThemeChanged)>;

struct SwitcherInner {
    host: Host,
    config: EngineConfig,
    announcer: LiveAnnouncer,
    catalog: RefCell<ThemeCatalog>,
    state: RefCell<ActiveThemeState>,
    in_flight: Cell<usize>,
    generation: Cell<u64>,
    observers: RefCell<Vec<Observer>>,
}

/// Switch request captured by the link listener
struct PendingSwitch {
    theme: String,
    previous: Option<String>,
    generation: u64,
    sender: oneshot::Sender<Settled>,
}

/// Handle to the theme switcher; clones share one switcher
#[derive(Clone)]
pub struct ThemeSwitcher {
    inner: Rc<SwitcherInner>,
}

impl ThemeSwitcher {
    /// Switcher over the catalog described by `config.themes`
    pub fn new(host: Host, config: EngineConfig) -> Self {
        let catalog = ThemeCatalog::from_descriptors(config.themes.iter().cloned());
        Self::with_catalog(host, config, catalog)
    }

    pub fn with_catalog(host: Host, config: EngineConfig, catalog: ThemeCatalog) -> Self {
        let announcer = LiveAnnouncer::new(
            Rc::clone(&host.dom),
            Rc::clone(&host.timers),
            config.announcer_element_id.clone(),
            config.announcement_clear_after(),
        );
        Self {
            inner: Rc::new(SwitcherInner {
                host,
                config,
                announcer,
                catalog: RefCell::new(catalog),
                state: RefCell::new(ActiveThemeState::default()),
                in_flight: Cell::new(0),
                generation: Cell::new(0),
                observers: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// Announcer writing to this switcher's live region
    pub fn announcer(&self) -> &LiveAnnouncer {
        &self.inner.announcer
    }

    /// Prepare the document and load the persisted (or default) theme.
    ///
    /// Creates the live stylesheet link at the end of `<head>` if absent,
    /// creates the announcer region, migrates legacy and unknown persisted
    /// ids, then performs the initial switch.
    pub fn initialize(&self) -> SwitchHandle {
        self.ensure_theme_link();
        self.inner.announcer.ensure_region();

        let theme = self.restore_theme_id();
        self.switch_theme(&theme)
    }

    fn ensure_theme_link(&self) {
        let link_id = &self.inner.config.link_element_id;
        if self.inner.host.dom.ensure_theme_link(link_id) {
            tracing::debug!("Created theme link #{}", link_id);
        }
    }

    fn restore_theme_id(&self) -> String {
        let key = &self.inner.config.storage.theme;
        let saved = match self.inner.host.store.get(key) {
            Ok(saved) => saved,
            Err(e) => {
                tracing::debug!("Could not read saved theme: {}", e);
                None
            }
        };
        let default = self.inner.config.default_theme.clone();
        let Some(mut theme) = saved else {
            return default;
        };

        if let Some(migrated) = self.inner.config.legacy_theme_ids.get(&theme) {
            tracing::info!("Migrating legacy theme id {} to {}", theme, migrated);
            theme = migrated.clone();
            self.persist(&theme);
        }
        if !self.inner.catalog.borrow().contains(&theme) {
            tracing::warn!("Saved theme {} is not available, using {}", theme, default);
            theme = default;
            self.persist(&theme);
        }
        theme
    }

    fn persist(&self, theme: &str) {
        let key = &self.inner.config.storage.theme;
        if let Err(e) = self.inner.host.store.set(key, theme) {
            tracing::debug!("Could not save theme preference: {}", e);
        }
    }

    /// Switch to `id`.
    ///
    /// Unknown ids are rejected without touching the document. Switching to
    /// the current theme resolves immediately. Otherwise the link href is
    /// swapped and the handle settles on the stylesheet's load/error event.
    pub fn switch_theme(&self, id: &str) -> SwitchHandle {
        let url = match self.inner.catalog.borrow().resolve(id) {
            Ok(descriptor) => descriptor.stylesheet_url.clone(),
            Err(e) => {
                tracing::error!("{}", e);
                return SwitchHandle::ready(id, Err(e));
            }
        };

        let previous = {
            let mut state = self.inner.state.borrow_mut();
            if state.current_theme_id.as_deref() == Some(id) {
                return SwitchHandle::ready(id, Ok(id.to_string()));
            }
            let previous = state.current_theme_id.replace(id.to_string());
            state.is_loading = true;
            previous
        };

        let generation = self.inner.generation.get() + 1;
        self.inner.generation.set(generation);
        self.inner.in_flight.set(self.inner.in_flight.get() + 1);

        // A switch issued before `initialize` must still have a link to load through
        self.ensure_theme_link();
        let dom = &self.inner.host.dom;
        dom.add_class(DocTarget::Body, SWITCHING_CLASS);

        let (handle, sender) = SwitchHandle::pending(id);
        let pending = PendingSwitch {
            theme: id.to_string(),
            previous,
            generation,
            sender,
        };
        let inner = Rc::clone(&self.inner);
        dom.on_theme_link_settled(Box::new(move |event| {
            ThemeSwitcher { inner }.settle(event, pending);
        }));
        tracing::debug!("Switching theme to {} ({})", id, url);
        dom.set_theme_link_href(&url);
        handle
    }

    fn settle(&self, event: LinkEvent, pending: PendingSwitch) {
        let in_flight = self.inner.in_flight.get().saturating_sub(1);
        self.inner.in_flight.set(in_flight);
        if in_flight == 0 {
            self.inner.state.borrow_mut().is_loading = false;
        }
        let dom = &self.inner.host.dom;

        let stale = pending.generation != self.inner.generation.get();
        if stale && self.inner.config.supersede_stale_switches {
            tracing::debug!("Ignoring superseded switch to {}", pending.theme);
            if in_flight == 0 {
                dom.remove_class(DocTarget::Body, SWITCHING_CLASS);
            }
            let _ = pending.sender.send(Err(ThemeError::Superseded(pending.theme)));
            return;
        }

        match event {
            LinkEvent::Load => {
                self.persist(&pending.theme);
                dom.remove_class(DocTarget::Body, SWITCHING_CLASS);
                self.update_theme_indicators(&pending.theme);
                self.announce_theme_change(&pending.theme);
                self.notify(&ThemeChanged {
                    theme: pending.theme.clone(),
                    previous: pending.previous,
                });
                tracing::info!("Theme switched to: {}", pending.theme);
                let _ = pending.sender.send(Ok(pending.theme));
            }
            LinkEvent::Error => {
                tracing::error!("Failed to load theme: {}", pending.theme);
                dom.remove_class(DocTarget::Body, SWITCHING_CLASS);
                {
                    let mut state = self.inner.state.borrow_mut();
                    if state.current_theme_id.as_deref() == Some(pending.theme.as_str()) {
                        state.current_theme_id = pending.previous;
                    }
                }
                let _ = pending
                    .sender
                    .send(Err(ThemeError::LoadFailed(pending.theme)));
            }
        }
    }

    /// Project `id` onto the document: selector `aria-pressed`, the per-theme
    /// body class, and (after a short delay) the mobile theme color
    pub fn update_theme_indicators(&self, id: &str) {
        let dom = &self.inner.host.dom;
        for selector in dom.theme_selectors() {
            dom.set_selector_pressed(selector.element, selector.theme == id);
        }

        for class in dom.classes(DocTarget::Body) {
            if class.starts_with(THEME_CLASS_PREFIX) {
                dom.remove_class(DocTarget::Body, &class);
            }
        }
        if id != self.inner.config.default_theme {
            dom.add_class(DocTarget::Body, &theme_body_class(id));
        }

        // Computed values are only meaningful once the new rules apply
        let dom = Rc::clone(dom);
        let properties = self.inner.config.theme_color_properties.clone();
        let fallback = self.inner.config.theme_color_fallback.clone();
        self.inner.host.timers.set_timeout(
            self.inner.config.theme_color_delay(),
            Box::new(move || {
                let color = properties
                    .iter()
                    .filter_map(|name| dom.computed_root_property(name))
                    .map(|value| value.trim().to_string())
                    .find(|value| !value.is_empty())
                    .unwrap_or(fallback);
                dom.set_meta_theme_color(&color);
            }),
        );
    }

    /// Tell assistive technology which theme is now active
    pub fn announce_theme_change(&self, id: &str) {
        let name = self
            .inner
            .catalog
            .borrow()
            .get(id)
            .map(|d| d.display_name().to_string())
            .unwrap_or_else(|| id.to_string());
        self.inner
            .announcer
            .announce(&format!("Color theme changed to {}", name));
    }

    /// Switch to the next theme in catalog order, wrapping around.
    /// Returns `None` when the catalog is empty.
    pub fn cycle_theme(&self) -> Option<SwitchHandle> {
        let next = {
            let catalog = self.inner.catalog.borrow();
            let state = self.inner.state.borrow();
            catalog
                .next_after(state.current_theme_id.as_deref())
                .map(|d| d.id.clone())
        }?;
        Some(self.switch_theme(&next))
    }

    /// Global keydown hook. Returns the switch started by the cycle
    /// shortcut; `Some` means the host should prevent the default action.
    pub fn handle_key(&self, key: &KeyPress) -> Option<SwitchHandle> {
        if self.inner.config.cycle_shortcut.matches(key) {
            self.cycle_theme()
        } else {
            None
        }
    }

    pub fn current_theme(&self) -> Option<String> {
        self.inner.state.borrow().current_theme_id.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().is_loading
    }

    pub fn state(&self) -> ActiveThemeState {
        self.inner.state.borrow().clone()
    }

    pub fn available_themes(&self) -> Vec<String> {
        self.inner.catalog.borrow().list_ids()
    }

    pub fn descriptor(&self, id: &str) -> Option<ThemeDescriptor> {
        self.inner.catalog.borrow().get(id).cloned()
    }

    pub fn add_theme(&self, id: &str, stylesheet_url: &str) {
        self.inner.catalog.borrow_mut().register(id, stylesheet_url);
    }

    pub fn add_theme_descriptor(&self, descriptor: ThemeDescriptor) {
        self.inner.catalog.borrow_mut().register_descriptor(descriptor);
    }

    pub fn remove_theme(&self, id: &str) {
        self.inner.catalog.borrow_mut().unregister(id);
    }

    /// Append a preload link per theme stylesheet for faster switching
    pub fn preload_themes(&self) {
        for descriptor in self.inner.catalog.borrow().iter() {
            self.inner
                .host
                .dom
                .append_preload_link(&descriptor.stylesheet_url);
        }
    }

    /// Call `observer` after every completed theme switch
    pub fn subscribe(&self, observer: impl Fn(&ThemeChanged) + 'static) {
        self.inner.observers.borrow_mut().push(Rc::new(observer));
    }

    fn notify(&self, change: &ThemeChanged) {
        // Observers may subscribe or switch again; call them without a borrow held
        let observers: Vec<Observer> = self.inner.observers.borrow().clone();
        for observer in observers {
            observer(change);
        }
    }
}
