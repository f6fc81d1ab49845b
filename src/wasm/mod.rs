//! WASM browser build module for themekit
//!
//! Binds the theme switcher and the accessibility engine to the live page.
//! JavaScript creates one `ThemeKit`, calls `init()` once the DOM is ready,
//! and wires settings panel controls to its methods.

pub mod event_adapter;
pub mod web_dom;
pub mod web_host;

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::convert::FromWasmAbi;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{future_to_promise, spawn_local};

use crate::a11y::{
    format_slider_value, AccessibilityEngine, FocusTrap, FontFamily, SliderField, Toggle,
};
use crate::config::EngineConfig;
use crate::host::{Dom, Host};
use crate::theme::{
    load_preview_tokens, SwitchHandle, ThemeChanged, ThemeSwitcher, THEME_CHANGED_EVENT,
};
use event_adapter::key_press_from_event;
use web_dom::WebDom;
use web_host::{WebFetcher, WebStorage, WebTimers};

fn to_promise(handle: SwitchHandle) -> js_sys::Promise {
    future_to_promise(async move {
        handle
            .await
            .map(JsValue::from)
            .map_err(|e| JsValue::from(e.to_string()))
    })
}

/// Media query behind `prefersReducedMotion`
pub const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

/// Media query behind `prefersHighContrast`
pub const HIGH_CONTRAST_QUERY: &str = "(prefers-contrast: high)";

type KeydownClosure = Closure<dyn FnMut(web_sys::KeyboardEvent)>;

/// Attach `handler` for `event_name` on `target`.
/// The listener stays attached for as long as the returned closure is alive.
fn listen<E: FromWasmAbi + 'static>(
    target: &web_sys::EventTarget,
    event_name: &str,
    handler: impl FnMut(E) + 'static,
) -> Closure<dyn FnMut(E)> {
    let callback = Closure::<dyn FnMut(E)>::new(handler);
    if let Err(e) =
        target.add_event_listener_with_callback(event_name, callback.as_ref().unchecked_ref())
    {
        web_sys::console::warn_1(&e);
    }
    callback
}

/// Re-dispatch a switcher notification as a `themeChanged` window event
fn dispatch_theme_changed(window: &web_sys::Window, change: &ThemeChanged) {
    let detail = match serde_json::to_string(change) {
        Ok(json) => js_sys::JSON::parse(&json).unwrap_or(JsValue::NULL),
        Err(e) => {
            tracing::warn!("Failed to encode theme change: {}", e);
            JsValue::NULL
        }
    };
    let init = web_sys::CustomEventInit::new();
    init.set_detail(&detail);
    match web_sys::CustomEvent::new_with_event_init_dict(THEME_CHANGED_EVENT, &init) {
        Ok(event) => {
            if let Err(e) = window.dispatch_event(&event) {
                web_sys::console::warn_1(&e);
            }
        }
        Err(e) => web_sys::console::warn_1(&e),
    }
}

fn media_query_matches(query: &str) -> bool {
    web_sys::window()
        .and_then(|window| window.match_media(query).ok().flatten())
        .is_some_and(|list| list.matches())
}

/// User asked the system for reduced motion
#[wasm_bindgen(js_name = prefersReducedMotion)]
pub fn prefers_reduced_motion() -> bool {
    media_query_matches(REDUCED_MOTION_QUERY)
}

/// User asked the system for more contrast
#[wasm_bindgen(js_name = prefersHighContrast)]
pub fn prefers_high_contrast() -> bool {
    media_query_matches(HIGH_CONTRAST_QUERY)
}

/// The focus trap currently installed on a container, with its keydown listener
struct ActiveTrap {
    trap: Rc<FocusTrap>,
    element: web_sys::Element,
    keydown: KeydownClosure,
}

impl ActiveTrap {
    fn release(self) {
        if let Err(e) = self
            .element
            .remove_event_listener_with_callback("keydown", self.keydown.as_ref().unchecked_ref())
        {
            web_sys::console::warn_1(&e);
        }
        self.trap.deactivate();
    }
}

/// WASM-exported handle over the page's theme switcher and settings engine
#[wasm_bindgen]
pub struct ThemeKit {
    dom: Rc<WebDom>,
    window: web_sys::Window,
    config: EngineConfig,
    switcher: ThemeSwitcher,
    engine: Rc<AccessibilityEngine>,
    trap: RefCell<Option<ActiveTrap>>,
}

#[wasm_bindgen]
impl ThemeKit {
    /// Create the handle; `config_json` overrides any `EngineConfig` field
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<ThemeKit, JsValue> {
        console_error_panic_hook::set_once();

        let config = match config_json {
            Some(json) => EngineConfig::from_json(&json).map_err(|e| JsValue::from(e.to_string()))?,
            None => EngineConfig::default(),
        };
        let window = web_sys::window().ok_or_else(|| JsValue::from("no window"))?;
        let dom = Rc::new(WebDom::from_window().ok_or_else(|| JsValue::from("no document"))?);
        let host = Host::new(
            dom.clone(),
            Rc::new(WebStorage::new(window.clone())),
            Rc::new(WebTimers::new(window.clone())),
        );
        let switcher = ThemeSwitcher::new(host.clone(), config.clone());
        let events = window.clone();
        switcher.subscribe(move |change| dispatch_theme_changed(&events, change));
        let engine = Rc::new(AccessibilityEngine::new(host, config.clone(), switcher.clone()));

        Ok(Self {
            dom,
            window,
            config,
            switcher,
            engine,
            trap: RefCell::new(None),
        })
    }

    /// Load the saved theme and settings, install the global keyboard and
    /// mouse listeners, and fill the preview swatch properties.
    /// Resolves with the active theme id.
    pub fn init(&self) -> js_sys::Promise {
        let initial = self.switcher.initialize();
        self.engine.restore();

        let document: &web_sys::EventTarget = self.dom.document();
        let switcher = self.switcher.clone();
        let engine = Rc::clone(&self.engine);
        // Page-lifetime listeners
        listen(document, "keydown", move |event: web_sys::KeyboardEvent| {
            let key = key_press_from_event(&event);
            engine.handle_key_down(&key);
            if switcher.handle_key(&key).is_some() {
                event.prevent_default();
            }
        })
        .forget();
        let engine = Rc::clone(&self.engine);
        listen(document, "mousedown", move |_: web_sys::Event| {
            engine.handle_mouse_down();
        })
        .forget();

        let dom = Rc::clone(&self.dom);
        let fetcher = WebFetcher::new(self.window.clone());
        let sources = self.config.preview_sources.clone();
        spawn_local(async move {
            load_preview_tokens(&fetcher, dom.as_ref(), &sources).await;
        });

        to_promise(initial)
    }

    /// Switch theme by catalog id; the promise rejects with the error text
    #[wasm_bindgen(js_name = switchTheme)]
    pub fn switch_theme(&self, id: &str) -> js_sys::Promise {
        to_promise(self.switcher.switch_theme(id))
    }

    #[wasm_bindgen(js_name = cycleTheme)]
    pub fn cycle_theme(&self) -> Option<js_sys::Promise> {
        self.switcher.cycle_theme().map(to_promise)
    }

    #[wasm_bindgen(js_name = currentTheme)]
    pub fn current_theme(&self) -> Option<String> {
        self.switcher.current_theme()
    }

    #[wasm_bindgen(js_name = isLoading)]
    pub fn is_loading(&self) -> bool {
        self.switcher.is_loading()
    }

    #[wasm_bindgen(js_name = availableThemes)]
    pub fn available_themes(&self) -> js_sys::Array {
        self.switcher
            .available_themes()
            .into_iter()
            .map(JsValue::from)
            .collect()
    }

    #[wasm_bindgen(js_name = addTheme)]
    pub fn add_theme(&self, id: &str, stylesheet_url: &str) {
        self.switcher.add_theme(id, stylesheet_url);
    }

    #[wasm_bindgen(js_name = removeTheme)]
    pub fn remove_theme(&self, id: &str) {
        self.switcher.remove_theme(id);
    }

    #[wasm_bindgen(js_name = preloadThemes)]
    pub fn preload_themes(&self) {
        self.switcher.preload_themes();
    }

    /// Current settings as camelCase JSON
    #[wasm_bindgen(js_name = settingsJson)]
    pub fn settings_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.engine.settings()).map_err(|e| JsValue::from(e.to_string()))
    }

    /// Toggle a boolean setting by record field name (`textOnly`, ...)
    #[wasm_bindgen(js_name = setToggle)]
    pub fn set_toggle(&self, name: &str, on: bool) -> bool {
        match Toggle::from_name(name) {
            Some(toggle) => {
                self.engine.set_toggle(toggle, on);
                true
            }
            None => false,
        }
    }

    /// Set a slider setting by record field name (`fontSize`, ...)
    #[wasm_bindgen(js_name = setSlider)]
    pub fn set_slider(&self, name: &str, value: u32) -> bool {
        match SliderField::from_name(name) {
            Some(field) => {
                self.engine.set_slider(field, value);
                true
            }
            None => false,
        }
    }

    #[wasm_bindgen(js_name = setFontFamily)]
    pub fn set_font_family(&self, name: &str) {
        self.engine.set_font_family(FontFamily::from_name(name));
    }

    /// Select a settings-panel theme name; resolves like `switchTheme`
    #[wasm_bindgen(js_name = setTheme)]
    pub fn set_theme(&self, name: &str) -> js_sys::Promise {
        to_promise(self.engine.set_theme(name).theme_switch)
    }

    #[wasm_bindgen(js_name = applyPreset)]
    pub fn apply_preset(&self, name: &str) -> bool {
        self.engine.apply_preset(name).is_some()
    }

    pub fn reset(&self) {
        self.engine.reset();
    }

    #[wasm_bindgen(js_name = formatSliderValue)]
    pub fn format_slider_value(&self, name: &str, value: u32) -> String {
        match SliderField::from_name(name) {
            Some(field) => format_slider_value(field, value),
            None => value.to_string(),
        }
    }

    /// Trap Tab navigation inside the element with `container_id`.
    /// Replaces any trap already active.
    #[wasm_bindgen(js_name = activateFocusTrap)]
    pub fn activate_focus_trap(&self, container_id: &str) -> bool {
        let Some(container) = self.dom.element_by_id(container_id) else {
            return false;
        };
        let Some(element) = self.dom.element(container) else {
            return false;
        };
        self.deactivate_focus_trap();

        let trap = Rc::new(FocusTrap::new(self.dom.clone() as Rc<dyn Dom>, container));
        trap.activate();
        let keydown = trap_keydown(Rc::clone(&trap), &element);
        *self.trap.borrow_mut() = Some(ActiveTrap {
            trap,
            element,
            keydown,
        });
        true
    }

    /// Release the active trap, removing its listener and restoring focus
    #[wasm_bindgen(js_name = deactivateFocusTrap)]
    pub fn deactivate_focus_trap(&self) {
        let active = self.trap.borrow_mut().take();
        if let Some(active) = active {
            active.release();
        }
    }

    #[wasm_bindgen(js_name = focusTrapActive)]
    pub fn focus_trap_active(&self) -> bool {
        self.trap
            .borrow()
            .as_ref()
            .is_some_and(|active| active.trap.is_active())
    }
}

fn trap_keydown(trap: Rc<FocusTrap>, element: &web_sys::Element) -> KeydownClosure {
    listen(element, "keydown", move |event: web_sys::KeyboardEvent| {
        let key = key_press_from_event(&event);
        if trap.handle_key(&key) {
            event.prevent_default();
        }
    })
}

/// Main entry point for WASM
#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    web_sys::console::log_1(&"themekit WASM module loaded".into());
}
