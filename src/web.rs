#![cfg(target_arch = "wasm32")]

use std::rc::Rc;

use anyhow::{anyhow, Result};
use gloo_events::EventListener;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{window, Document, Element, HtmlInputElement, HtmlSelectElement};

use crate::binder::{ControlBinder, ControlEvent};
use crate::surface::ControlSurface;
use crate::{BindingTable, ConfigStore, SceneConfig};

#[wasm_bindgen(start)]
pub fn bootstrap() {
    console_error_panic_hook::set_once();
    let _ = wasm_logger::init(wasm_logger::Config::default());
}

/// Control surface backed by the live page.
#[derive(Debug, Clone)]
pub struct DomSurface {
    document: Document,
}

impl DomSurface {
    pub fn new(document: Document) -> Self {
        Self { document }
    }
}

impl ControlSurface for DomSurface {
    fn has_control(&self, id: &str) -> bool {
        self.document.get_element_by_id(id).is_some()
    }

    fn set_readout(&self, id: &str, text: &str) {
        if let Some(label) = self.document.get_element_by_id(id) {
            label.set_text_content(Some(text));
        }
    }
}

/// One DOM listener per binding; dropping it detaches them all.
pub struct ControlListeners {
    listeners: Vec<EventListener>,
}

impl ControlListeners {
    pub fn attach(document: &Document, binder: Rc<ControlBinder<DomSurface>>) -> Result<Self> {
        let mut listeners = Vec::new();
        for spec in binder.bindings() {
            let element = document
                .get_element_by_id(&spec.control)
                .ok_or_else(|| anyhow!("control `{}` not found", spec.control))?;
            let control = spec.control.clone();
            let trigger = spec.trigger;
            let binder = Rc::clone(&binder);
            let source = element.clone();
            listeners.push(EventListener::new(
                &element,
                trigger.event_name(),
                move |_event| {
                    let event = read_control(&source);
                    if let Err(err) = binder.dispatch(&control, trigger, &event) {
                        log::error!("{err}");
                    }
                },
            ));
        }
        log::info!("Attached {} control listener(s)", listeners.len());
        Ok(Self { listeners })
    }
}

impl Drop for ControlListeners {
    fn drop(&mut self) {
        self.listeners.clear();
    }
}

fn read_control(element: &Element) -> ControlEvent {
    if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
        return ControlEvent {
            value: input.value(),
            checked: input.checked(),
        };
    }
    if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
        return ControlEvent::value(select.value());
    }
    ControlEvent::value(element.text_content().unwrap_or_default())
}

/// Scene control panel bound to the current page.
///
/// The render loop pulls the configuration with `snapshotJson()` on its own
/// schedule; no notification is sent when a control changes it.
#[wasm_bindgen]
pub struct SceneControls {
    binder: Rc<ControlBinder<DomSurface>>,
    _listeners: ControlListeners,
}

#[wasm_bindgen]
impl SceneControls {
    #[wasm_bindgen(constructor)]
    pub fn new(initial_json: Option<String>) -> Result<SceneControls, JsValue> {
        let config = match initial_json {
            Some(json) => SceneConfig::from_json(&json).map_err(to_js_error)?,
            None => SceneConfig::default(),
        };
        let document = window()
            .and_then(|win| win.document())
            .ok_or_else(|| JsValue::from_str("document not available"))?;

        let binder = ControlBinder::bind(
            BindingTable::standard(),
            ConfigStore::from_config(config),
            DomSurface::new(document.clone()),
        )
        .map_err(|err| JsValue::from_str(&err.to_string()))?;
        let binder = Rc::new(binder);
        let listeners =
            ControlListeners::attach(&document, Rc::clone(&binder)).map_err(to_js_error)?;

        Ok(Self {
            binder,
            _listeners: listeners,
        })
    }

    #[wasm_bindgen(js_name = snapshotJson)]
    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        self.binder.store().snapshot().to_json().map_err(to_js_error)
    }

    /// Resets the whole configuration from `json`. This is a host-side reset
    /// and bypasses the bindings, which only ever mutate slot fields in place.
    #[wasm_bindgen(js_name = loadJson)]
    pub fn load_json(&self, json: &str) -> Result<(), JsValue> {
        let config = SceneConfig::from_json(json).map_err(to_js_error)?;
        self.binder.store().replace(config);
        Ok(())
    }
}

fn to_js_error(err: anyhow::Error) -> JsValue {
    JsValue::from_str(&format!("{err:#}"))
}
