//! WASM bindings for tchaik-core
//!
//! Exposes the collection client to the browser UI. The page owns the websocket: it passes a
//! `send` callback in, and feeds every frame it receives to `receive`.
//!
//! ```javascript,ignore
//! import init, { CollectionClient, initLogging } from './tchaik_core.js';
//!
//! await init();
//! initLogging();
//!
//! const sock = new WebSocket("ws://localhost:8080/socket");
//! const client = new CollectionClient((json) => sock.send(json));
//! sock.onmessage = (ev) => client.receive(ev.data);
//!
//! const path = ["Root"];
//! const key = client.pathToKey(path);
//! const id = client.addChangeListener((changed) => {
//!     if (changed === key) render(client.getCollection(path));
//! });
//! client.fetch(path);
//! // ... on unmount
//! client.removeChangeListener(id);
//! ```
//!
//! `getCollection` returns `undefined` for a path that is not cached. Nodes are returned as plain
//! objects (serialized through `serde_json::Value`), not `Map`s.

use parking_lot::Mutex;
use std::{collections::BTreeMap, sync::Arc};
use wasm_bindgen::prelude::*;
use web_sys::console;

use crate::{
    context::AppContext,
    error::TchaikError,
    paths::{CollectionPath, PathKey},
    properties::Track,
    store::{ListenerHandle, Lookup},
    transport::Transport,
    wire::OutboundMessage,
};

/// A JS function held by Rust code. Store and transport bounds are relaxed on wasm32, so this
/// needs no `Send`/`Sync`.
struct JsCallback(js_sys::Function);

impl JsCallback {
    fn call(&self, arg: &JsValue) -> Result<JsValue, JsValue> {
        self.0.call1(&JsValue::NULL, arg)
    }
}

impl Transport for JsCallback {
    fn send(&self, message: OutboundMessage) -> Result<(), TchaikError> {
        let json = message.to_json()?;
        self.call(&JsValue::from_str(&json))
            .map(|_| ())
            .map_err(|e| TchaikError::Transport(format!("send callback threw: {e:?}")))
    }
}

fn to_js_error(e: TchaikError) -> JsValue {
    let msg = format!("❌ {e}");
    console::error_1(&msg.clone().into());
    JsValue::from_str(&msg)
}

fn to_plain_object<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    let value = serde_json::to_value(value).map_err(|e| to_js_error(e.into()))?;
    serde_wasm_bindgen::to_value(&value).map_err(|e| to_js_error(e.into()))
}

fn path_from_js(path: JsValue) -> Result<CollectionPath, JsValue> {
    let segments: Vec<String> =
        serde_wasm_bindgen::from_value(path).map_err(|e| to_js_error(e.into()))?;
    CollectionPath::new(segments).map_err(to_js_error)
}

/// Route tracing output to the browser console.
#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging() {
    tracing_wasm::set_as_global_default();
}

/// Which store a JS listener id was registered with.
#[derive(Debug, Clone, Copy)]
enum Registry {
    Collection,
    Search,
}

#[wasm_bindgen]
pub struct CollectionClient {
    ctx: Arc<AppContext>,
    handles: Mutex<BTreeMap<u32, (Registry, ListenerHandle)>>,
    next_id: Mutex<u32>,
}

#[wasm_bindgen]
impl CollectionClient {
    #[wasm_bindgen(constructor)]
    pub fn new(send: js_sys::Function) -> CollectionClient {
        CollectionClient {
            ctx: AppContext::new(Arc::new(JsCallback(send))),
            handles: Mutex::new(BTreeMap::new()),
            next_id: Mutex::new(0),
        }
    }

    pub fn fetch(&self, path: JsValue) -> Result<(), JsValue> {
        let path = path_from_js(path)?;
        self.ctx.fetch(&path).map(|_| ()).map_err(to_js_error)
    }

    /// Returns the cached node as a plain object, or `undefined`.
    #[wasm_bindgen(js_name = getCollection)]
    pub fn get_collection(&self, path: JsValue) -> Result<JsValue, JsValue> {
        let path = path_from_js(path)?;
        match self.ctx.collections().get_collection(&path) {
            Lookup::Absent => Ok(JsValue::UNDEFINED),
            Lookup::Present(node) => to_plain_object(node.as_ref()),
        }
    }

    #[wasm_bindgen(js_name = pathToKey)]
    pub fn path_to_key(&self, path: JsValue) -> Result<String, JsValue> {
        let path = path_from_js(path)?;
        Ok(self.ctx.collections().path_to_key(&path).to_string())
    }

    /// `listener` is called with the changed key string. Returns an id for
    /// `removeChangeListener`.
    #[wasm_bindgen(js_name = addChangeListener)]
    pub fn add_change_listener(&self, listener: js_sys::Function) -> u32 {
        let callback = JsCallback(listener);
        let handle = self
            .ctx
            .collections()
            .add_change_listener(move |key: &PathKey| {
                if let Err(e) = callback.call(&JsValue::from_str(key.as_str())) {
                    console::warn_1(&format!("⚠️ change listener threw: {e:?}").into());
                }
            });
        self.remember(Registry::Collection, handle)
    }

    /// Removes a listener added with either `addChangeListener` or `addSearchListener`.
    #[wasm_bindgen(js_name = removeChangeListener)]
    pub fn remove_change_listener(&self, id: u32) -> bool {
        match self.handles.lock().remove(&id) {
            Some((Registry::Collection, handle)) => {
                self.ctx.collections().remove_change_listener(handle)
            }
            Some((Registry::Search, handle)) => {
                self.ctx.search_store().remove_change_listener(handle)
            }
            None => false,
        }
    }

    pub fn search(&self, input: String) -> Result<(), JsValue> {
        self.ctx.search(&input).map_err(to_js_error)
    }

    /// Returns an array of plain objects.
    #[wasm_bindgen(js_name = getResults)]
    pub fn get_results(&self) -> Result<JsValue, JsValue> {
        to_plain_object(self.ctx.search_store().get_results().as_ref())
    }

    /// `listener` is called without arguments whenever the results change.
    #[wasm_bindgen(js_name = addSearchListener)]
    pub fn add_search_listener(&self, listener: js_sys::Function) -> u32 {
        let callback = JsCallback(listener);
        let handle = self.ctx.search_store().add_change_listener(move || {
            if let Err(e) = callback.call(&JsValue::UNDEFINED) {
                console::warn_1(&format!("⚠️ search listener threw: {e:?}").into());
            }
        });
        self.remember(Registry::Search, handle)
    }

    #[wasm_bindgen(js_name = setCurrentTrack)]
    pub fn set_current_track(&self, track: JsValue) -> Result<(), JsValue> {
        let track: Track =
            serde_wasm_bindgen::from_value(track).map_err(|e| to_js_error(e.into()))?;
        self.ctx.set_current_track(track).map_err(to_js_error)
    }

    /// Feed one websocket frame to the client.
    pub fn receive(&self, json: &str) -> Result<(), JsValue> {
        self.ctx.receive_json(json).map_err(to_js_error)
    }

    pub fn reset(&self) {
        self.ctx.reset();
        self.handles.lock().clear();
    }
}

impl CollectionClient {
    fn remember(&self, registry: Registry, handle: ListenerHandle) -> u32 {
        let mut next_id = self.next_id.lock();
        let id = *next_id;
        *next_id += 1;
        self.handles.lock().insert(id, (registry, handle));
        id
    }
}
