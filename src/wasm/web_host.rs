//! Browser implementations of storage, timers and stylesheet fetching

use std::time::Duration;

use async_trait::async_trait;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Response, Storage, Window};

use crate::host::{CssFetcher, FetchError, FetchResponse, KeyValueStore, StorageError, Timers};

fn describe(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| format!("{:?}", value))
}

fn storage_error(value: JsValue) -> StorageError {
    let message = describe(&value);
    if message.contains("QuotaExceeded") || message.contains("quota") {
        StorageError::QuotaExceeded
    } else {
        StorageError::Other(message)
    }
}

/// `window.localStorage`, resolved on every call
///
/// Access can throw (sandboxed frames, disabled storage); that surfaces as
/// `StorageError::Unavailable`.
pub struct WebStorage {
    window: Window,
}

impl WebStorage {
    pub fn new(window: Window) -> Self {
        Self { window }
    }

    fn storage(&self) -> Result<Storage, StorageError> {
        match self.window.local_storage() {
            Ok(Some(storage)) => Ok(storage),
            _ => Err(StorageError::Unavailable),
        }
    }
}

impl KeyValueStore for WebStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage()?.get_item(key).map_err(storage_error)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage()?.set_item(key, value).map_err(storage_error)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.storage()?.remove_item(key).map_err(storage_error)
    }
}

/// `window.setTimeout`
pub struct WebTimers {
    window: Window,
}

impl WebTimers {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl Timers for WebTimers {
    fn set_timeout(&self, delay: Duration, task: Box<dyn FnOnce()>) {
        let callback = Closure::once_into_js(move || task());
        let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        if let Err(e) = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), millis)
        {
            tracing::warn!("setTimeout failed: {}", describe(&e));
        }
    }
}

/// `window.fetch` returning response text
pub struct WebFetcher {
    window: Window,
}

impl WebFetcher {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

async fn settle(request: js_sys::Promise) -> Result<FetchResponse, FetchError> {
    let response = JsFuture::from(request)
        .await
        .map_err(|e| FetchError::Transport(describe(&e)))?;
    let response: Response = response
        .dyn_into()
        .map_err(|e| FetchError::Transport(describe(&e)))?;
    let status = response.status();
    let text = response
        .text()
        .map_err(|e| FetchError::Transport(describe(&e)))?;
    let body = JsFuture::from(text)
        .await
        .map_err(|e| FetchError::Transport(describe(&e)))?;
    Ok(FetchResponse {
        status,
        body: body.as_string().unwrap_or_default(),
    })
}

#[async_trait(?Send)]
impl CssFetcher for WebFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        settle(self.window.fetch_with_str(url)).await
    }

    /// Every request is issued before the first one is awaited, so the
    /// browser runs them in parallel
    async fn fetch_all(&self, urls: &[String]) -> Vec<Result<FetchResponse, FetchError>> {
        let requests: Vec<js_sys::Promise> = urls
            .iter()
            .map(|url| self.window.fetch_with_str(url))
            .collect();
        let mut responses = Vec::with_capacity(requests.len());
        for request in requests {
            responses.push(settle(request).await);
        }
        responses
    }
}
