// Chrome extension APIs (Manifest V3, promise-returning)

use super::{KeyValueStore, TabId, Tabs, Timer, ToolbarIcon};
use crate::error::{js_error_message, BackgroundError, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["chrome", "storage", "local"], js_name = get)]
    fn storage_get(keys: JsValue) -> js_sys::Promise;

    #[wasm_bindgen(js_namespace = ["chrome", "storage", "local"], js_name = set)]
    fn storage_set(items: JsValue) -> js_sys::Promise;

    #[wasm_bindgen(js_namespace = ["chrome", "storage", "local"], js_name = remove)]
    fn storage_remove(keys: JsValue) -> js_sys::Promise;

    #[wasm_bindgen(js_namespace = ["chrome", "tabs"], js_name = query)]
    fn tabs_query(query_info: JsValue) -> js_sys::Promise;

    #[wasm_bindgen(js_namespace = ["chrome", "tabs"], js_name = sendMessage)]
    fn tabs_send_message(tab_id: i32, message: JsValue) -> js_sys::Promise;

    #[wasm_bindgen(js_namespace = ["chrome", "action"], js_name = setIcon)]
    fn action_set_icon(details: JsValue) -> js_sys::Promise;
}

/// Structured clone of a JSON value into a JS object.
pub fn to_js(value: &Value) -> Result<JsValue> {
    let text = serde_json::to_string(value)?;
    js_sys::JSON::parse(&text)
        .map_err(|e| BackgroundError::Storage(format!("JSON parse failed: {}", js_error_message(&e))))
}

/// JSON view of a JS value; `undefined` maps to `null`.
pub fn from_js(value: &JsValue) -> Result<Value> {
    if value.is_undefined() {
        return Ok(Value::Null);
    }
    let text = js_sys::JSON::stringify(value)
        .map_err(|e| BackgroundError::Storage(format!("JSON stringify failed: {}", js_error_message(&e))))?;
    parse_stringified(text.as_string())
}

/// `JSON.stringify` yields `undefined` for functions and symbols.
fn parse_stringified(text: Option<String>) -> Result<Value> {
    let text = text.ok_or_else(|| {
        BackgroundError::Serialization(serde::de::Error::custom("value has no JSON representation"))
    })?;
    Ok(serde_json::from_str(&text)?)
}

fn get_property(target: &JsValue, key: &str) -> std::result::Result<JsValue, JsValue> {
    js_sys::Reflect::get(target, &JsValue::from_str(key))
}

#[derive(Clone, Copy, Default)]
pub struct ChromePlatform;

#[async_trait(?Send)]
impl Tabs for ChromePlatform {
    async fn active_tab(&self) -> Result<Option<TabId>> {
        let query = to_js(&serde_json::json!({"active": true, "currentWindow": true}))?;
        let tabs = JsFuture::from(tabs_query(query))
            .await
            .map_err(|e| BackgroundError::Tabs(js_error_message(&e)))?;

        let first = js_sys::Array::from(&tabs).get(0);
        if first.is_undefined() {
            return Ok(None);
        }
        let id = get_property(&first, "id").map_err(|e| BackgroundError::Tabs(js_error_message(&e)))?;
        Ok(id.as_f64().map(|id| id as TabId))
    }

    async fn send_message(&self, tab: TabId, payload: &Value) -> Result<()> {
        JsFuture::from(tabs_send_message(tab, to_js(payload)?))
            .await
            .map_err(|e| BackgroundError::Tabs(js_error_message(&e)))?;
        Ok(())
    }
}

#[async_trait(?Send)]
impl KeyValueStore for ChromePlatform {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let result = JsFuture::from(storage_get(JsValue::from_str(key)))
            .await
            .map_err(|e| BackgroundError::Storage(js_error_message(&e)))?;
        let value = get_property(&result, key).map_err(|e| BackgroundError::Storage(js_error_message(&e)))?;

        if value.is_undefined() {
            Ok(None)
        } else {
            Ok(Some(from_js(&value)?))
        }
    }

    async fn set(&self, items: Map<String, Value>) -> Result<()> {
        let items = to_js(&Value::Object(items))?;
        JsFuture::from(storage_set(items))
            .await
            .map_err(|e| BackgroundError::Storage(js_error_message(&e)))?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        JsFuture::from(storage_remove(JsValue::from_str(key)))
            .await
            .map_err(|e| BackgroundError::Storage(js_error_message(&e)))?;
        Ok(())
    }
}

#[async_trait(?Send)]
impl ToolbarIcon for ChromePlatform {
    async fn set_icon(&self, path: &str) -> Result<()> {
        let details = to_js(&serde_json::json!({ "path": path }))?;
        JsFuture::from(action_set_icon(details))
            .await
            .map_err(|e| BackgroundError::Icon(js_error_message(&e)))?;
        Ok(())
    }
}

#[async_trait(?Send)]
impl Timer for ChromePlatform {
    async fn sleep(&self, millis: u32) {
        gloo_timers::future::TimeoutFuture::new(millis).await;
    }
}
