// Browser capabilities the background worker depends on.
// The Chrome implementation talks to chrome.* through wasm-bindgen; tests
// use the in-memory one.

pub mod chrome;
#[cfg(test)]
pub mod memory;

use crate::error::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};

pub type TabId = i32;

#[async_trait(?Send)]
pub trait Tabs {
    /// Active tab of the focused window, if there is one.
    async fn active_tab(&self) -> Result<Option<TabId>>;

    async fn send_message(&self, tab: TabId, payload: &Value) -> Result<()>;
}

#[async_trait(?Send)]
pub trait KeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Writes every item in one call.
    async fn set(&self, items: Map<String, Value>) -> Result<()>;

    async fn remove(&self, key: &str) -> Result<()>;
}

#[async_trait(?Send)]
pub trait ToolbarIcon {
    async fn set_icon(&self, path: &str) -> Result<()>;
}

#[async_trait(?Send)]
pub trait Timer {
    async fn sleep(&self, millis: u32);
}

pub trait Platform: Tabs + KeyValueStore + ToolbarIcon + Timer {}

impl<T: Tabs + KeyValueStore + ToolbarIcon + Timer> Platform for T {}
