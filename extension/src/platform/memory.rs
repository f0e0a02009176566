// In-memory platform for tests: records everything the worker does

use super::{KeyValueStore, TabId, Tabs, Timer, ToolbarIcon};
use crate::error::{BackgroundError, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

#[derive(Default)]
pub struct MemoryState {
    pub active_tab: Option<TabId>,
    pub sent: Vec<(TabId, Value)>,
    pub storage: BTreeMap<String, Value>,
    /// Successful `set` calls.
    pub writes: usize,
    /// Number of upcoming `set` calls that fail.
    pub failing_writes: u32,
    pub icons: Vec<String>,
    pub sleeps: Vec<u32>,
    /// Make `sleep` hand control back to the executor once, like a real timer.
    pub yielding_sleeps: bool,
    pub unreachable_tabs: bool,
}

#[derive(Clone, Default)]
pub struct MemoryPlatform {
    state: Rc<RefCell<MemoryState>>,
}

impl MemoryPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_active_tab(tab: TabId) -> Self {
        let platform = Self::new();
        platform.state.borrow_mut().active_tab = Some(tab);
        platform
    }

    pub fn state(&self) -> std::cell::Ref<'_, MemoryState> {
        self.state.borrow()
    }

    pub fn state_mut(&self) -> std::cell::RefMut<'_, MemoryState> {
        self.state.borrow_mut()
    }
}

#[async_trait(?Send)]
impl Tabs for MemoryPlatform {
    async fn active_tab(&self) -> Result<Option<TabId>> {
        Ok(self.state.borrow().active_tab)
    }

    async fn send_message(&self, tab: TabId, payload: &Value) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.unreachable_tabs {
            return Err(BackgroundError::Tabs(
                "Could not establish connection. Receiving end does not exist.".to_string(),
            ));
        }
        state.sent.push((tab, payload.clone()));
        Ok(())
    }
}

#[async_trait(?Send)]
impl KeyValueStore for MemoryPlatform {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.state.borrow().storage.get(key).cloned())
    }

    async fn set(&self, items: Map<String, Value>) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.failing_writes > 0 {
            state.failing_writes -= 1;
            return Err(BackgroundError::Storage("QUOTA_BYTES quota exceeded".to_string()));
        }
        state.storage.extend(items);
        state.writes += 1;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.state.borrow_mut().storage.remove(key);
        Ok(())
    }
}

#[async_trait(?Send)]
impl ToolbarIcon for MemoryPlatform {
    async fn set_icon(&self, path: &str) -> Result<()> {
        self.state.borrow_mut().icons.push(path.to_string());
        Ok(())
    }
}

#[async_trait(?Send)]
impl Timer for MemoryPlatform {
    async fn sleep(&self, millis: u32) {
        let yielding = {
            let mut state = self.state.borrow_mut();
            state.sleeps.push(millis);
            state.yielding_sleeps
        };
        if yielding {
            YieldOnce(false).await;
        }
    }
}

struct YieldOnce(bool);

impl Future for YieldOnce {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0 {
            return Poll::Ready(());
        }
        self.0 = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}
