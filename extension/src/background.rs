// Background service worker for TypeSense
// background.js attaches the chrome listeners synchronously and forwards every event here.

use crate::config::Config;
use crate::connection::{ConnectionHandler, PortInfo, PortOutcome};
use crate::error::Result;
use crate::model::{ConversationKey, SentimentTable};
use crate::navigation::{NavigationEvent, NavigationOutcome, NavigationWatcher};
use crate::platform::chrome::{self, ChromePlatform};
use crate::platform::Platform;
use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures::StreamExt;
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

pub struct Background<P> {
    navigation: NavigationWatcher,
    connection: ConnectionHandler,
    platform: P,
}

impl<P: Platform> Background<P> {
    pub fn new(config: &Config, platform: P) -> Self {
        Self {
            navigation: NavigationWatcher::new(&config.navigation),
            connection: ConnectionHandler::new(config),
            platform,
        }
    }

    pub async fn on_navigation_completed(&self, event: &NavigationEvent) -> Result<NavigationOutcome> {
        self.navigation.on_completed(&self.platform, event).await
    }

    pub async fn on_port_message(&self, port: &PortInfo, payload: Value) -> Result<PortOutcome> {
        self.connection.on_message(&self.platform, port, payload).await
    }

    pub async fn current_table(&self) -> Result<Option<SentimentTable>> {
        self.connection.threads().current(&self.platform).await
    }

    pub async fn conversation_table(&self, conversation: &ConversationKey) -> Result<Option<SentimentTable>> {
        self.connection.threads().load(&self.platform, conversation).await
    }
}

/// Drain one port's payloads in arrival order. A batch finishes, write
/// retries included, before the next one starts.
pub async fn serve_port<P: Platform>(
    background: Rc<Background<P>>,
    port: PortInfo,
    mut queue: UnboundedReceiver<Value>,
) {
    while let Some(payload) = queue.next().await {
        match background.on_port_message(&port, payload).await {
            Ok(PortOutcome::Analyzed { entries, trend, .. }) => {
                log::info!("Analyzed {} entries, trend {:?}", entries, trend);
            }
            Ok(PortOutcome::Ignored) => {}
            Err(e) => log::error!("Failed to handle message on '{}': {}", port.name, e),
        }
    }
    log::debug!("Port '{}' closed", port.name);
}

thread_local! {
    static BACKGROUND: RefCell<Option<Rc<Background<ChromePlatform>>>> = const { RefCell::new(None) };
}

fn instance() -> std::result::Result<Rc<Background<ChromePlatform>>, JsValue> {
    BACKGROUND
        .with(|slot| slot.borrow().clone())
        .ok_or_else(|| JsValue::from_str("Background worker not initialized"))
}

/// Initialize background service worker
#[wasm_bindgen(start)]
pub fn start() -> std::result::Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let config = Config::embedded()?;
    wasm_logger::init(wasm_logger::Config::new(config.logging.level()?));

    let background = Rc::new(Background::new(&config, ChromePlatform));
    BACKGROUND.with(|slot| *slot.borrow_mut() = Some(background));

    log::info!(
        "TypeSense background worker started (watching {}, channel '{}')",
        config.navigation.target_domain,
        config.connection.channel
    );
    Ok(())
}

/// Handle a completed navigation from `chrome.webNavigation.onCompleted`.
/// Resolves to "ignored", "no-active-tab" or "notified".
#[wasm_bindgen]
pub async fn handle_navigation(url: String, frame_id: Option<i32>) -> std::result::Result<JsValue, JsValue> {
    let event = NavigationEvent {
        url,
        frame_id: frame_id.map(i64::from),
    };
    let outcome = match instance()?.on_navigation_completed(&event).await {
        Ok(outcome) => outcome,
        Err(e) => {
            log::warn!("Could not notify content script for {}: {}", event.url, e);
            return Err(e.into());
        }
    };
    let label = match outcome {
        NavigationOutcome::Ignored => "ignored",
        NavigationOutcome::NoActiveTab => "no-active-tab",
        NavigationOutcome::Notified(_) => "notified",
    };
    Ok(JsValue::from_str(label))
}

/// A connected `chrome.runtime.Port`. Payloads pushed here are handled one
/// at a time by a task that lives until the session is freed.
#[wasm_bindgen]
pub struct PortSession {
    name: String,
    inbox: UnboundedSender<Value>,
}

#[wasm_bindgen]
impl PortSession {
    #[wasm_bindgen(constructor)]
    pub fn new(name: String, sender_url: Option<String>) -> std::result::Result<PortSession, JsValue> {
        let background = instance()?;
        let port = PortInfo {
            name: name.clone(),
            sender_url,
        };
        log::debug!("Port connected: '{}'", port.name);

        let (inbox, queue) = mpsc::unbounded();
        wasm_bindgen_futures::spawn_local(serve_port(background, port, queue));
        Ok(Self { name, inbox })
    }

    /// Queue one message from the port.
    pub fn push(&self, payload: JsValue) -> std::result::Result<(), JsValue> {
        let payload = chrome::from_js(&payload)?;
        self.inbox
            .unbounded_send(payload)
            .map_err(|e| JsValue::from_str(&format!("Port '{}' is closed: {}", self.name, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScorerKind;
    use crate::model::Trend;
    use crate::platform::memory::MemoryPlatform;
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_page_load_then_batch_round_trip() {
        let platform = MemoryPlatform::with_active_tab(11);
        let background = Background::new(&Config::default(), platform.clone());

        let navigation = NavigationEvent::top_level("https://www.messenger.com/t/555");
        let outcome = block_on(background.on_navigation_completed(&navigation)).unwrap();
        assert_eq!(outcome, NavigationOutcome::Notified(11));

        let port = PortInfo::new("listener").with_sender_url("https://www.messenger.com/t/555");
        let payload = json!({
            "messages": [
                {"message": "I love this plan", "received": true},
                {"message": "this is terrible, I hate it", "received": false}
            ]
        });
        let outcome = block_on(background.on_port_message(&port, payload)).unwrap();
        assert!(matches!(outcome, PortOutcome::Analyzed { entries: 2, trend: Trend::Negative, .. }));

        let key = ConversationKey::new("555").unwrap();
        let by_conversation = block_on(background.conversation_table(&key)).unwrap();
        let current = block_on(background.current_table()).unwrap();
        assert_eq!(by_conversation, current);

        let state = platform.state();
        assert_eq!(state.sent.len(), 1);
        assert_eq!(state.icons, vec!["assets/icon_red.png".to_string()]);
    }

    #[test]
    fn test_placeholder_scenario_selects_positive_icon() {
        let mut config = Config::default();
        config.scorer.kind = ScorerKind::Placeholder;
        let platform = MemoryPlatform::new();
        let background = Background::new(&config, platform.clone());

        let outcome = block_on(background.on_port_message(
            &PortInfo::new("listener"),
            json!({"messages": [{"message": "anything"}]}),
        ))
        .unwrap();

        assert!(matches!(outcome, PortOutcome::Analyzed { entries: 20, trend: Trend::Positive, .. }));
        assert_eq!(platform.state().icons, vec!["assets/icon_green.png".to_string()]);
        assert_eq!(block_on(background.current_table()).unwrap().map(|t| t.len()), Some(20));
    }

    #[test]
    fn test_unrelated_traffic_leaves_state_untouched() {
        let platform = MemoryPlatform::with_active_tab(1);
        let background = Background::new(&Config::default(), platform.clone());

        block_on(background.on_navigation_completed(&NavigationEvent::top_level("https://news.example.com/")))
            .unwrap();
        block_on(background.on_port_message(&PortInfo::new("settings"), json!({"messages": []}))).unwrap();

        let state = platform.state();
        assert!(state.sent.is_empty());
        assert!(state.storage.is_empty());
        assert!(state.icons.is_empty());
    }

    #[test]
    fn test_port_queue_keeps_batches_in_order_when_a_write_is_retried() {
        let platform = MemoryPlatform::new();
        {
            let mut state = platform.state_mut();
            state.failing_writes = 1;
            state.yielding_sleeps = true;
        }
        let background = Rc::new(Background::new(&Config::default(), platform.clone()));
        let (inbox, queue) = mpsc::unbounded();

        let older = json!({"messages": [{"message": "I love it"}, {"message": "this is awful"}]});
        let newer = json!({"messages": [{"message": "this is awful"}, {"message": "I love it"}]});
        let producer = async move {
            inbox.unbounded_send(older).unwrap();
            inbox.unbounded_send(newer).unwrap();
        };
        block_on(async {
            futures::join!(producer, serve_port(Rc::clone(&background), PortInfo::new("listener"), queue));
        });

        let state = platform.state();
        assert_eq!(state.sleeps, vec![250]);
        assert_eq!(state.writes, 2);
        let messages: Vec<&str> = state.storage["currentThread"]
            .as_array()
            .unwrap()
            .iter()
            .map(|entry| entry["message"].as_str().unwrap())
            .collect();
        assert_eq!(messages, vec!["this is awful", "I love it"]);
        assert_eq!(
            state.icons,
            vec!["assets/icon_red.png".to_string(), "assets/icon_green.png".to_string()]
        );
    }

    #[test]
    fn test_port_queue_survives_a_failed_batch() {
        let platform = MemoryPlatform::new();
        let background = Rc::new(Background::new(&Config::default(), platform.clone()));
        let (inbox, queue) = mpsc::unbounded();

        inbox.unbounded_send(json!({"messages": "not a list"})).unwrap();
        inbox
            .unbounded_send(json!({"messages": [{"message": "good"}, {"message": "great"}]}))
            .unwrap();
        drop(inbox);
        block_on(serve_port(background, PortInfo::new("listener"), queue));

        let state = platform.state();
        assert_eq!(state.writes, 1);
        assert_eq!(state.icons, vec!["assets/icon_green.png".to_string()]);
    }
}
