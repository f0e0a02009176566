// Long-lived port from the content script: scores and stores each batch

use crate::config::{Config, IconConfig};
use crate::error::{BackgroundError, Result};
use crate::model::{ConversationKey, ListenerPayload, Trend};
use crate::platform::{KeyValueStore, Timer, ToolbarIcon};
use crate::sentiment::{self, Scorer};
use crate::services::storage::ThreadStore;
use serde_json::Value;

/// What the background knows about a connected port.
#[derive(Clone, Debug)]
pub struct PortInfo {
    pub name: String,
    /// URL of the tab the content script runs in.
    pub sender_url: Option<String>,
}

impl PortInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sender_url: None,
        }
    }

    pub fn with_sender_url(mut self, url: impl Into<String>) -> Self {
        self.sender_url = Some(url.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PortOutcome {
    /// Message arrived on a channel nobody handles.
    Ignored,
    Analyzed {
        conversation: Option<ConversationKey>,
        entries: usize,
        trend: Trend,
    },
}

/// Scores message batches from the content script, stores them and updates
/// the toolbar icon.
pub struct ConnectionHandler {
    channel: String,
    icons: IconConfig,
    scorer: Box<dyn Scorer>,
    threads: ThreadStore,
}

impl ConnectionHandler {
    pub fn new(config: &Config) -> Self {
        Self::with_scorer(config, sentiment::from_config(&config.scorer))
    }

    pub fn with_scorer(config: &Config, scorer: Box<dyn Scorer>) -> Self {
        Self {
            channel: config.connection.channel.clone(),
            icons: config.icon.clone(),
            scorer,
            threads: ThreadStore::new(config.storage.clone()),
        }
    }

    pub fn threads(&self) -> &ThreadStore {
        &self.threads
    }

    pub async fn on_message<P>(&self, platform: &P, port: &PortInfo, payload: Value) -> Result<PortOutcome>
    where
        P: KeyValueStore + Timer + ToolbarIcon + ?Sized,
    {
        if port.name != self.channel {
            log::debug!("Ignoring message on port '{}'", port.name);
            return Ok(PortOutcome::Ignored);
        }

        let payload: ListenerPayload =
            serde_json::from_value(payload).map_err(|e| BackgroundError::MalformedPayload {
                channel: port.name.clone(),
                reason: e.to_string(),
            })?;

        let conversation = payload
            .conversation_id
            .and_then(ConversationKey::new)
            .or_else(|| port.sender_url.as_deref().and_then(ConversationKey::from_url));
        if conversation.is_none() {
            log::warn!("Batch has no conversation id, only the current thread slot is updated");
        }

        let table = self.scorer.score(&payload.messages);
        log::debug!(
            "Scored {} messages into {} entries",
            payload.messages.len(),
            table.len()
        );

        let table = self.threads.save(platform, conversation.as_ref(), table).await?;

        let trend = table.trend();
        match trend {
            Trend::Positive => platform.set_icon(&self.icons.positive).await?,
            Trend::Negative => platform.set_icon(&self.icons.negative).await?,
            Trend::Undetermined => {
                log::debug!("Fewer than two entries, leaving icon unchanged");
            }
        }

        Ok(PortOutcome::Analyzed {
            conversation,
            entries: table.len(),
            trend,
        })
    }
}
