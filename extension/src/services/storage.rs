// Per-conversation sentiment tables on top of the extension's key-value storage
//
// Every save also overwrites the `currentThread` slot, which the popup reads.

use crate::config::StorageConfig;
use crate::error::{BackgroundError, Result};
use crate::model::{ConversationKey, SentimentTable};
use crate::platform::{KeyValueStore, Timer};
use serde_json::{Map, Value};

pub struct ThreadStore {
    config: StorageConfig,
}

impl ThreadStore {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    fn thread_key(&self, conversation: &ConversationKey) -> String {
        format!("{}{}", self.config.thread_key_prefix, conversation)
    }

    /// Store the latest table for a conversation.
    ///
    /// The table is trimmed to the history limit first and the trimmed table
    /// is returned. Failed writes are retried with linear backoff.
    pub async fn save<S>(
        &self,
        store: &S,
        conversation: Option<&ConversationKey>,
        table: SentimentTable,
    ) -> Result<SentimentTable>
    where
        S: KeyValueStore + Timer + ?Sized,
    {
        let table = table.keep_latest(self.config.history_limit);
        let value = serde_json::to_value(&table)?;

        let mut items = Map::new();
        items.insert(self.config.current_thread_key.clone(), value.clone());
        if let Some(conversation) = conversation {
            items.insert(self.thread_key(conversation), value);
        }

        let attempts = self.config.write_attempts.max(1);
        let mut attempt = 1;
        loop {
            match store.set(items.clone()).await {
                Ok(()) => {
                    log::info!(
                        "Populated sentiment table for {} ({} entries)",
                        conversation.map_or("current thread", |c| c.as_str()),
                        table.len()
                    );
                    return Ok(table);
                }
                Err(e) if attempt < attempts => {
                    let delay = self.config.retry_backoff_ms.saturating_mul(attempt);
                    log::warn!(
                        "Storage write attempt {}/{} failed: {}, retrying in {}ms",
                        attempt,
                        attempts,
                        e,
                        delay
                    );
                    store.sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    log::error!("Storage write failed after {} attempts: {}", attempt, e);
                    return Err(BackgroundError::StorageExhausted {
                        attempts: attempt,
                        last_error: e.to_string(),
                    });
                }
            }
        }
    }

    pub async fn load<S>(&self, store: &S, conversation: &ConversationKey) -> Result<Option<SentimentTable>>
    where
        S: KeyValueStore + ?Sized,
    {
        Self::read(store, &self.thread_key(conversation)).await
    }

    /// Table from the most recent analysis, whatever the conversation.
    pub async fn current<S>(&self, store: &S) -> Result<Option<SentimentTable>>
    where
        S: KeyValueStore + ?Sized,
    {
        Self::read(store, &self.config.current_thread_key).await
    }

    pub async fn forget<S>(&self, store: &S, conversation: &ConversationKey) -> Result<()>
    where
        S: KeyValueStore + ?Sized,
    {
        store.remove(&self.thread_key(conversation)).await?;
        log::info!("Removed sentiment table for {}", conversation);
        Ok(())
    }

    async fn read<S>(store: &S, key: &str) -> Result<Option<SentimentTable>>
    where
        S: KeyValueStore + ?Sized,
    {
        match store.get(key).await? {
            None | Some(Value::Null) => Ok(None),
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
        }
    }
}
