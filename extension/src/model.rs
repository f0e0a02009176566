// Messages exchanged with the content script and the persisted table shape

use serde::{Deserialize, Serialize};

/// Payload sent to the content script once the messaging site has loaded.
pub const INJECT_LISTENERS: &str = "injectListeners";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TabNotification {
    pub message: String,
}

impl TabNotification {
    pub fn inject_listeners() -> Self {
        Self {
            message: INJECT_LISTENERS.to_string(),
        }
    }
}

/// One chat entry as extracted by the content script.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct RawMessage {
    #[serde(alias = "text", default)]
    pub message: String,
    /// `true` when the correspondent sent it, `false` when the user did.
    #[serde(default)]
    pub received: bool,
}

impl RawMessage {
    pub fn new(message: impl Into<String>, received: bool) -> Self {
        Self {
            message: message.into(),
            received,
        }
    }
}

/// Body of every message posted on the listener port.
#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ListenerPayload {
    pub messages: Vec<RawMessage>,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SentimentEntry {
    pub message: String,
    pub received: bool,
    pub sentiment: f64,
}

impl SentimentEntry {
    pub fn new(message: impl Into<String>, received: bool, sentiment: f64) -> Self {
        Self {
            message: message.into(),
            received,
            sentiment,
        }
    }
}

/// Per-message sentiment annotations in conversation order.
///
/// Serializes as a bare array so the stored value stays
/// `[{message, received, sentiment}, ...]`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(transparent)]
pub struct SentimentTable {
    entries: Vec<SentimentEntry>,
}

impl SentimentTable {
    pub fn new(entries: Vec<SentimentEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[SentimentEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Compare the two most recent scores.
    pub fn trend(&self) -> Trend {
        match self.entries.as_slice() {
            [.., previous, last] => Trend::between(previous.sentiment, last.sentiment),
            _ => Trend::Undetermined,
        }
    }

    /// Keep only the most recent `limit` entries.
    pub fn keep_latest(mut self, limit: usize) -> Self {
        if self.entries.len() > limit {
            let excess = self.entries.len() - limit;
            self.entries.drain(..excess);
        }
        self
    }
}

impl From<Vec<SentimentEntry>> for SentimentTable {
    fn from(entries: Vec<SentimentEntry>) -> Self {
        Self::new(entries)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trend {
    Positive,
    Negative,
    /// Fewer than two scores to compare.
    Undetermined,
}

impl Trend {
    pub fn between(previous: f64, last: f64) -> Self {
        if last >= previous {
            Trend::Positive
        } else {
            Trend::Negative
        }
    }
}

/// Identifies one conversation on the messaging site.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ConversationKey(String);

impl ConversationKey {
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        let id = id.trim();
        if id.is_empty() {
            None
        } else {
            Some(Self(id.to_string()))
        }
    }

    /// Pull the thread id out of a conversation URL such as
    /// `https://www.messenger.com/t/1234567890/?foo=bar`.
    pub fn from_url(url: &str) -> Option<Self> {
        let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
        let path = without_scheme
            .split(['?', '#'])
            .next()
            .unwrap_or_default();

        let mut segments = path.split('/').skip(1);
        while let Some(segment) = segments.next() {
            if segment == "t" {
                return segments.next().and_then(Self::new);
            }
        }
        None
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
