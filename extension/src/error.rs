// Error types for the background worker

use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

#[derive(Error, Debug)]
pub enum BackgroundError {
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Malformed payload on channel '{channel}': {reason}")]
    MalformedPayload { channel: String, reason: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Storage write failed after {attempts} attempts: {last_error}")]
    StorageExhausted { attempts: u32, last_error: String },

    #[error("Tab messaging error: {0}")]
    Tabs(String),

    #[error("Icon error: {0}")]
    Icon(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BackgroundError>;

impl From<BackgroundError> for JsValue {
    fn from(err: BackgroundError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

/// Best-effort readable text for an exception thrown by a browser API.
pub fn js_error_message(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    format!("{:?}", value)
}
