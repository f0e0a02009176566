// TypeSense background worker
// Watches the messaging site, scores conversation batches from the content
// script and reflects the sentiment trend in the toolbar icon.

pub mod background;
pub mod config;
pub mod connection;
pub mod error;
pub mod model;
pub mod navigation;
pub mod platform;
pub mod sentiment;
pub mod services;

pub use background::Background;
pub use config::Config;
pub use error::{BackgroundError, Result};
pub use model::{RawMessage, SentimentEntry, SentimentTable, Trend};
