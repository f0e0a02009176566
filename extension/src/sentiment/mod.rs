// Sentiment scoring for conversation batches

mod lexicon;
mod placeholder;

pub use lexicon::{polarity, LexiconScorer};
pub use placeholder::PlaceholderScorer;

use crate::config::{ScorerConfig, ScorerKind};
use crate::model::{RawMessage, SentimentTable};

/// Turns a batch of raw messages into a sentiment table.
///
/// Real scorers return one entry per input message, in input order, carrying
/// the message text and direction.
pub trait Scorer {
    fn score(&self, messages: &[RawMessage]) -> SentimentTable;
}

pub fn from_config(config: &ScorerConfig) -> Box<dyn Scorer> {
    match config.kind {
        ScorerKind::Lexicon => Box::new(LexiconScorer::new(config.window)),
        ScorerKind::Placeholder => Box::new(PlaceholderScorer),
    }
}
