// Rule-based valence scorer (VADER-style)
//
// Word valences are on a -4..4 scale. The per-message sum is squashed into
// [-1, 1] with s / sqrt(s^2 + ALPHA).

use super::Scorer;
use crate::model::{RawMessage, SentimentEntry, SentimentTable};
use std::collections::HashMap;
use std::sync::OnceLock;

const ALPHA: f64 = 15.0;
const BOOST_INCREMENT: f64 = 0.293;
const BOOST_DECREMENT: f64 = -0.293;
const CAPS_INCREMENT: f64 = 0.733;
const NEGATION_SCALAR: f64 = -0.74;
const EXCLAMATION_WEIGHT: f64 = 0.292;
const QUESTION_WEIGHT: f64 = 0.18;
const MAX_EXCLAMATIONS: usize = 4;
const MAX_QUESTION_BONUS: f64 = 0.96;
/// Preceding tokens inspected for negations and boosters.
const LOOKBACK: usize = 3;

const VALENCES: &[(&str, f64)] = &[
    // emoticons
    (":)", 2.0),
    (":-)", 2.0),
    (":d", 2.3),
    (":-d", 2.3),
    (";)", 0.9),
    ("<3", 1.9),
    ("xd", 1.5),
    (":(", -1.9),
    (":-(", -1.9),
    (":'(", -2.2),
    (":/", -1.4),
    // positive
    ("agree", 1.5),
    ("amazing", 2.8),
    ("awesome", 3.1),
    ("beautiful", 2.9),
    ("best", 3.2),
    ("better", 1.9),
    ("calm", 1.3),
    ("care", 2.2),
    ("congrats", 2.4),
    ("congratulations", 2.9),
    ("cool", 1.3),
    ("cute", 2.0),
    ("enjoy", 2.2),
    ("enjoyed", 2.3),
    ("excellent", 2.7),
    ("excited", 1.4),
    ("exciting", 2.2),
    ("fantastic", 2.6),
    ("fine", 0.8),
    ("friend", 2.2),
    ("fun", 2.3),
    ("funny", 1.9),
    ("glad", 2.0),
    ("good", 1.9),
    ("great", 3.1),
    ("haha", 2.0),
    ("hahaha", 2.2),
    ("happy", 2.7),
    ("hope", 1.9),
    ("hug", 2.1),
    ("hugs", 2.2),
    ("interesting", 1.7),
    ("kind", 2.4),
    ("kiss", 1.8),
    ("laugh", 2.6),
    ("like", 2.0),
    ("lmao", 2.0),
    ("lol", 1.8),
    ("love", 3.2),
    ("loved", 2.9),
    ("lovely", 2.8),
    ("lucky", 1.8),
    ("nice", 1.8),
    ("ok", 1.2),
    ("okay", 0.9),
    ("perfect", 2.7),
    ("please", 1.3),
    ("proud", 2.1),
    ("relaxed", 2.2),
    ("relief", 2.1),
    ("safe", 1.9),
    ("smile", 1.5),
    ("sweet", 2.0),
    ("thank", 1.5),
    ("thanks", 1.9),
    ("welcome", 2.0),
    ("wonderful", 2.7),
    ("wow", 2.8),
    ("yay", 2.4),
    ("yes", 1.7),
    // negative
    ("afraid", -2.2),
    ("alone", -1.0),
    ("angry", -2.3),
    ("annoyed", -1.6),
    ("annoying", -1.7),
    ("awful", -2.0),
    ("bad", -2.5),
    ("bored", -1.1),
    ("boring", -1.3),
    ("broken", -1.4),
    ("cry", -2.1),
    ("crying", -2.1),
    ("damn", -1.7),
    ("dead", -3.3),
    ("die", -2.9),
    ("disappointed", -1.9),
    ("disappointing", -2.2),
    ("fail", -2.5),
    ("hate", -2.7),
    ("hated", -3.2),
    ("horrible", -2.5),
    ("hurt", -2.4),
    ("ignore", -1.5),
    ("ignored", -1.6),
    ("jealous", -2.0),
    ("kill", -3.7),
    ("lonely", -1.5),
    ("lost", -1.3),
    ("mad", -2.2),
    ("miss", -0.6),
    ("no", -1.2),
    ("pain", -2.3),
    ("problem", -1.7),
    ("rude", -2.0),
    ("sad", -2.1),
    ("scared", -2.2),
    ("shit", -2.6),
    ("sick", -2.2),
    ("sorry", -0.3),
    ("stupid", -2.4),
    ("suck", -1.9),
    ("sucks", -1.5),
    ("terrible", -2.1),
    ("tired", -1.9),
    ("ugh", -1.8),
    ("unfortunately", -1.4),
    ("upset", -1.6),
    ("worried", -1.2),
    ("worry", -1.9),
    ("worse", -2.1),
    ("worst", -3.1),
    ("wrong", -2.1),
];

const NEGATIONS: &[&str] = &[
    "aint", "cannot", "cant", "didnt", "doesnt", "dont", "hardly", "isnt", "neither", "never",
    "nobody", "none", "nope", "nor", "not", "nothing", "nowhere", "wasnt", "without", "wont",
];

const BOOSTERS: &[(&str, f64)] = &[
    ("absolutely", BOOST_INCREMENT),
    ("completely", BOOST_INCREMENT),
    ("deeply", BOOST_INCREMENT),
    ("especially", BOOST_INCREMENT),
    ("extremely", BOOST_INCREMENT),
    ("fully", BOOST_INCREMENT),
    ("highly", BOOST_INCREMENT),
    ("incredibly", BOOST_INCREMENT),
    ("most", BOOST_INCREMENT),
    ("really", BOOST_INCREMENT),
    ("so", BOOST_INCREMENT),
    ("super", BOOST_INCREMENT),
    ("too", BOOST_INCREMENT),
    ("totally", BOOST_INCREMENT),
    ("truly", BOOST_INCREMENT),
    ("very", BOOST_INCREMENT),
    ("almost", BOOST_DECREMENT),
    ("barely", BOOST_DECREMENT),
    ("kinda", BOOST_DECREMENT),
    ("less", BOOST_DECREMENT),
    ("little", BOOST_DECREMENT),
    ("slightly", BOOST_DECREMENT),
    ("somewhat", BOOST_DECREMENT),
    ("sorta", BOOST_DECREMENT),
];

fn valences() -> &'static HashMap<&'static str, f64> {
    static TABLE: OnceLock<HashMap<&'static str, f64>> = OnceLock::new();
    TABLE.get_or_init(|| VALENCES.iter().copied().collect())
}

fn booster(word: &str) -> Option<f64> {
    BOOSTERS
        .iter()
        .find_map(|&(w, scalar)| (w == word).then_some(scalar))
}

fn is_negation(word: &str) -> bool {
    NEGATIONS.contains(&word) || word.ends_with("n't")
}

struct Token {
    word: String,
    shouting: bool,
}

fn tokenize(text: &str) -> Vec<Token> {
    let text = text.replace('\u{2019}', "'");
    text.split_whitespace()
        .filter_map(|raw| {
            let lowered = raw.to_lowercase();
            let word = if valences().contains_key(lowered.as_str()) {
                lowered
            } else {
                let stripped = raw.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'');
                if stripped.is_empty() {
                    return None;
                }
                stripped.to_lowercase()
            };

            let letters: Vec<char> = raw.chars().filter(|c| c.is_alphabetic()).collect();
            let shouting = letters.len() > 1 && letters.iter().all(|c| c.is_uppercase());
            Some(Token { word, shouting })
        })
        .collect()
}

/// Some but not all words are in capitals.
fn has_mixed_case(tokens: &[Token]) -> bool {
    let alphabetic = tokens
        .iter()
        .filter(|t| t.word.chars().any(char::is_alphabetic))
        .count();
    let shouting = tokens.iter().filter(|t| t.shouting).count();
    shouting > 0 && shouting < alphabetic
}

fn signed(magnitude: f64, valence: f64) -> f64 {
    if valence < 0.0 {
        -magnitude
    } else {
        magnitude
    }
}

fn token_valence(tokens: &[Token], index: usize, mixed_case: bool) -> Option<f64> {
    let token = &tokens[index];
    if token.word == "kind" && tokens.get(index + 1).is_some_and(|next| next.word == "of") {
        return None;
    }
    let mut valence = *valences().get(token.word.as_str())?;

    if token.shouting && mixed_case {
        valence += signed(CAPS_INCREMENT, valence);
    }

    let mut negated = false;
    for distance in 1..=LOOKBACK.min(index) {
        let previous = &tokens[index - distance];
        if let Some(scalar) = booster(&previous.word) {
            let mut scalar = signed(scalar, valence);
            if previous.shouting && mixed_case {
                scalar += signed(CAPS_INCREMENT, valence);
            }
            let damping = match distance {
                1 => 1.0,
                2 => 0.95,
                _ => 0.9,
            };
            valence += scalar * damping;
        }
        negated |= is_negation(&previous.word);
    }

    if negated {
        valence *= NEGATION_SCALAR;
    }
    Some(valence)
}

fn punctuation_emphasis(text: &str) -> f64 {
    let exclamations = text.matches('!').count().min(MAX_EXCLAMATIONS);
    let questions = text.matches('?').count();
    let question_bonus = match questions {
        0 | 1 => 0.0,
        2 | 3 => questions as f64 * QUESTION_WEIGHT,
        _ => MAX_QUESTION_BONUS,
    };
    exclamations as f64 * EXCLAMATION_WEIGHT + question_bonus
}

/// Compound polarity of a piece of text, in [-1, 1]. Neutral text is 0.
pub fn polarity(text: &str) -> f64 {
    let tokens = tokenize(text);
    let mixed_case = has_mixed_case(&tokens);

    let mut scores: Vec<Option<f64>> = (0..tokens.len())
        .map(|i| token_valence(&tokens, i, mixed_case))
        .collect();

    // Clauses after "but" carry more weight than those before it.
    if let Some(pivot) = tokens.iter().position(|t| t.word == "but") {
        for (i, score) in scores.iter_mut().enumerate() {
            if let Some(value) = score {
                if i < pivot {
                    *value *= 0.5;
                } else if i > pivot {
                    *value *= 1.5;
                }
            }
        }
    }

    let mut sum: f64 = scores.into_iter().flatten().sum();
    if sum == 0.0 {
        return 0.0;
    }
    sum += signed(punctuation_emphasis(text), sum);

    (sum / (sum * sum + ALPHA).sqrt()).clamp(-1.0, 1.0)
}

/// Scores each message, optionally together with the messages just before it.
pub struct LexiconScorer {
    window: usize,
}

impl LexiconScorer {
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
        }
    }
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Scorer for LexiconScorer {
    fn score(&self, messages: &[RawMessage]) -> SentimentTable {
        messages
            .iter()
            .enumerate()
            .map(|(i, raw)| {
                let start = (i + 1).saturating_sub(self.window);
                let context = messages[start..=i]
                    .iter()
                    .map(|m| m.message.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                SentimentEntry::new(raw.message.clone(), raw.received, polarity(&context))
            })
            .collect::<Vec<_>>()
            .into()
    }
}
