//! Lexicon polarity scorer
//!
//! Word-weight dictionary for market news headlines, with intensifiers that
//! scale the next scored word and negations that flip it at half strength.
//! Polarity is the mean over scored words, clamped to [-1, 1].

use std::collections::HashMap;

use super::PolarityScorer;

/// Scaling applied to a negated word
const NEGATION_FACTOR: f64 = -0.5;

const POSITIVE_WORDS: &[(&str, f64)] = &[
    ("beat", 0.6),
    ("beats", 0.6),
    ("bullish", 0.8),
    ("boom", 0.6),
    ("breakout", 0.6),
    ("buy", 0.4),
    ("confident", 0.5),
    ("gain", 0.5),
    ("gains", 0.5),
    ("good", 0.7),
    ("great", 0.8),
    ("growth", 0.5),
    ("high", 0.16),
    ("improve", 0.4),
    ("improved", 0.4),
    ("jump", 0.5),
    ("jumps", 0.5),
    ("optimistic", 0.6),
    ("outperform", 0.6),
    ("positive", 0.5),
    ("profit", 0.5),
    ("profitable", 0.6),
    ("rally", 0.6),
    ("rallies", 0.6),
    ("record", 0.3),
    ("rebound", 0.4),
    ("rise", 0.3),
    ("rises", 0.3),
    ("soar", 0.7),
    ("soars", 0.7),
    ("strong", 0.43),
    ("success", 0.6),
    ("surge", 0.6),
    ("surges", 0.6),
    ("upgrade", 0.5),
    ("upgraded", 0.5),
    ("win", 0.8),
];

const NEGATIVE_WORDS: &[(&str, f64)] = &[
    ("bad", -0.7),
    ("bankruptcy", -0.9),
    ("bearish", -0.8),
    ("collapse", -0.8),
    ("concern", -0.3),
    ("concerns", -0.3),
    ("crash", -0.8),
    ("crisis", -0.7),
    ("cut", -0.3),
    ("cuts", -0.3),
    ("decline", -0.4),
    ("declines", -0.4),
    ("default", -0.6),
    ("downgrade", -0.5),
    ("downgraded", -0.5),
    ("drop", -0.4),
    ("drops", -0.4),
    ("fall", -0.4),
    ("falls", -0.4),
    ("fear", -0.6),
    ("fears", -0.6),
    ("fraud", -0.9),
    ("lawsuit", -0.5),
    ("loss", -0.5),
    ("losses", -0.5),
    ("low", -0.1),
    ("miss", -0.5),
    ("misses", -0.5),
    ("negative", -0.3),
    ("panic", -0.8),
    ("plunge", -0.7),
    ("plunges", -0.7),
    ("poor", -0.4),
    ("recession", -0.6),
    ("risk", -0.2),
    ("selloff", -0.6),
    ("slump", -0.6),
    ("tumble", -0.6),
    ("tumbles", -0.6),
    ("warning", -0.4),
    ("weak", -0.4),
    ("worst", -1.0),
];

const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.3),
    ("extremely", 1.5),
    ("highly", 1.3),
    ("sharply", 1.4),
    ("significantly", 1.3),
    ("strongly", 1.3),
    ("slightly", 0.5),
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "without", "don't", "doesn't", "isn't", "aren't", "wasn't", "weren't",
    "won't", "can't", "cannot",
];

#[derive(Debug, Clone)]
pub struct LexiconScorer {
    words: HashMap<String, f64>,
    intensifiers: HashMap<String, f64>,
    negations: Vec<String>,
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconScorer {
    pub fn new() -> Self {
        let words = POSITIVE_WORDS
            .iter()
            .chain(NEGATIVE_WORDS.iter())
            .map(|(w, v)| (w.to_string(), *v))
            .collect();
        let intensifiers = INTENSIFIERS
            .iter()
            .map(|(w, v)| (w.to_string(), *v))
            .collect();
        let negations = NEGATIONS.iter().map(|w| w.to_string()).collect();

        Self {
            words,
            intensifiers,
            negations,
        }
    }

    /// Add or override a word weight (clamped to [-1, 1])
    pub fn with_word(mut self, word: &str, weight: f64) -> Self {
        self.words
            .insert(word.to_lowercase(), weight.clamp(-1.0, 1.0));
        self
    }

    fn tokenize(text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !(c.is_alphanumeric() || c == '\''))
            .map(|t| t.trim_matches('\''))
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl PolarityScorer for LexiconScorer {
    fn polarity(&self, text: &str) -> f64 {
        let mut total = 0.0;
        let mut scored = 0usize;
        let mut negated = false;
        let mut intensity = 1.0;

        for token in Self::tokenize(text) {
            if self.negations.contains(&token) {
                negated = true;
                continue;
            }
            if let Some(&factor) = self.intensifiers.get(&token) {
                intensity = factor;
                continue;
            }

            if let Some(&weight) = self.words.get(&token) {
                let mut score = weight * intensity;
                if negated {
                    score *= NEGATION_FACTOR;
                }
                total += score;
                scored += 1;
            }
            // modifiers only reach the word right after them
            negated = false;
            intensity = 1.0;
        }

        if scored == 0 {
            return 0.0;
        }
        (total / scored as f64).clamp(-1.0, 1.0)
    }
}
