//! Lexicon-based sentiment scorer for survey answers and document rows.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::labels::SentimentLabel;
use crate::lexicon::{AFINN, NEGATORS};

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{L}\p{N}'\-]+").expect("static regex is valid"));

/// Result of scoring one text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentResult {
    /// Sum of matched word weights. Conventionally within `[-5, 5]` for short
    /// answers but unbounded for long texts.
    pub score: f64,
    /// `score` divided by the token count; `0.0` for text without tokens.
    pub comparative: f64,
    pub label: SentimentLabel,
    pub token_count: usize,
    pub positive: Vec<String>,
    pub negative: Vec<String>,
}

/// Deterministic, local scorer. Cheap to construct; holds borrowed lookup
/// tables only.
#[derive(Debug, Clone)]
pub struct SentimentAnalyzer {
    weights: &'static HashMap<&'static str, i8>,
    negators: &'static HashSet<&'static str>,
}

static WEIGHTS: LazyLock<HashMap<&'static str, i8>> =
    LazyLock::new(|| AFINN.iter().copied().collect());

static NEGATOR_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| NEGATORS.iter().copied().collect());

impl Default for SentimentAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentAnalyzer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            weights: &WEIGHTS,
            negators: &NEGATOR_SET,
        }
    }

    /// Score `text`.
    ///
    /// Tokens are lowercased runs of letters, digits, apostrophes and hyphens.
    /// A matched weight is negated when the preceding token is a negator
    /// ("not good" scores -3).
    #[must_use]
    pub fn analyze(&self, text: &str) -> SentimentResult {
        let lowered = text.to_lowercase();
        let tokens: Vec<&str> = TOKEN.find_iter(&lowered).map(|m| m.as_str()).collect();

        let mut score = 0i64;
        let mut positive = Vec::new();
        let mut negative = Vec::new();

        for (i, token) in tokens.iter().enumerate() {
            let Some(&weight) = self.weights.get(token) else {
                continue;
            };
            let negated = i > 0 && self.negators.contains(tokens[i - 1]);
            let weight = if negated {
                -i64::from(weight)
            } else {
                i64::from(weight)
            };
            if weight > 0 {
                positive.push((*token).to_string());
            } else if weight < 0 {
                negative.push((*token).to_string());
            }
            score += weight;
        }

        #[allow(clippy::cast_precision_loss)]
        let score = score as f64;
        #[allow(clippy::cast_precision_loss)]
        let comparative = if tokens.is_empty() {
            0.0
        } else {
            score / tokens.len() as f64
        };

        SentimentResult {
            score,
            comparative,
            label: SentimentLabel::from_score(score),
            token_count: tokens.len(),
            positive,
            negative,
        }
    }
}
