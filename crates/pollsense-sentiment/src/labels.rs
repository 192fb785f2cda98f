//! Display policy for sentiment scores: percentage and Good/Average/Poor.

use serde::Serialize;

/// Lower end of the conventional score range.
pub const MIN_SCORE: f64 = -5.0;
/// Upper end of the conventional score range.
pub const MAX_SCORE: f64 = 5.0;

/// Map a score linearly from `[-5, 5]` onto `[0, 100]`.
///
/// The input is not clamped: a score of `7.5` maps to `125.0`.
#[must_use]
pub fn to_percentage(score: f64) -> f64 {
    (score - MIN_SCORE) / (MAX_SCORE - MIN_SCORE) * 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SentimentLabel {
    Good,
    Average,
    Poor,
}

impl SentimentLabel {
    /// `> 1` is Good, `[-1, 1]` is Average, anything else (including NaN) is Poor.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score > 1.0 {
            SentimentLabel::Good
        } else if (-1.0..=1.0).contains(&score) {
            SentimentLabel::Average
        } else {
            SentimentLabel::Poor
        }
    }

    #[must_use]
    pub fn text(self) -> &'static str {
        match self {
            SentimentLabel::Good => "Good",
            SentimentLabel::Average => "Average",
            SentimentLabel::Poor => "Poor",
        }
    }

    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            SentimentLabel::Good => "rgba(43, 182, 76, 1)",
            SentimentLabel::Average => "rgba(233, 194, 68, 1)",
            SentimentLabel::Poor => "rgba(233, 70, 68, 1)",
        }
    }

    #[must_use]
    pub fn badge(self) -> SentimentBadge {
        SentimentBadge {
            color: self.color(),
            text: self.text(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SentimentBadge {
    pub color: &'static str,
    pub text: &'static str,
}

/// A result row with its sentiment colour and text attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Labeled<T> {
    #[serde(flatten)]
    pub row: T,
    pub sentiment_color: &'static str,
    pub sentiment_text: &'static str,
}

impl<T> Labeled<T> {
    #[must_use]
    pub fn new(row: T, score: f64) -> Self {
        let label = SentimentLabel::from_score(score);
        Self {
            row,
            sentiment_color: label.color(),
            sentiment_text: label.text(),
        }
    }
}
