use std::path::PathBuf;

use pollsense_core::{Scope, StoreError};
use thiserror::Error;

/// Errors from a single embedding call.
#[derive(Debug, Error)]
pub enum EmbedError {
    /// The input text was empty or whitespace-only; no request was sent.
    #[error("embedding input is empty")]
    EmptyInput,

    /// HTTP 429 from the provider. The only error the retry policy acts on.
    #[error("rate limited by embedding provider: {message}")]
    RateLimited { message: String },

    #[error("embedding provider returned status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// The provider answered 2xx but the payload held no usable vector.
    #[error("invalid embedding response: {0}")]
    InvalidResponse(String),

    #[error("invalid embedding endpoint `{url}`: {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl EmbedError {
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, EmbedError::RateLimited { .. })
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SimilarityError {
    #[error("vector length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("cannot compare empty vectors")]
    Empty,

    #[error("cosine similarity is undefined for a zero-magnitude vector")]
    ZeroMagnitude,
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid analysis criteria `{0}`: expected similarity, sentiment_similarity or thematic_clustering")]
    InvalidCriteria(String),

    #[error("search query is empty")]
    EmptyQuery,

    #[error("invalid embedding returned for query: {0}")]
    InvalidEmbedding(String),

    #[error("respondent {respondent_id} not found in {scope}")]
    SeedNotFound { scope: Scope, respondent_id: i64 },

    #[error(transparent)]
    Embedding(#[from] EmbedError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Similarity(#[from] SimilarityError),
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read workbook: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("workbook {} has no worksheets", .0.display())]
    NoWorksheet(PathBuf),
}
