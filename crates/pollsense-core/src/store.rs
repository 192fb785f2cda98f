//! Store capability consumed by the ingestion pipeline and analysis layer.
//!
//! The core never talks to a database driver directly. It depends on the two
//! traits below, which `pollsense-db` implements over a Postgres pool and
//! tests implement in memory.

use std::cmp::Ordering;
use std::sync::LazyLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Destination used when the caller does not name one.
pub const DEFAULT_DOCUMENT_TABLE: &str = "document_embeddings";

static TABLE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,62}$").expect("static regex is valid"));

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid table name `{0}`: expected [A-Za-z_][A-Za-z0-9_]*, at most 63 characters")]
    InvalidTableName(String),

    #[error("invalid limit {0}: must be positive")]
    InvalidLimit(i64),

    #[error("store query failed ({context}): {source}")]
    Backend {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("malformed {column} in {context}: {reason}")]
    Decode {
        context: String,
        column: &'static str,
        reason: String,
    },
}

impl StoreError {
    /// Wrap a driver error with the name of the operation that produced it.
    pub fn backend<E>(context: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend {
            context: context.into(),
            source: Box::new(source),
        }
    }
}

/// Reject non-positive result caps before they reach a query.
///
/// # Errors
///
/// Returns [`StoreError::InvalidLimit`] when `limit <= 0`.
pub fn validate_limit(limit: i64) -> Result<i64, StoreError> {
    if limit > 0 {
        Ok(limit)
    } else {
        Err(StoreError::InvalidLimit(limit))
    }
}

// ---------------------------------------------------------------------------
// Survey responses
// ---------------------------------------------------------------------------

/// The (event, poll) pair bounding which responses a query considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scope {
    pub event_id: i64,
    pub poll_id: i64,
}

impl Scope {
    #[must_use]
    pub fn new(event_id: i64, poll_id: i64) -> Self {
        Self { event_id, poll_id }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "event {} / poll {}", self.event_id, self.poll_id)
    }
}

/// A response chosen to anchor a similarity ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedResponse {
    pub respondent_id: i64,
    pub response_text: String,
    pub response_vector: Vec<f32>,
    pub sentiment_score: f64,
}

/// One response row with its cosine distance to the ranking anchor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResponse {
    pub respondent_id: i64,
    pub response_text: String,
    pub sentiment_score: f64,
    /// Cosine distance (`1 - similarity`); lower is closer.
    pub distance: f64,
}

/// Row ordering for a ranking query.
///
/// The store expresses this as its `ORDER BY`; [`ResponseOrder::compare`] is
/// the same ordering for in-process use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseOrder {
    /// Distance ascending.
    Distance,
    /// Sentiment score first (direction chosen by `descending`), then
    /// distance ascending among equal scores.
    SentimentThenDistance { descending: bool },
}

impl ResponseOrder {
    #[must_use]
    pub fn compare(self, a: &RankedResponse, b: &RankedResponse) -> Ordering {
        let by_distance = a.distance.total_cmp(&b.distance);
        match self {
            ResponseOrder::Distance => by_distance,
            ResponseOrder::SentimentThenDistance { descending } => {
                let by_sentiment = if descending {
                    b.sentiment_score.total_cmp(&a.sentiment_score)
                } else {
                    a.sentiment_score.total_cmp(&b.sentiment_score)
                };
                by_sentiment.then(by_distance)
            }
        }
    }
}

/// A delegated ranking request: order in-scope responses against `anchor`.
#[derive(Debug, Clone, PartialEq)]
pub struct RankQuery {
    pub scope: Scope,
    pub anchor: Vec<f32>,
    pub exclude_respondent: Option<i64>,
    pub order: ResponseOrder,
    pub limit: i64,
}

/// Mean sentiment and response count over a scope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentTotals {
    /// `None` when the scope has no responses.
    pub mean: Option<f64>,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RespondentScore {
    pub respondent_id: i64,
    pub sentiment_score: f64,
}

#[async_trait]
pub trait ResponseStore: Send + Sync {
    /// Pick one response from the scope uniformly at random.
    async fn random_seed(&self, scope: Scope) -> Result<Option<SeedResponse>, StoreError>;

    /// Look up one respondent's response within the scope.
    async fn find_seed(
        &self,
        scope: Scope,
        respondent_id: i64,
    ) -> Result<Option<SeedResponse>, StoreError>;

    /// Rank responses by the store's native cosine-distance operator.
    async fn rank_responses(&self, query: &RankQuery) -> Result<Vec<RankedResponse>, StoreError>;

    async fn sentiment_totals(&self, scope: Scope) -> Result<SentimentTotals, StoreError>;

    async fn respondent_scores(
        &self,
        scope: Scope,
        limit: i64,
    ) -> Result<Vec<RespondentScore>, StoreError>;
}

// ---------------------------------------------------------------------------
// Generic documents
// ---------------------------------------------------------------------------

/// A validated table identifier. Table names are interpolated into SQL, so
/// only plain identifiers are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentTable(String);

impl DocumentTable {
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidTableName`] unless `name` is a plain SQL
    /// identifier of at most 63 characters.
    pub fn new(name: &str) -> Result<Self, StoreError> {
        if TABLE_NAME.is_match(name) {
            Ok(Self(name.to_string()))
        } else {
            Err(StoreError::InvalidTableName(name.to_string()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DocumentTable {
    fn default() -> Self {
        Self(DEFAULT_DOCUMENT_TABLE.to_string())
    }
}

impl std::fmt::Display for DocumentTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewDocument {
    pub content: String,
    pub embedding: Vec<f32>,
    pub sentiment_score: f64,
    pub row_data: Value,
}

/// A document as read back for an in-process similarity scan.
///
/// `embedding_vector` is left undecoded: stored vectors that fail to parse
/// are skipped by the scan rather than failing the read.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: i64,
    pub content: String,
    pub embedding_vector: Value,
    pub sentiment_score: f64,
    pub row_data: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentSummary {
    pub id: i64,
    pub content: String,
    pub sentiment_score: f64,
    pub row_data: Value,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Persist one document and return its store-assigned id.
    async fn insert_document(
        &self,
        table: &DocumentTable,
        document: &NewDocument,
    ) -> Result<i64, StoreError>;

    /// Pull up to `limit` documents, vectors included, in store order.
    async fn candidate_documents(
        &self,
        table: &DocumentTable,
        limit: i64,
    ) -> Result<Vec<StoredDocument>, StoreError>;

    /// Newest documents first, without vectors.
    async fn recent_documents(
        &self,
        table: &DocumentTable,
        limit: i64,
    ) -> Result<Vec<DocumentSummary>, StoreError>;
}
