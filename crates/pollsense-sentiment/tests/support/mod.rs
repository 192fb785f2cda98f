//! In-memory store and scripted embedder shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use pollsense_core::{
    DocumentStore, DocumentSummary, DocumentTable, NewDocument, RankQuery, RankedResponse,
    RespondentScore, ResponseStore, Scope, SeedResponse, SentimentTotals, StoreError,
    StoredDocument,
};
use pollsense_sentiment::{cosine_distance, EmbedError, Embedder};
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct Response {
    pub scope: Scope,
    pub respondent_id: i64,
    pub text: String,
    pub vector: Vec<f32>,
    pub score: f64,
}

#[derive(Default)]
pub struct MemoryStore {
    pub responses: Vec<Response>,
    pub documents: Mutex<Vec<(String, StoredDocument)>>,
    /// Number of store calls of any kind.
    pub calls: AtomicUsize,
    /// Fail inserts whose content contains this marker.
    pub fail_insert_marker: Option<String>,
}

impl MemoryStore {
    pub fn with_responses(responses: Vec<Response>) -> Self {
        Self {
            responses,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn documents_in(&self, table: &str) -> Vec<StoredDocument> {
        self.documents
            .lock()
            .unwrap()
            .iter()
            .filter(|(t, _)| t == table)
            .map(|(_, d)| d.clone())
            .collect()
    }

    /// Seed a stored document directly, bypassing ingestion.
    pub fn push_document(&self, table: &str, content: &str, vector: Value, score: f64) -> i64 {
        let mut docs = self.documents.lock().unwrap();
        let id = i64::try_from(docs.len()).unwrap() + 1;
        docs.push((
            table.to_string(),
            StoredDocument {
                id,
                content: content.to_string(),
                embedding_vector: vector,
                sentiment_score: score,
                row_data: serde_json::json!({ "text": content }),
                created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
                    + Duration::minutes(id),
            },
        ));
        id
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn in_scope(&self, scope: Scope) -> impl Iterator<Item = &Response> {
        self.responses.iter().filter(move |r| r.scope == scope)
    }
}

fn seed(r: &Response) -> SeedResponse {
    SeedResponse {
        respondent_id: r.respondent_id,
        response_text: r.text.clone(),
        response_vector: r.vector.clone(),
        sentiment_score: r.score,
    }
}

#[async_trait]
impl ResponseStore for MemoryStore {
    async fn random_seed(&self, scope: Scope) -> Result<Option<SeedResponse>, StoreError> {
        self.touch();
        Ok(self.in_scope(scope).next().map(seed))
    }

    async fn find_seed(
        &self,
        scope: Scope,
        respondent_id: i64,
    ) -> Result<Option<SeedResponse>, StoreError> {
        self.touch();
        Ok(self
            .in_scope(scope)
            .find(|r| r.respondent_id == respondent_id)
            .map(seed))
    }

    async fn rank_responses(&self, query: &RankQuery) -> Result<Vec<RankedResponse>, StoreError> {
        self.touch();
        let mut rows = self
            .in_scope(query.scope)
            .filter(|r| Some(r.respondent_id) != query.exclude_respondent)
            .map(|r| RankedResponse {
                respondent_id: r.respondent_id,
                response_text: r.text.clone(),
                sentiment_score: r.score,
                distance: cosine_distance(&query.anchor, &r.vector).unwrap(),
            })
            .collect::<Vec<_>>();
        rows.sort_by(|a, b| query.order.compare(a, b));
        rows.truncate(usize::try_from(query.limit).unwrap());
        Ok(rows)
    }

    async fn sentiment_totals(&self, scope: Scope) -> Result<SentimentTotals, StoreError> {
        self.touch();
        let scores: Vec<f64> = self.in_scope(scope).map(|r| r.score).collect();
        let count = i64::try_from(scores.len()).unwrap();
        #[allow(clippy::cast_precision_loss)]
        let mean = (!scores.is_empty()).then(|| scores.iter().sum::<f64>() / scores.len() as f64);
        Ok(SentimentTotals { mean, count })
    }

    async fn respondent_scores(
        &self,
        scope: Scope,
        limit: i64,
    ) -> Result<Vec<RespondentScore>, StoreError> {
        self.touch();
        Ok(self
            .in_scope(scope)
            .take(usize::try_from(limit).unwrap())
            .map(|r| RespondentScore {
                respondent_id: r.respondent_id,
                sentiment_score: r.score,
            })
            .collect())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_document(
        &self,
        table: &DocumentTable,
        document: &NewDocument,
    ) -> Result<i64, StoreError> {
        self.touch();
        if let Some(marker) = &self.fail_insert_marker {
            if document.content.contains(marker.as_str()) {
                return Err(StoreError::backend(
                    "insert_document",
                    std::io::Error::other("disk full"),
                ));
            }
        }
        let vector = serde_json::to_value(&document.embedding).unwrap();
        let mut docs = self.documents.lock().unwrap();
        let id = i64::try_from(docs.len()).unwrap() + 1;
        docs.push((
            table.as_str().to_string(),
            StoredDocument {
                id,
                content: document.content.clone(),
                embedding_vector: vector,
                sentiment_score: document.sentiment_score,
                row_data: document.row_data.clone(),
                created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
                    + Duration::minutes(id),
            },
        ));
        Ok(id)
    }

    async fn candidate_documents(
        &self,
        table: &DocumentTable,
        limit: i64,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        self.touch();
        let mut docs = self.documents_in(table.as_str());
        docs.truncate(usize::try_from(limit).unwrap());
        Ok(docs)
    }

    async fn recent_documents(
        &self,
        table: &DocumentTable,
        limit: i64,
    ) -> Result<Vec<DocumentSummary>, StoreError> {
        self.touch();
        let mut docs = self.documents_in(table.as_str());
        docs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        docs.truncate(usize::try_from(limit).unwrap());
        Ok(docs
            .into_iter()
            .map(|d| DocumentSummary {
                id: d.id,
                content: d.content,
                sentiment_score: d.sentiment_score,
                row_data: d.row_data,
                created_at: d.created_at,
            })
            .collect())
    }
}

/// Embedder answering from a fixed table. Unknown text gets `default`;
/// texts containing `RATE_LIMIT` or `BAD_REQUEST` fail accordingly.
pub struct ScriptedEmbedder {
    pub vectors: HashMap<String, Vec<f32>>,
    pub default: Vec<f32>,
    pub calls: AtomicUsize,
}

impl ScriptedEmbedder {
    pub fn new(default: Vec<f32>) -> Self {
        Self {
            vectors: HashMap::new(),
            default,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.to_string(), vector);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for ScriptedEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if text.contains("RATE_LIMIT") {
            return Err(EmbedError::RateLimited {
                message: "quota exceeded".to_string(),
            });
        }
        if text.contains("BAD_REQUEST") {
            return Err(EmbedError::UnexpectedStatus {
                status: 400,
                body: "bad input".to_string(),
            });
        }
        Ok(self
            .vectors
            .get(text)
            .cloned()
            .unwrap_or_else(|| self.default.clone()))
    }
}

pub fn response(
    scope: Scope,
    respondent_id: i64,
    text: &str,
    vector: Vec<f32>,
    score: f64,
) -> Response {
    Response {
        scope,
        respondent_id,
        text: text.to_string(),
        vector,
        score,
    }
}
