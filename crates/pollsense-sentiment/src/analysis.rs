//! Read-side analysis over stored responses and documents.
//!
//! Survey operations are bounded by a [`Scope`] and delegate ranking to the
//! store's cosine-distance operator. Semantic search over documents ranks
//! in-process over a capped candidate set.

use pollsense_core::{
    validate_limit, AppConfig, DocumentStore, DocumentSummary, DocumentTable, RankQuery,
    RankedResponse, RespondentScore, ResponseOrder, ResponseStore, Scope, SeedResponse,
};
use serde::Serialize;
use serde_json::Value;

use crate::embeddings::Embedder;
use crate::error::AnalysisError;
use crate::labels::{to_percentage, Labeled, SentimentBadge, SentimentLabel};
use crate::ranking::Criteria;
use crate::similarity::{decode_stored_vector, rank_by_similarity};

/// Result caps applied when the caller does not pass one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisLimits {
    /// Cap for clustering and criteria-driven rankings.
    pub cluster_limit: i64,
    /// Cap for the per-respondent score list.
    pub score_limit: i64,
    /// Documents pulled for one in-process semantic search.
    pub search_candidates: i64,
    pub search_top_n: usize,
    pub document_list_limit: i64,
}

impl Default for AnalysisLimits {
    fn default() -> Self {
        Self {
            cluster_limit: 5000,
            score_limit: 5000,
            search_candidates: 1000,
            search_top_n: 10,
            document_list_limit: 100,
        }
    }
}

impl AnalysisLimits {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            cluster_limit: config.analysis_limit,
            score_limit: config.analysis_limit,
            search_candidates: config.search_candidate_limit,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ClusterOutcome {
    /// The scope holds no responses.
    NoData,
    Clustered {
        seed_respondent_id: i64,
        seed_text: String,
        clusters: Vec<RankedResponse>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarResponses {
    pub selected_response: String,
    pub clusters: Vec<RankedResponse>,
}

/// Input to [`Analyzer::analyze_responses`]. `criteria` stays a string here
/// so that parsing failures surface as [`AnalysisError::InvalidCriteria`].
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub scope: Scope,
    pub respondent_id: i64,
    pub criteria: String,
    pub search_text: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseAnalysis {
    pub analysis_type: Criteria,
    pub selected_response: String,
    pub clusters: Vec<Labeled<RankedResponse>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OverallSentiment {
    NoData,
    Summary {
        overall_sentiment: f64,
        total_responses: i64,
        /// `to_percentage(overall_sentiment)` rounded to 2 decimals.
        sentiment_percentage: f64,
        sentiment: SentimentBadge,
        dataset: Vec<RespondentScore>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub id: i64,
    pub content: String,
    pub sentiment_score: f64,
    pub row_data: Value,
    /// Cosine similarity to the query, rounded to 4 decimals.
    pub similarity: f64,
}

pub struct Analyzer<S, E> {
    store: S,
    embedder: E,
    limits: AnalysisLimits,
}

impl<S, E> Analyzer<S, E> {
    #[must_use]
    pub fn new(store: S, embedder: E, limits: AnalysisLimits) -> Self {
        Self {
            store,
            embedder,
            limits,
        }
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn limits(&self) -> &AnalysisLimits {
        &self.limits
    }
}

impl<S: ResponseStore, E: Embedder> Analyzer<S, E> {
    /// Pick a random response in `scope` and rank the whole scope (seed
    /// included) by distance to it.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn cluster_similar(&self, scope: Scope) -> Result<ClusterOutcome, AnalysisError> {
        let limit = validate_limit(self.limits.cluster_limit)?;
        let Some(seed) = self.store.random_seed(scope).await? else {
            tracing::debug!(%scope, "no responses to cluster");
            return Ok(ClusterOutcome::NoData);
        };

        let clusters = self
            .store
            .rank_responses(&RankQuery {
                scope,
                anchor: seed.response_vector,
                exclude_respondent: None,
                order: ResponseOrder::Distance,
                limit,
            })
            .await?;

        Ok(ClusterOutcome::Clustered {
            seed_respondent_id: seed.respondent_id,
            seed_text: seed.response_text,
            clusters,
        })
    }

    /// Rank the other responses in `scope` by distance to `respondent_id`'s.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::SeedNotFound`] for an unknown respondent and
    /// propagates store failures.
    pub async fn search_similar(
        &self,
        scope: Scope,
        respondent_id: i64,
        limit: Option<i64>,
    ) -> Result<SimilarResponses, AnalysisError> {
        let limit = validate_limit(limit.unwrap_or(self.limits.cluster_limit))?;
        let seed = self.require_seed(scope, respondent_id).await?;

        let clusters = self
            .store
            .rank_responses(&RankQuery {
                scope,
                anchor: seed.response_vector,
                exclude_respondent: Some(respondent_id),
                order: ResponseOrder::Distance,
                limit,
            })
            .await?;

        Ok(SimilarResponses {
            selected_response: seed.response_text,
            clusters,
        })
    }

    /// Criteria-driven ranking around a chosen respondent.
    ///
    /// Criteria are parsed before anything else; an unknown value fails
    /// without touching the store. For `thematic_clustering` a non-blank
    /// `search_text` replaces the seed vector with its own embedding.
    ///
    /// # Errors
    ///
    /// [`AnalysisError::InvalidCriteria`], [`AnalysisError::SeedNotFound`],
    /// embedding failures when re-seeding, and store failures.
    pub async fn analyze_responses(
        &self,
        request: &AnalysisRequest,
    ) -> Result<ResponseAnalysis, AnalysisError> {
        let criteria: Criteria = request.criteria.parse()?;
        let limit = validate_limit(request.limit.unwrap_or(self.limits.cluster_limit))?;
        let search = request
            .search_text
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let seed = self
            .require_seed(request.scope, request.respondent_id)
            .await?;
        let plan = criteria.plan(seed.sentiment_score, search.is_some());
        tracing::debug!(
            scope = %request.scope,
            criteria = %criteria,
            ?plan,
            "analyzing responses"
        );

        let anchor = match search {
            Some(text) if plan.reseed => self.embedder.embed(text).await?,
            _ => seed.response_vector,
        };

        let rows = self
            .store
            .rank_responses(&RankQuery {
                scope: request.scope,
                anchor,
                exclude_respondent: plan.exclude_seed.then_some(request.respondent_id),
                order: plan.order,
                limit,
            })
            .await?;

        let clusters = rows
            .into_iter()
            .map(|row| {
                let score = row.sentiment_score;
                Labeled::new(row, score)
            })
            .collect();

        Ok(ResponseAnalysis {
            analysis_type: criteria,
            selected_response: seed.response_text,
            clusters,
        })
    }

    /// Mean sentiment over `scope`, with its percentage, label and the
    /// per-respondent score list.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn analyze_overall_sentiment(
        &self,
        scope: Scope,
    ) -> Result<OverallSentiment, AnalysisError> {
        let totals = self.store.sentiment_totals(scope).await?;
        let mean = match totals.mean {
            Some(mean) if totals.count > 0 => mean,
            _ => return Ok(OverallSentiment::NoData),
        };

        let dataset = self.respondent_scores(scope, None).await?;
        Ok(OverallSentiment::Summary {
            overall_sentiment: mean,
            total_responses: totals.count,
            sentiment_percentage: round_to(to_percentage(mean), 2),
            sentiment: SentimentLabel::from_score(mean).badge(),
            dataset,
        })
    }

    /// `(respondent_id, sentiment_score)` for every response in `scope`, up
    /// to `limit`. An empty scope yields an empty list.
    ///
    /// # Errors
    ///
    /// [`pollsense_core::StoreError::InvalidLimit`] for a non-positive limit,
    /// and store failures.
    pub async fn respondent_scores(
        &self,
        scope: Scope,
        limit: Option<i64>,
    ) -> Result<Vec<RespondentScore>, AnalysisError> {
        let limit = validate_limit(limit.unwrap_or(self.limits.score_limit))?;
        Ok(self.store.respondent_scores(scope, limit).await?)
    }

    async fn require_seed(
        &self,
        scope: Scope,
        respondent_id: i64,
    ) -> Result<SeedResponse, AnalysisError> {
        self.store
            .find_seed(scope, respondent_id)
            .await?
            .ok_or(AnalysisError::SeedNotFound {
                scope,
                respondent_id,
            })
    }
}

impl<S: DocumentStore, E: Embedder> Analyzer<S, E> {
    /// Embed `query` and return the `top_n` most similar documents in
    /// `table`.
    ///
    /// Only the first `search_candidates` documents are scanned. Candidates
    /// whose stored vector cannot be decoded are skipped with a warning.
    ///
    /// # Errors
    ///
    /// [`AnalysisError::EmptyQuery`] for blank input,
    /// [`AnalysisError::InvalidEmbedding`] when the provider returns an empty
    /// vector (checked before the store is read), and
    /// [`AnalysisError::Similarity`] when a candidate has a different
    /// dimensionality or zero magnitude.
    pub async fn semantic_search(
        &self,
        table: &DocumentTable,
        query: &str,
        top_n: Option<usize>,
    ) -> Result<Vec<Labeled<SearchHit>>, AnalysisError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AnalysisError::EmptyQuery);
        }
        let top_n = top_n.unwrap_or(self.limits.search_top_n);
        let candidate_limit = validate_limit(self.limits.search_candidates)?;

        let query_vector = self.embedder.embed(query).await?;
        if query_vector.is_empty() {
            return Err(AnalysisError::InvalidEmbedding(
                "query embedding is empty".to_string(),
            ));
        }

        let documents = self
            .store
            .candidate_documents(table, candidate_limit)
            .await?;
        let scanned = documents.len();

        let candidates = documents.into_iter().filter_map(|doc| {
            match decode_stored_vector(&doc.embedding_vector) {
                Ok(vector) => Some((doc, vector)),
                Err(reason) => {
                    tracing::warn!(
                        table = %table,
                        id = doc.id,
                        %reason,
                        "skipping document with unreadable embedding"
                    );
                    None
                }
            }
        });
        let ranked = rank_by_similarity(&query_vector, candidates, top_n)?;
        tracing::debug!(table = %table, scanned, returned = ranked.len(), "semantic search");

        Ok(ranked
            .into_iter()
            .map(|scored| {
                let doc = scored.item;
                let score = doc.sentiment_score;
                Labeled::new(
                    SearchHit {
                        id: doc.id,
                        content: doc.content,
                        sentiment_score: doc.sentiment_score,
                        row_data: doc.row_data,
                        similarity: round_to(scored.similarity, 4),
                    },
                    score,
                )
            })
            .collect())
    }

    /// Newest documents first, vectors omitted.
    ///
    /// # Errors
    ///
    /// Non-positive limits and store failures.
    pub async fn list_documents(
        &self,
        table: &DocumentTable,
        limit: Option<i64>,
    ) -> Result<Vec<Labeled<DocumentSummary>>, AnalysisError> {
        let limit = validate_limit(limit.unwrap_or(self.limits.document_list_limit))?;
        let documents = self.store.recent_documents(table, limit).await?;
        Ok(documents
            .into_iter()
            .map(|doc| {
                let score = doc.sentiment_score;
                Labeled::new(doc, score)
            })
            .collect())
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
