//! [`PgStore`]: the Postgres implementation of the core store traits.

use async_trait::async_trait;
use pollsense_core::{
    DocumentStore, DocumentSummary, DocumentTable, NewDocument, RankQuery, RankedResponse,
    RespondentScore, ResponseStore, Scope, SeedResponse, SentimentTotals, StoreError,
    StoredDocument,
};
use sqlx::PgPool;

use crate::{documents, responses, DbError};

/// Long-lived handle over a connection pool. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn store_error(context: &str, err: DbError) -> StoreError {
    match err {
        DbError::MalformedVector { context: row, reason } => StoreError::Decode {
            context: format!("{context} ({row})"),
            column: "response_vector",
            reason,
        },
        other => StoreError::backend(context, other),
    }
}

#[async_trait]
impl ResponseStore for PgStore {
    async fn random_seed(&self, scope: Scope) -> Result<Option<SeedResponse>, StoreError> {
        let row = responses::random_seed(&self.pool, scope)
            .await
            .map_err(|e| store_error("random_seed", e))?;
        row.map(responses::SeedRow::into_seed)
            .transpose()
            .map_err(|e| store_error("random_seed", e))
    }

    async fn find_seed(
        &self,
        scope: Scope,
        respondent_id: i64,
    ) -> Result<Option<SeedResponse>, StoreError> {
        let row = responses::find_seed(&self.pool, scope, respondent_id)
            .await
            .map_err(|e| store_error("find_seed", e))?;
        row.map(responses::SeedRow::into_seed)
            .transpose()
            .map_err(|e| store_error("find_seed", e))
    }

    async fn rank_responses(&self, query: &RankQuery) -> Result<Vec<RankedResponse>, StoreError> {
        let rows = responses::rank_responses(&self.pool, query)
            .await
            .map_err(|e| store_error("rank_responses", e))?;
        Ok(rows.into_iter().map(RankedResponse::from).collect())
    }

    async fn sentiment_totals(&self, scope: Scope) -> Result<SentimentTotals, StoreError> {
        let (mean, count) = responses::sentiment_totals(&self.pool, scope)
            .await
            .map_err(|e| store_error("sentiment_totals", e))?;
        Ok(SentimentTotals { mean, count })
    }

    async fn respondent_scores(
        &self,
        scope: Scope,
        limit: i64,
    ) -> Result<Vec<RespondentScore>, StoreError> {
        responses::respondent_scores(&self.pool, scope, limit)
            .await
            .map_err(|e| store_error("respondent_scores", e))
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn insert_document(
        &self,
        table: &DocumentTable,
        document: &NewDocument,
    ) -> Result<i64, StoreError> {
        documents::insert_document(&self.pool, table, document)
            .await
            .map_err(|e| store_error("insert_document", e))
    }

    async fn candidate_documents(
        &self,
        table: &DocumentTable,
        limit: i64,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        let rows = documents::candidate_documents(&self.pool, table, limit)
            .await
            .map_err(|e| store_error("candidate_documents", e))?;
        Ok(rows.into_iter().map(StoredDocument::from).collect())
    }

    async fn recent_documents(
        &self,
        table: &DocumentTable,
        limit: i64,
    ) -> Result<Vec<DocumentSummary>, StoreError> {
        let rows = documents::recent_documents(&self.pool, table, limit)
            .await
            .map_err(|e| store_error("recent_documents", e))?;
        Ok(rows.into_iter().map(DocumentSummary::from).collect())
    }
}
