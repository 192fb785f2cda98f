//! Database operations for the `text_survey_responses` table.
//!
//! Vectors cross the wire in pgvector's text form: anchors are bound as text
//! and cast with `::text::vector`, stored vectors are selected as `::text`.

use pollsense_core::{
    RankQuery, RankedResponse, RespondentScore, ResponseOrder, Scope, SeedResponse,
};
use sqlx::PgPool;

use crate::{parse_pg_vector, vector_to_pg, DbError};

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SeedRow {
    pub respondent_id: i64,
    pub response_text: String,
    pub vector_text: String,
    pub sentiment_score: f64,
}

impl SeedRow {
    /// # Errors
    ///
    /// Returns [`DbError::MalformedVector`] if the stored vector text does not
    /// parse.
    pub fn into_seed(self) -> Result<SeedResponse, DbError> {
        let response_vector =
            parse_pg_vector(&self.vector_text).map_err(|reason| DbError::MalformedVector {
                context: format!("respondent {}", self.respondent_id),
                reason,
            })?;
        Ok(SeedResponse {
            respondent_id: self.respondent_id,
            response_text: self.response_text,
            response_vector,
            sentiment_score: self.sentiment_score,
        })
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RankedRow {
    pub respondent_id: i64,
    pub response_text: String,
    pub sentiment_score: f64,
    pub distance: f64,
}

impl From<RankedRow> for RankedResponse {
    fn from(row: RankedRow) -> Self {
        Self {
            respondent_id: row.respondent_id,
            response_text: row.response_text,
            sentiment_score: row.sentiment_score,
            distance: row.distance,
        }
    }
}

// ---------------------------------------------------------------------------
// SQL builders
// ---------------------------------------------------------------------------

/// `ORDER BY` body matching [`ResponseOrder::compare`].
#[must_use]
pub fn order_by_clause(order: ResponseOrder) -> &'static str {
    match order {
        ResponseOrder::Distance => "distance ASC",
        ResponseOrder::SentimentThenDistance { descending: true } => {
            "sentiment_score DESC, distance ASC"
        }
        ResponseOrder::SentimentThenDistance { descending: false } => {
            "sentiment_score ASC, distance ASC"
        }
    }
}

fn rank_sql(order: ResponseOrder) -> String {
    format!(
        "SELECT respondent_id, response_text, sentiment_score, \
                (response_vector <=> $3::text::vector)::float8 AS distance \
         FROM text_survey_responses \
         WHERE event_id = $1 AND poll_id = $2 \
           AND ($4::bigint IS NULL OR respondent_id <> $4) \
         ORDER BY {} \
         LIMIT $5",
        order_by_clause(order)
    )
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Pick one response from the scope at random.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn random_seed(pool: &PgPool, scope: Scope) -> Result<Option<SeedRow>, DbError> {
    let row = sqlx::query_as::<_, SeedRow>(
        "SELECT respondent_id, response_text, response_vector::text AS vector_text, \
                sentiment_score \
         FROM text_survey_responses \
         WHERE event_id = $1 AND poll_id = $2 \
         ORDER BY random() \
         LIMIT 1",
    )
    .bind(scope.event_id)
    .bind(scope.poll_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Look up one respondent's response in the scope.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_seed(
    pool: &PgPool,
    scope: Scope,
    respondent_id: i64,
) -> Result<Option<SeedRow>, DbError> {
    let row = sqlx::query_as::<_, SeedRow>(
        "SELECT respondent_id, response_text, response_vector::text AS vector_text, \
                sentiment_score \
         FROM text_survey_responses \
         WHERE event_id = $1 AND poll_id = $2 AND respondent_id = $3",
    )
    .bind(scope.event_id)
    .bind(scope.poll_id)
    .bind(respondent_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Rank in-scope responses by cosine distance to `query.anchor`.
///
/// `query.limit` must already be validated as positive.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails (including a dimension
/// mismatch between the anchor and stored vectors).
pub async fn rank_responses(pool: &PgPool, query: &RankQuery) -> Result<Vec<RankedRow>, DbError> {
    let sql = rank_sql(query.order);
    tracing::debug!(
        scope = %query.scope,
        order = order_by_clause(query.order),
        limit = query.limit,
        "ranking responses"
    );

    let rows = sqlx::query_as::<_, RankedRow>(&sql)
        .bind(query.scope.event_id)
        .bind(query.scope.poll_id)
        .bind(vector_to_pg(&query.anchor))
        .bind(query.exclude_respondent)
        .bind(query.limit)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Mean sentiment and row count over the scope. The mean is `None` for an
/// empty scope.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn sentiment_totals(pool: &PgPool, scope: Scope) -> Result<(Option<f64>, i64), DbError> {
    let totals: (Option<f64>, i64) = sqlx::query_as(
        "SELECT AVG(sentiment_score)::float8, COUNT(*) \
         FROM text_survey_responses \
         WHERE event_id = $1 AND poll_id = $2",
    )
    .bind(scope.event_id)
    .bind(scope.poll_id)
    .fetch_one(pool)
    .await?;

    Ok(totals)
}

/// Per-respondent scores for the scope, ordered by respondent id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn respondent_scores(
    pool: &PgPool,
    scope: Scope,
    limit: i64,
) -> Result<Vec<RespondentScore>, DbError> {
    let rows: Vec<(i64, f64)> = sqlx::query_as(
        "SELECT respondent_id, sentiment_score \
         FROM text_survey_responses \
         WHERE event_id = $1 AND poll_id = $2 \
         ORDER BY respondent_id \
         LIMIT $3",
    )
    .bind(scope.event_id)
    .bind(scope.poll_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(respondent_id, sentiment_score)| RespondentScore {
            respondent_id,
            sentiment_score,
        })
        .collect())
}
