//! Database operations for document tables (`document_embeddings` by default).
//!
//! Table names cannot be bound as parameters, so every query here takes a
//! [`DocumentTable`], which only admits plain identifiers.

use chrono::{DateTime, Utc};
use pollsense_core::{DocumentSummary, DocumentTable, NewDocument, StoredDocument};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::PgPool;

use crate::{vector_to_pg, DbError};

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DocumentRow {
    pub id: i64,
    pub content: String,
    pub embedding_vector: Option<Value>,
    pub sentiment_score: Decimal,
    pub row_data: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl From<DocumentRow> for StoredDocument {
    fn from(row: DocumentRow) -> Self {
        Self {
            id: row.id,
            content: row.content,
            embedding_vector: row.embedding_vector.unwrap_or(Value::Null),
            sentiment_score: decimal_to_f64(row.sentiment_score),
            row_data: row.row_data.unwrap_or(Value::Null),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DocumentSummaryRow {
    pub id: i64,
    pub content: String,
    pub sentiment_score: Decimal,
    pub row_data: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl From<DocumentSummaryRow> for DocumentSummary {
    fn from(row: DocumentSummaryRow) -> Self {
        Self {
            id: row.id,
            content: row.content,
            sentiment_score: decimal_to_f64(row.sentiment_score),
            row_data: row.row_data.unwrap_or(Value::Null),
            created_at: row.created_at,
        }
    }
}

fn decimal_to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// Round a score to the column's four decimal places.
///
/// # Errors
///
/// Returns [`DbError::NonFiniteScore`] for NaN or infinite input.
pub fn score_to_decimal(score: f64) -> Result<Decimal, DbError> {
    Decimal::from_f64(score)
        .map(|d| d.round_dp(4))
        .ok_or(DbError::NonFiniteScore(score))
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Create `table` with the `document_embeddings` layout if it does not exist.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any statement fails.
pub async fn create_document_table(pool: &PgPool, table: &DocumentTable) -> Result<(), DbError> {
    sqlx::query(&format!(
        "CREATE TABLE IF NOT EXISTS {table} ( \
             id BIGSERIAL PRIMARY KEY, \
             content TEXT NOT NULL, \
             embedding_vector JSONB, \
             sentiment_score NUMERIC(10,4) NOT NULL DEFAULT 0, \
             row_data JSONB, \
             created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(), \
             updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW() \
         )"
    ))
    .execute(pool)
    .await?;

    sqlx::query(&format!(
        "CREATE INDEX IF NOT EXISTS idx_{table}_created_at ON {table} (created_at DESC)"
    ))
    .execute(pool)
    .await?;

    sqlx::query(&format!(
        "CREATE INDEX IF NOT EXISTS idx_{table}_sentiment ON {table} (sentiment_score)"
    ))
    .execute(pool)
    .await?;

    Ok(())
}

/// Insert one document and return its generated id.
///
/// The embedding is stored as a JSONB number array; the score is rounded to four
/// decimal places.
///
/// # Errors
///
/// Returns [`DbError::NonFiniteScore`] for an unstorable score, or
/// [`DbError::Sqlx`] if the insert fails.
pub async fn insert_document(
    pool: &PgPool,
    table: &DocumentTable,
    document: &NewDocument,
) -> Result<i64, DbError> {
    let score = score_to_decimal(document.sentiment_score)?;

    // pgvector's text form is also a valid JSON array.
    let id: i64 = sqlx::query_scalar(&format!(
        "INSERT INTO {table} (content, embedding_vector, sentiment_score, row_data) \
         VALUES ($1, $2::jsonb, $3, $4) \
         RETURNING id"
    ))
    .bind(&document.content)
    .bind(vector_to_pg(&document.embedding))
    .bind(score)
    .bind(&document.row_data)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Up to `limit` documents with their vectors, in insertion order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn candidate_documents(
    pool: &PgPool,
    table: &DocumentTable,
    limit: i64,
) -> Result<Vec<DocumentRow>, DbError> {
    let rows = sqlx::query_as::<_, DocumentRow>(&format!(
        "SELECT id, content, embedding_vector, sentiment_score, row_data, created_at \
         FROM {table} \
         ORDER BY id \
         LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Newest documents first, without vectors.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn recent_documents(
    pool: &PgPool,
    table: &DocumentTable,
    limit: i64,
) -> Result<Vec<DocumentSummaryRow>, DbError> {
    let rows = sqlx::query_as::<_, DocumentSummaryRow>(&format!(
        "SELECT id, content, sentiment_score, row_data, created_at \
         FROM {table} \
         ORDER BY created_at DESC, id DESC \
         LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn score_rounds_to_four_places() {
        let d = score_to_decimal(1.234_567).unwrap();
        assert_eq!(d, Decimal::from_str("1.2346").unwrap());
    }

    #[test]
    fn non_finite_score_is_rejected() {
        assert!(matches!(
            score_to_decimal(f64::NAN),
            Err(DbError::NonFiniteScore(_))
        ));
        assert!(score_to_decimal(f64::INFINITY).is_err());
    }

    #[test]
    fn missing_json_columns_become_null() {
        let row = DocumentRow {
            id: 1,
            content: "x".to_string(),
            embedding_vector: None,
            sentiment_score: Decimal::from_str("-2.5000").unwrap(),
            row_data: None,
            created_at: Utc::now(),
        };
        let doc = StoredDocument::from(row);
        assert_eq!(doc.embedding_vector, Value::Null);
        assert_eq!(doc.row_data, Value::Null);
        assert!((doc.sentiment_score + 2.5).abs() < f64::EPSILON);
    }
}
