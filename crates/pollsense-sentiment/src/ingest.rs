//! Row-by-row ingestion: flatten, embed, score, persist.

use std::path::Path;
use std::time::Duration;

use pollsense_core::{AppConfig, DocumentStore, DocumentTable, NewDocument, StoreError};
use thiserror::Error;

use crate::embeddings::Embedder;
use crate::error::{EmbedError, IngestError};
use crate::scorer::SentimentAnalyzer;
use crate::types::{preview, BatchReport, RowOutcome, SourceRow};
use crate::workbook::read_workbook;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOptions {
    /// Pause after each successful write, except after the last source row.
    pub row_delay: Duration,
    pub preview_chars: usize,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            row_delay: Duration::from_millis(500),
            preview_chars: 100,
        }
    }
}

impl IngestOptions {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            row_delay: Duration::from_millis(config.ingest_row_delay_ms),
            ..Self::default()
        }
    }
}

#[derive(Debug, Error)]
enum RowError {
    #[error(transparent)]
    Embed(#[from] EmbedError),

    #[error("embedding has {got} dimensions, earlier rows had {expected}")]
    Dimension { expected: usize, got: usize },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Sole writer of documents.
pub struct Ingestor<S, E> {
    store: S,
    embedder: E,
    analyzer: SentimentAnalyzer,
    options: IngestOptions,
}

impl<S: DocumentStore, E: Embedder> Ingestor<S, E> {
    #[must_use]
    pub fn new(store: S, embedder: E, options: IngestOptions) -> Self {
        Self {
            store,
            embedder,
            analyzer: SentimentAnalyzer::new(),
            options,
        }
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read the first sheet of `path` and ingest its rows into `table`.
    ///
    /// # Errors
    ///
    /// Fails only if the workbook cannot be read. Row-level failures are
    /// reported in the returned [`BatchReport`].
    pub async fn ingest_workbook(
        &self,
        path: &Path,
        table: &DocumentTable,
    ) -> Result<BatchReport, IngestError> {
        let rows = read_workbook(path)?;
        Ok(self.ingest(&rows, table).await)
    }

    /// Ingest `rows` into `table`, one at a time.
    ///
    /// Blank rows are counted as skipped. A failing row is recorded and the
    /// batch moves on, unless the embedding provider is still rate limiting
    /// after retries: then the row is recorded as failed and the batch stops.
    pub async fn ingest(&self, rows: &[SourceRow], table: &DocumentTable) -> BatchReport {
        let mut report = BatchReport {
            total_rows: rows.len(),
            ..BatchReport::default()
        };
        let mut dimensions: Option<usize> = None;

        for (index, row) in rows.iter().enumerate() {
            let row_number = index + 1;
            let text = row.flatten_text();
            if text.trim().is_empty() {
                tracing::debug!(row = row_number, "skipping blank row");
                report.skipped += 1;
                continue;
            }
            let row_preview = preview(&text, self.options.preview_chars);

            match self.ingest_row(&text, row, table, &mut dimensions).await {
                Ok((document_id, score)) => {
                    tracing::info!(
                        row = row_number,
                        document_id,
                        score,
                        table = %table,
                        "row ingested"
                    );
                    report.succeeded += 1;
                    report.outcomes.push(RowOutcome {
                        row: row_number,
                        preview: row_preview,
                        success: true,
                        sentiment_score: Some(score),
                        document_id: Some(document_id),
                        error: None,
                    });
                    if row_number < rows.len() && !self.options.row_delay.is_zero() {
                        tokio::time::sleep(self.options.row_delay).await;
                    }
                }
                Err(err) => {
                    let halt = matches!(&err, RowError::Embed(e) if e.is_rate_limited());
                    tracing::warn!(row = row_number, error = %err, halt, "row failed");
                    report.failed += 1;
                    report.outcomes.push(RowOutcome {
                        row: row_number,
                        preview: row_preview,
                        success: false,
                        sentiment_score: None,
                        document_id: None,
                        error: Some(err.to_string()),
                    });
                    if halt {
                        report.halted_on_rate_limit = true;
                        break;
                    }
                }
            }
        }

        tracing::info!(
            table = %table,
            total = report.total_rows,
            succeeded = report.succeeded,
            failed = report.failed,
            skipped = report.skipped,
            halted = report.halted_on_rate_limit,
            "ingestion finished"
        );
        report
    }

    async fn ingest_row(
        &self,
        text: &str,
        row: &SourceRow,
        table: &DocumentTable,
        dimensions: &mut Option<usize>,
    ) -> Result<(i64, f64), RowError> {
        let embedding = self.embedder.embed(text).await?;
        match *dimensions {
            Some(expected) if expected != embedding.len() => {
                return Err(RowError::Dimension {
                    expected,
                    got: embedding.len(),
                });
            }
            Some(_) => {}
            None => *dimensions = Some(embedding.len()),
        }

        let score = self.analyzer.analyze(text).score;
        let document = NewDocument {
            content: text.to_string(),
            embedding,
            sentiment_score: score,
            row_data: row.to_json(),
        };
        let id = self.store.insert_document(table, &document).await?;
        Ok((id, score))
    }
}
