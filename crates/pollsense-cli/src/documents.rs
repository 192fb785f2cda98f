//! Document ingestion and search handlers.

use std::path::Path;

use pollsense_core::{AppConfig, DocumentTable};
use pollsense_db::PgStore;
use pollsense_sentiment::{IngestOptions, Ingestor};

use crate::{build_embedder, print_json, LiveAnalyzer};

/// Ingest a workbook into `table`, creating the table first when it is not
/// the default one.
///
/// # Errors
///
/// Returns an error if the table name is invalid, the workbook cannot be
/// read, or the run halted on rate limiting. The batch report is printed
/// before a halt is reported.
pub(crate) async fn run_ingest(
    config: &AppConfig,
    store: PgStore,
    workbook: &Path,
    table: &str,
) -> anyhow::Result<()> {
    let table = DocumentTable::new(table)?;
    if table != DocumentTable::default() {
        pollsense_db::create_document_table(store.pool(), &table).await?;
        tracing::info!(table = %table, "destination table ready");
    }

    let ingestor = Ingestor::new(
        store,
        build_embedder(config)?,
        IngestOptions::from_app_config(config),
    );
    let report = ingestor.ingest_workbook(workbook, &table).await?;
    print_json(&report)?;

    if report.halted_on_rate_limit {
        let last_row = report.outcomes.last().map_or(0, |o| o.row);
        tracing::error!(
            table = %table,
            last_row,
            succeeded = report.succeeded,
            "ingestion halted on rate limiting"
        );
        anyhow::bail!("ingestion halted at row {last_row}: embedding provider kept rate limiting");
    }
    Ok(())
}

/// # Errors
///
/// Returns an error for an invalid table name, a blank query, or an
/// embedding or store failure.
pub(crate) async fn run_search(
    analyzer: &LiveAnalyzer,
    table: &str,
    query: &str,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    let table = DocumentTable::new(table)?;
    let limits = analyzer.limits();
    tracing::info!(
        table = %table,
        top_n = limit.unwrap_or(limits.search_top_n),
        candidates = limits.search_candidates,
        "semantic search"
    );
    let hits = analyzer.semantic_search(&table, query, limit).await?;
    print_json(&hits)
}

/// # Errors
///
/// Returns an error for an invalid table name or limit, or a store failure.
pub(crate) async fn run_list(
    analyzer: &LiveAnalyzer,
    table: &str,
    limit: Option<i64>,
) -> anyhow::Result<()> {
    let table = DocumentTable::new(table)?;
    let documents = analyzer.list_documents(&table, limit).await?;
    print_json(&documents)
}
