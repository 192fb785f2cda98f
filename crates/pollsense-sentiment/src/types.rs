use serde::Serialize;
use serde_json::{Map, Value};

/// One tabular source row: `(column, value)` pairs in column order.
///
/// Empty cells are not represented, so two rows from the same sheet may have
/// different column sets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceRow {
    pub cells: Vec<(String, Value)>,
}

impl SourceRow {
    #[must_use]
    pub fn new(cells: Vec<(String, Value)>) -> Self {
        Self { cells }
    }

    /// Cell values in column order joined by a single space. Strings are used
    /// as-is; other values use their JSON rendering.
    #[must_use]
    pub fn flatten_text(&self) -> String {
        self.cells
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(_, value)| match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The row as a JSON object in column order, persisted as `row_data`.
    ///
    /// Key order holds in the returned value and its serialized form. A JSONB
    /// column stores keys in its own canonical order.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self.cells.iter().cloned().collect();
        Value::Object(map)
    }
}

/// Result of one non-skipped source row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowOutcome {
    /// 1-based position among all source rows, skipped rows included.
    pub row: usize,
    pub preview: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Summary of an ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    pub total_rows: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    /// True when the run stopped early because the embedding provider kept
    /// rate limiting. Rows after the failing one are absent from `outcomes`.
    pub halted_on_rate_limit: bool,
    pub outcomes: Vec<RowOutcome>,
}

impl BatchReport {
    #[must_use]
    pub fn failures(&self) -> impl Iterator<Item = &RowOutcome> {
        self.outcomes.iter().filter(|o| !o.success)
    }
}

/// First `max_chars` characters of `text`.
#[must_use]
pub fn preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
