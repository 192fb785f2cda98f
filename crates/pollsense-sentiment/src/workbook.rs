//! Spreadsheet reader: first worksheet, header row, one [`SourceRow`] per
//! later row.

use std::collections::HashMap;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use serde_json::{Number, Value};

use crate::error::IngestError;
use crate::types::SourceRow;

const EMPTY_HEADER: &str = "__EMPTY";

/// Read the first worksheet of an `.xlsx`, `.xls` or `.ods` file.
///
/// # Errors
///
/// Returns [`IngestError::Workbook`] if the file cannot be opened or parsed,
/// and [`IngestError::NoWorksheet`] if it has no sheets.
pub fn read_workbook(path: &Path) -> Result<Vec<SourceRow>, IngestError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| IngestError::NoWorksheet(path.to_path_buf()))??;

    let grid: Vec<&[Data]> = range.rows().collect();
    let rows = rows_from_grid(&grid);
    tracing::debug!(path = %path.display(), rows = rows.len(), "read workbook");
    Ok(rows)
}

/// Turn a cell grid into rows keyed by the first row's headers.
///
/// Rows whose cells are all empty are kept as empty [`SourceRow`]s so that
/// row numbering matches the sheet.
#[must_use]
pub fn rows_from_grid<R: AsRef<[Data]>>(grid: &[R]) -> Vec<SourceRow> {
    let Some((header, body)) = grid.split_first() else {
        return Vec::new();
    };
    let headers = header_names(header.as_ref());

    body.iter()
        .map(|cells| {
            let cells = cells
                .as_ref()
                .iter()
                .zip(&headers)
                .filter_map(|(cell, name)| cell_value(cell).map(|v| (name.clone(), v)))
                .collect();
            SourceRow::new(cells)
        })
        .collect()
}

/// Header labels, with blanks named `__EMPTY`, `__EMPTY_1`, … and repeated
/// labels suffixed `_1`, `_2`, ….
fn header_names(header: &[Data]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    header
        .iter()
        .map(|cell| {
            let base = match cell_value(cell) {
                Some(Value::String(s)) => s.trim().to_string(),
                Some(other) => other.to_string(),
                None => String::new(),
            };
            let base = if base.is_empty() {
                EMPTY_HEADER.to_string()
            } else {
                base
            };
            let count = seen.entry(base.clone()).or_insert(0);
            let name = if *count == 0 {
                base
            } else {
                format!("{base}_{count}")
            };
            *count += 1;
            name
        })
        .collect()
}

/// `None` for cells that should be omitted from the row.
fn cell_value(cell: &Data) -> Option<Value> {
    match cell {
        Data::Empty => None,
        Data::String(s) if s.trim().is_empty() => None,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            Some(Value::String(s.clone()))
        }
        Data::Int(i) => Some(Value::Number((*i).into())),
        Data::Float(f) => Some(float_value(*f)),
        Data::Bool(b) => Some(Value::Bool(*b)),
        Data::DateTime(dt) => Some(match dt.as_datetime() {
            Some(naive) => Value::String(naive.format("%Y-%m-%dT%H:%M:%S").to_string()),
            None => float_value(dt.as_f64()),
        }),
        Data::Error(e) => Some(Value::String(e.to_string())),
    }
}

/// Integral floats become JSON integers so "5" in a sheet reads back as `5`.
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn float_value(f: f64) -> Value {
    if f.fract() == 0.0 && f.abs() < 9.0e15 {
        return Value::Number((f as i64).into());
    }
    Number::from_f64(f).map_or(Value::Null, Value::Number)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn s(text: &str) -> Data {
        Data::String(text.to_string())
    }

    #[test]
    fn empty_grid_has_no_rows() {
        let grid: Vec<Vec<Data>> = Vec::new();
        assert!(rows_from_grid(&grid).is_empty());
    }

    #[test]
    fn header_only_grid_has_no_rows() {
        let grid = vec![vec![s("comment")]];
        assert!(rows_from_grid(&grid).is_empty());
    }

    #[test]
    fn rows_are_keyed_by_header_in_column_order() {
        let grid = vec![
            vec![s("comment"), s("rating")],
            vec![s("Great keynote"), Data::Float(5.0)],
        ];
        let rows = rows_from_grid(&grid);
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].cells,
            vec![
                ("comment".to_string(), json!("Great keynote")),
                ("rating".to_string(), json!(5)),
            ]
        );
        assert_eq!(rows[0].flatten_text(), "Great keynote 5");
    }

    #[test]
    fn empty_cells_are_omitted() {
        let grid = vec![
            vec![s("a"), s("b"), s("c")],
            vec![s("x"), Data::Empty, s("   ")],
        ];
        let rows = rows_from_grid(&grid);
        assert_eq!(rows[0].cells, vec![("a".to_string(), json!("x"))]);
    }

    #[test]
    fn blank_rows_are_kept_empty() {
        let grid = vec![
            vec![s("comment")],
            vec![s("first")],
            vec![Data::Empty],
            vec![s("third")],
        ];
        let rows = rows_from_grid(&grid);
        assert_eq!(rows.len(), 3);
        assert!(rows[1].cells.is_empty());
    }

    #[test]
    fn blank_and_repeated_headers_are_named() {
        let names = header_names(&[s("q"), Data::Empty, s("q"), s(""), s("q")]);
        assert_eq!(names, vec!["q", "__EMPTY", "q_1", "__EMPTY_1", "q_2"]);
    }

    #[test]
    fn non_integral_floats_stay_floats() {
        assert_eq!(float_value(2.5), json!(2.5));
        assert_eq!(float_value(-3.0), json!(-3));
        assert_eq!(float_value(f64::NAN), Value::Null);
    }

    #[test]
    fn bools_and_ints_convert() {
        assert_eq!(cell_value(&Data::Bool(true)), Some(json!(true)));
        assert_eq!(cell_value(&Data::Int(-7)), Some(json!(-7)));
    }
}
