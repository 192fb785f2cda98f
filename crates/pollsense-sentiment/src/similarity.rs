//! In-process cosine similarity.
//!
//! Used when vectors cannot be ranked by the store, e.g. documents whose
//! embeddings are stored as JSON. The scan is linear over whatever candidate
//! set the caller pulled; nothing outside that set is considered.

use serde_json::Value;

use crate::error::SimilarityError;

/// Cosine similarity of two equal-length, non-zero vectors, in `[-1, 1]`.
///
/// # Errors
///
/// Returns [`SimilarityError`] for empty input, mismatched lengths, or a
/// zero-magnitude vector.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64, SimilarityError> {
    if a.len() != b.len() {
        return Err(SimilarityError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    if a.is_empty() {
        return Err(SimilarityError::Empty);
    }

    let mut dot = 0.0_f64;
    let mut norm_a = 0.0_f64;
    let mut norm_b = 0.0_f64;
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Err(SimilarityError::ZeroMagnitude);
    }

    Ok((dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0))
}

/// `1 - cosine_similarity(a, b)`, matching pgvector's `<=>` operator.
///
/// # Errors
///
/// Same conditions as [`cosine_similarity`].
pub fn cosine_distance(a: &[f32], b: &[f32]) -> Result<f64, SimilarityError> {
    cosine_similarity(a, b).map(|s| 1.0 - s)
}

/// An item paired with its similarity to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct Scored<T> {
    pub item: T,
    pub similarity: f64,
}

/// Score every candidate against `query`, sort by similarity descending and
/// keep the first `top_n`.
///
/// The sort is stable, so equally similar candidates keep their input order.
///
/// # Errors
///
/// Fails on the first candidate whose vector cannot be compared with `query`.
pub fn rank_by_similarity<T, I>(
    query: &[f32],
    candidates: I,
    top_n: usize,
) -> Result<Vec<Scored<T>>, SimilarityError>
where
    I: IntoIterator<Item = (T, Vec<f32>)>,
{
    let mut scored = candidates
        .into_iter()
        .map(|(item, vector)| {
            cosine_similarity(query, &vector).map(|similarity| Scored { item, similarity })
        })
        .collect::<Result<Vec<_>, _>>()?;

    scored.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    scored.truncate(top_n);
    Ok(scored)
}

/// Decode an embedding stored as JSON.
///
/// Accepts a JSON array of numbers, or a JSON string containing one (vectors
/// written through a text column arrive double-encoded).
///
/// # Errors
///
/// Returns a human-readable reason when the value is not a non-empty numeric
/// array.
pub fn decode_stored_vector(value: &Value) -> Result<Vec<f32>, String> {
    let array = match value {
        Value::Array(items) => items.clone(),
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Array(items)) => items,
            Ok(other) => return Err(format!("expected an array, found {}", kind(&other))),
            Err(e) => return Err(format!("unparsable JSON: {e}")),
        },
        other => return Err(format!("expected an array, found {}", kind(other))),
    };

    if array.is_empty() {
        return Err("empty vector".to_string());
    }

    array
        .iter()
        .enumerate()
        .map(|(i, v)| {
            #[allow(clippy::cast_possible_truncation)]
            v.as_f64()
                .map(|f| f as f32)
                .ok_or_else(|| format!("element {i} is not a number"))
        })
        .collect()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
