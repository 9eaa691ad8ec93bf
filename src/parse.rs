//! Input parsing: turns a CSV or JSON file into raw rows for normalization.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::ImportError;

/// One raw input row: string keys to scalar values, shape not fixed.
pub type RawRow = Map<String, Value>;

/// Reads the file at `path` and produces raw rows.
///
/// JSON files (by extension) accept two shapes: a top-level array of row
/// objects, or an object with a `rows` array. Any other JSON shape yields an
/// empty row set. Everything else is treated as delimited text with a header
/// line.
pub fn parse_rows(path: &Path) -> Result<Vec<RawRow>, ImportError> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    let content = fs::read_to_string(path)
        .map_err(|e| ImportError::InputFormat(format!("failed to read {}: {e}", path.display())))?;

    let rows = if is_json {
        parse_json(&content)?
    } else {
        parse_csv(&content)?
    };

    info!(path = %path.display(), rows = rows.len(), "Parsed input file");
    Ok(rows)
}

fn parse_json(content: &str) -> Result<Vec<RawRow>, ImportError> {
    let json: Value = serde_json::from_str(content)
        .map_err(|e| ImportError::InputFormat(format!("invalid JSON: {e}")))?;

    // Accepted shapes: [ {..}, .. ] or { "rows": [ {..}, .. ] }.
    // Anything else is an empty row set, not an error.
    let array = match &json {
        Value::Array(a) => Some(a),
        Value::Object(o) => o.get("rows").and_then(Value::as_array),
        _ => None,
    };

    let Some(array) = array else {
        warn!("JSON input has no recognizable row array, treating as empty");
        return Ok(Vec::new());
    };

    let rows = array
        .iter()
        .filter_map(|v| v.as_object().cloned())
        .collect::<Vec<_>>();
    debug!(total = array.len(), objects = rows.len(), "Collected JSON row objects");
    Ok(rows)
}

fn parse_csv(content: &str) -> Result<Vec<RawRow>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| ImportError::InputFormat(format!("invalid CSV header: {e}")))?
        .clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ImportError::InputFormat(format!("invalid CSV row: {e}")))?;
        let mut row = RawRow::new();
        for (header, field) in headers.iter().zip(record.iter()) {
            row.insert(header.to_string(), Value::String(field.to_string()));
        }
        rows.push(row);
    }
    debug!(rows = rows.len(), "Collected CSV rows");
    Ok(rows)
}
