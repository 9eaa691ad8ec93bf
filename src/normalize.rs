//! Row normalization: maps heterogeneous raw rows into a canonical record
//! shape, dropping rows that lack a list or card name.

use serde_json::Value;
use tracing::debug;

use crate::parse::RawRow;

/// The canonical record produced from one raw row.
///
/// `list` and `card` are trimmed and non-empty; rows failing that are dropped
/// before any resolution happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardRecord {
    pub list: String,
    pub card: String,
    pub description: String,
    /// Distinct non-empty label names, first-seen order within the row.
    pub labels: Vec<String>,
}

/// Normalizes raw rows, preserving the order of surviving records.
pub fn normalize(rows: &[RawRow]) -> Vec<CardRecord> {
    let records: Vec<CardRecord> = rows
        .iter()
        .filter_map(|row| {
            let list = field(row, &["List", "list"]).trim().to_string();
            let card = field(row, &["Card", "card"]).trim().to_string();
            if list.is_empty() || card.is_empty() {
                return None;
            }
            Some(CardRecord {
                list,
                card,
                description: field(row, &["Description", "description"]),
                labels: split_labels(&field(row, &["Labels", "labels"])),
            })
        })
        .collect();
    debug!(raw = rows.len(), kept = records.len(), "Normalized input rows");
    records
}

/// Reads the first present key from the fallback chain, stringifying scalar
/// values; missing keys coerce to the empty string.
fn field(row: &RawRow, keys: &[&str]) -> String {
    for key in keys {
        match row.get(*key) {
            Some(Value::String(s)) => return s.clone(),
            Some(Value::Null) | None => continue,
            Some(other) => return other.to_string(),
        }
    }
    String::new()
}

/// Splits a comma-separated label field into trimmed, non-empty, within-row
/// deduplicated names.
fn split_labels(raw: &str) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for segment in raw.split(',') {
        let name = segment.trim();
        if !name.is_empty() && !labels.iter().any(|l| l == name) {
            labels.push(name.to_string());
        }
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect()
    }

    #[test]
    fn drops_rows_missing_list_or_card_and_keeps_order() {
        let rows = vec![
            row(&[("List", "A"), ("Card", "1")]),
            row(&[("List", "  "), ("Card", "2")]),
            row(&[("List", "B"), ("Card", "")]),
            row(&[("List", "B"), ("Card", "3")]),
        ];
        let records = normalize(&rows);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].card, "1");
        assert_eq!(records[1].card, "3");
    }

    #[test]
    fn lowercase_keys_are_accepted() {
        let rows = vec![row(&[("list", "Todo"), ("card", "Task"), ("labels", "x")])];
        let records = normalize(&rows);
        assert_eq!(records[0].list, "Todo");
        assert_eq!(records[0].labels, vec!["x"]);
    }

    #[test]
    fn label_splitting_trims_and_drops_empty_segments() {
        assert_eq!(split_labels("a, b ,,c"), vec!["a", "b", "c"]);
        assert_eq!(split_labels(""), Vec::<String>::new());
        assert_eq!(split_labels(" , "), Vec::<String>::new());
    }

    #[test]
    fn labels_are_deduplicated_within_a_row() {
        assert_eq!(split_labels("bug,urgent,bug"), vec!["bug", "urgent"]);
    }

    #[test]
    fn numeric_scalars_are_stringified() {
        let mut r = RawRow::new();
        r.insert("List".into(), json!("Todo"));
        r.insert("Card".into(), json!(42));
        let records = normalize(&[r]);
        assert_eq!(records[0].card, "42");
    }

    #[test]
    fn names_are_trimmed() {
        let rows = vec![row(&[("List", "  Todo "), ("Card", " Task1 ")])];
        let records = normalize(&rows);
        assert_eq!(records[0].list, "Todo");
        assert_eq!(records[0].card, "Task1");
    }
}
