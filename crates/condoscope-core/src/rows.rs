//! # Lenient Row Normalisation
//!
//! Rows reach the core as loosely-typed JSON objects. Field readers here
//! never fail: a missing, null or malformed value becomes `None` (or zero for
//! amounts) so that one bad row cannot abort an evaluation.
//!
//! Every reader takes a list of accepted keys so that both `snake_case` and
//! `camelCase` spellings resolve to the same field.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};

/// One raw row as produced by the data layer.
pub type Row = Map<String, Value>;

/// First non-null value among `keys`.
fn field<'a>(row: &'a Row, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| row.get(*k))
        .find(|v| !v.is_null())
}

/// Read a text field. Numbers and booleans are rendered as text.
#[must_use]
pub fn text(row: &Row, keys: &[&str]) -> Option<String> {
    match field(row, keys)? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Read a status/category label, normalised for matching.
///
/// Empty when the field is absent.
#[must_use]
pub fn label(row: &Row, keys: &[&str]) -> String {
    text(row, keys).map(|s| normalize_label(&s)).unwrap_or_default()
}

/// Read a currency amount.
///
/// Accepts JSON numbers and plain numeric strings (`"500.00"`). Anything
/// else, including non-finite values, reads as zero.
#[must_use]
pub fn amount(row: &Row, keys: &[&str]) -> f64 {
    let parsed = match field(row, keys) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Read a calendar date.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps and naive `YYYY-MM-DD HH:MM:SS`
/// timestamps (with `T` or space separator). Anything else is `None`.
#[must_use]
pub fn date(row: &Row, keys: &[&str]) -> Option<NaiveDate> {
    match field(row, keys)? {
        Value::String(s) => parse_date(s),
        _ => None,
    }
}

/// Parse a date in any of the accepted spellings.
#[must_use]
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
}

/// Lowercase, trim, fold Portuguese accents and unify separators to `_`.
///
/// `"Em Andamento"` and `"em-andamento"` both become `"em_andamento"`;
/// `"Atenção"` becomes `"atencao"`.
#[must_use]
pub fn normalize_label(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            ' ' | '-' => '_',
            other => other,
        })
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => Row::new(),
        }
    }

    #[test]
    fn amount_accepts_numbers_and_numeric_strings() {
        let r = row(json!({"a": 12.5, "b": " 500.00 ", "c": "abc", "d": true}));
        assert_eq!(amount(&r, &["a"]), 12.5);
        assert_eq!(amount(&r, &["b"]), 500.0);
        assert_eq!(amount(&r, &["c"]), 0.0);
        assert_eq!(amount(&r, &["d"]), 0.0);
        assert_eq!(amount(&r, &["missing"]), 0.0);
    }

    #[test]
    fn amount_rejects_non_finite_strings() {
        let r = row(json!({"a": "NaN", "b": "inf"}));
        assert_eq!(amount(&r, &["a"]), 0.0);
        assert_eq!(amount(&r, &["b"]), 0.0);
    }

    #[test]
    fn date_accepts_all_spellings() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 9);
        assert_eq!(parse_date("2024-03-09"), expected);
        assert_eq!(parse_date("2024-03-09T23:10:00Z"), expected);
        assert_eq!(parse_date("2024-03-09T10:00:00-03:00"), expected);
        assert_eq!(parse_date("2024-03-09T10:00:00.123"), expected);
        assert_eq!(parse_date("2024-03-09 10:00:00"), expected);
        assert_eq!(parse_date("09/03/2024"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn keys_fall_through_nulls() {
        let r = row(json!({"due_date": null, "dueDate": "2024-01-02"}));
        assert_eq!(
            date(&r, &["due_date", "dueDate"]),
            NaiveDate::from_ymd_opt(2024, 1, 2)
        );
    }

    #[test]
    fn text_renders_numbers_and_drops_blank() {
        let r = row(json!({"id": 42, "name": "  ", "flag": false}));
        assert_eq!(text(&r, &["id"]), Some("42".to_string()));
        assert_eq!(text(&r, &["name"]), None);
        assert_eq!(text(&r, &["flag"]), Some("false".to_string()));
    }

    #[test]
    fn labels_fold_case_accents_and_separators() {
        assert_eq!(normalize_label("Em Andamento"), "em_andamento");
        assert_eq!(normalize_label("em-andamento"), "em_andamento");
        assert_eq!(normalize_label(" Atenção "), "atencao");
        assert_eq!(normalize_label("CONCLUÍDA"), "concluida");
    }
}
