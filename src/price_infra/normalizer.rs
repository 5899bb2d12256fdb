use serde_json::Value;
use crate::types::row::{PriceRow, RawRow};

/// Converts any raw row into a canonical [`PriceRow`].
///
/// Total: never fails and never panics. Malformed numeric fields become
/// `None`, missing string fields become empty strings. `confidence` stays
/// `None` only when the key is absent entirely.
pub fn normalize_row(raw: &RawRow) -> PriceRow {
    PriceRow {
        source: coerce_string(raw.get("source")),
        item_name: coerce_string(raw.get("item_name")),
        variant: coerce_string(raw.get("variant")),
        links: match raw.get("links") {
            None | Some(Value::Null) => None,
            Some(v) => Some(v.clone()),
        },
        chaos_value: coerce_f64(raw.get("chaos_value")),
        divine_value: coerce_f64(raw.get("divine_value")),
        listing_count: coerce_i64(raw.get("listing_count")),
        confidence: if raw.contains_key("confidence") {
            Some(coerce_string(raw.get("confidence")))
        } else {
            None
        },
        explanation: match raw.get("explanation") {
            None | Some(Value::Null) => None,
            Some(v) => Some(v.clone()),
        },
        is_arbitrated: matches!(raw.get("is_arbitrated"), Some(Value::Bool(true))),
    }
}

pub fn coerce_string(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Float coercion. Non-finite results count as non-numeric.
pub fn coerce_f64(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Integer coercion. Fractional input is truncated toward zero.
pub fn coerce_i64(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(truncate_f64)),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().and_then(truncate_f64))
        }
        _ => None,
    }
}

fn truncate_f64(v: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive
    if v.is_finite() && v >= i64::MIN as f64 && v < i64::MAX as f64 {
        Some(v.trunc() as i64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_row_gets_every_column() {
        let row = normalize_row(&RawRow::new());

        assert_eq!(row.source, "");
        assert_eq!(row.item_name, "");
        assert_eq!(row.variant, "");
        assert_eq!(row.links, None);
        assert_eq!(row.chaos_value, None);
        assert_eq!(row.divine_value, None);
        assert_eq!(row.listing_count, None);
        assert_eq!(row.confidence, None);
        assert!(!row.is_arbitrated);
    }

    #[test]
    fn test_numeric_strings_are_coerced() {
        let raw = RawRow::from_value(json!({
            "source": "trade",
            "item_name": "Divine Orb",
            "chaos_value": " 12.5 ",
            "divine_value": "0.08",
            "listing_count": "42",
        }));
        let row = normalize_row(&raw);

        assert_eq!(row.chaos_value, Some(12.5));
        assert_eq!(row.divine_value, Some(0.08));
        assert_eq!(row.listing_count, Some(42));
    }

    #[test]
    fn test_malformed_numbers_degrade_to_none() {
        let raw = RawRow::from_value(json!({
            "chaos_value": "n/a",
            "divine_value": "",
            "listing_count": {"count": 3},
        }));
        let row = normalize_row(&raw);

        assert_eq!(row.chaos_value, None);
        assert_eq!(row.divine_value, None);
        assert_eq!(row.listing_count, None);
    }

    #[test]
    fn test_non_finite_strings_are_none() {
        assert_eq!(coerce_f64(Some(&json!("NaN"))), None);
        assert_eq!(coerce_f64(Some(&json!("inf"))), None);
        assert_eq!(coerce_i64(Some(&json!("-inf"))), None);
    }

    #[test]
    fn test_listing_count_truncates_floats() {
        assert_eq!(coerce_i64(Some(&json!(7.9))), Some(7));
        assert_eq!(coerce_i64(Some(&json!("7.9"))), Some(7));
        assert_eq!(coerce_i64(Some(&json!(-3))), Some(-3));
        assert_eq!(coerce_i64(Some(&json!(1e300))), None);
    }

    #[test]
    fn test_strings_coerced_from_other_types() {
        let raw = RawRow::from_value(json!({
            "source": 5,
            "item_name": true,
            "variant": null,
        }));
        let row = normalize_row(&raw);

        assert_eq!(row.source, "5");
        assert_eq!(row.item_name, "true");
        assert_eq!(row.variant, "");
    }

    #[test]
    fn test_links_pass_through() {
        let text = normalize_row(&RawRow::new().with("links", "5L"));
        let number = normalize_row(&RawRow::new().with("links", 6));
        let null = normalize_row(&RawRow::new().with("links", Value::Null));

        assert_eq!(text.links, Some(json!("5L")));
        assert_eq!(number.links, Some(json!(6)));
        assert_eq!(null.links, None);
    }

    #[test]
    fn test_confidence_absent_vs_empty() {
        let absent = normalize_row(&RawRow::new());
        let empty = normalize_row(&RawRow::new().with("confidence", ""));
        let null = normalize_row(&RawRow::new().with("confidence", Value::Null));
        let high = normalize_row(&RawRow::new().with("confidence", "high"));

        assert_eq!(absent.confidence, None);
        assert_eq!(empty.confidence, Some(String::new()));
        assert_eq!(null.confidence, Some(String::new()));
        assert_eq!(high.confidence, Some("high".to_string()));
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let raw = RawRow::from_value(json!({
            "source": "ninja",
            "item_name": "Tabula Rasa",
            "variant": "6L",
            "links": 6,
            "chaos_value": "11.25",
            "divine_value": 0.07,
            "listing_count": "14",
            "confidence": "medium",
            "explanation": {"basis": "ladder"},
        }));
        let once = normalize_row(&raw);
        let twice = normalize_row(&RawRow::from(&once));

        assert_eq!(once, twice);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let raw = RawRow::new().with("source", "x").with("mystery", json!([1, 2]));
        let row = normalize_row(&raw);

        assert_eq!(row.source, "x");
    }
}
