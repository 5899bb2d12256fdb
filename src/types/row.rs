use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Canonical price row. Every source's output is normalized into this shape.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceRow {
    pub source: String,
    pub item_name: String,
    pub variant: String,
    #[serde(default)]
    pub links: Option<Value>,
    #[serde(default)]
    pub chaos_value: Option<f64>,
    #[serde(default)]
    pub divine_value: Option<f64>,
    #[serde(default)]
    pub listing_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<Value>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_arbitrated: bool,
}

impl PriceRow {
    pub fn new(source: impl Into<String>, item_name: impl Into<String>) -> Self {
        PriceRow {
            source: source.into(),
            item_name: item_name.into(),
            ..Default::default()
        }
    }

    pub fn with_chaos(mut self, chaos_value: f64) -> Self {
        self.chaos_value = Some(chaos_value);
        self
    }

    pub fn with_divine(mut self, divine_value: f64) -> Self {
        self.divine_value = Some(divine_value);
        self
    }

    pub fn with_listing_count(mut self, listing_count: i64) -> Self {
        self.listing_count = Some(listing_count);
        self
    }

    pub fn with_confidence(mut self, confidence: impl Into<String>) -> Self {
        self.confidence = Some(confidence.into());
        self
    }

    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = variant.into();
        self
    }
}

/// Loosely-typed row as produced by a price source, prior to normalization.
///
/// Fields may be missing, null, or of the wrong type; the normalizer is
/// responsible for turning any `RawRow` into a [`PriceRow`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRow(Map<String, Value>);

impl RawRow {
    pub fn new() -> Self {
        RawRow(Map::new())
    }

    /// Builds a row from any JSON value. Non-object values yield an empty row.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => RawRow(map),
            _ => RawRow::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for RawRow {
    fn from(map: Map<String, Value>) -> Self {
        RawRow(map)
    }
}

impl From<Value> for RawRow {
    fn from(value: Value) -> Self {
        RawRow::from_value(value)
    }
}

impl From<PriceRow> for RawRow {
    fn from(row: PriceRow) -> Self {
        let mut map = Map::new();
        map.insert("source".into(), Value::String(row.source));
        map.insert("item_name".into(), Value::String(row.item_name));
        map.insert("variant".into(), Value::String(row.variant));
        map.insert("links".into(), row.links.unwrap_or(Value::Null));
        map.insert("chaos_value".into(), opt_f64(row.chaos_value));
        map.insert("divine_value".into(), opt_f64(row.divine_value));
        map.insert(
            "listing_count".into(),
            row.listing_count.map(Value::from).unwrap_or(Value::Null),
        );
        if let Some(confidence) = row.confidence {
            map.insert("confidence".into(), Value::String(confidence));
        }
        if let Some(explanation) = row.explanation {
            map.insert("explanation".into(), explanation);
        }
        if row.is_arbitrated {
            map.insert("is_arbitrated".into(), Value::Bool(true));
        }
        RawRow(map)
    }
}

impl From<&PriceRow> for RawRow {
    fn from(row: &PriceRow) -> Self {
        RawRow::from(row.clone())
    }
}

fn opt_f64(value: Option<f64>) -> Value {
    value
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_non_object_is_empty() {
        assert_eq!(RawRow::from_value(json!([1, 2, 3])), RawRow::new());
        assert_eq!(RawRow::from_value(json!("row")), RawRow::new());
        assert_eq!(RawRow::from_value(Value::Null), RawRow::new());
    }

    #[test]
    fn test_price_row_to_raw_keeps_confidence_absent() {
        let raw = RawRow::from(PriceRow::new("ninja", "Mageblood").with_chaos(120.0));

        assert!(!raw.contains_key("confidence"));
        assert_eq!(raw.get("chaos_value"), Some(&json!(120.0)));
        assert_eq!(raw.get("divine_value"), Some(&Value::Null));
    }

    #[test]
    fn test_price_row_to_raw_carries_every_column() {
        let row = PriceRow::new("trade", "Tabula Rasa")
            .with_variant("6L")
            .with_divine(0.05)
            .with_listing_count(9);
        let raw = RawRow::from(&row);

        assert_eq!(raw.as_map().len(), 7);
        assert_eq!(raw.get("variant"), Some(&json!("6L")));
        assert_eq!(raw.get("divine_value"), Some(&json!(0.05)));
        assert_eq!(raw.get("listing_count"), Some(&json!(9)));
    }

    #[test]
    fn test_price_row_serializes_without_arbitrated_flag_by_default() {
        let row = PriceRow::new("ninja", "Headhunter");
        let value = serde_json::to_value(&row).unwrap();

        assert!(value.get("is_arbitrated").is_none());
        assert_eq!(value["source"], json!("ninja"));
        assert_eq!(value["chaos_value"], Value::Null);
    }
}
