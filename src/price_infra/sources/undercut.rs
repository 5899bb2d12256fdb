use std::sync::Arc;
use async_trait::async_trait;
use serde_json::{json, Value};
use crate::error::{Error, Result};
use crate::price_infra::normalizer::coerce_f64;
use crate::price_infra::sources::PriceSource;
use crate::types::row::RawRow;

/// Derived source: prices from `inner`, scaled by `factor` and relabelled.
///
/// Used to suggest a listing price slightly under the going rate.
pub struct UndercutSource {
    name: String,
    inner: Arc<dyn PriceSource>,
    factor: f64,
}

impl UndercutSource {
    pub fn new(name: impl Into<String>, inner: Arc<dyn PriceSource>, factor: f64) -> Result<Self> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(Error::InvalidFactor(factor));
        }
        Ok(UndercutSource {
            name: name.into(),
            inner,
            factor,
        })
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    fn transform(&self, mut row: RawRow) -> RawRow {
        for key in ["chaos_value", "divine_value"] {
            let scaled = coerce_f64(row.get(key))
                .map(|v| v * self.factor)
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null);
            row.insert(key, scaled);
        }
        row.insert("source", self.name.as_str());
        if !row.contains_key("explanation") {
            row.insert(
                "explanation",
                json!({ "derived_from": self.inner.name(), "factor": self.factor }),
            );
        }
        row
    }
}

#[async_trait]
impl PriceSource for UndercutSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn check_item(&self, text: &str) -> Result<Vec<RawRow>> {
        let rows = self.inner.check_item(text).await?;
        Ok(rows.into_iter().map(|row| self.transform(row)).collect())
    }
}
