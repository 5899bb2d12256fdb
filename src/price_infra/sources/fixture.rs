use async_trait::async_trait;
use crate::error::Result;
use crate::price_infra::normalizer::coerce_string;
use crate::price_infra::sources::PriceSource;
use crate::types::row::RawRow;

/// Serves a fixed set of rows, e.g. declared in configuration.
///
/// When `match_item_name` is set, only rows whose `item_name` occurs
/// (case-insensitively) in the queried text are returned.
pub struct FixtureSource {
    name: String,
    rows: Vec<RawRow>,
    match_item_name: bool,
}

impl FixtureSource {
    pub fn new(name: impl Into<String>, rows: Vec<RawRow>) -> Self {
        FixtureSource {
            name: name.into(),
            rows,
            match_item_name: false,
        }
    }

    pub fn matching_item_name(mut self) -> Self {
        self.match_item_name = true;
        self
    }
}

#[async_trait]
impl PriceSource for FixtureSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn check_item(&self, text: &str) -> Result<Vec<RawRow>> {
        if !self.match_item_name {
            return Ok(self.rows.clone());
        }
        let haystack = text.to_lowercase();
        Ok(self
            .rows
            .iter()
            .filter(|row| {
                let item = coerce_string(row.get("item_name")).to_lowercase();
                !item.is_empty() && haystack.contains(&item)
            })
            .cloned()
            .collect())
    }
}
