use std::collections::HashMap;
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::error::{Error, Result};
use crate::price_infra::sources::{FixtureSource, PriceSource, UndercutSource};
use crate::types::row::RawRow;

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceConfig {
    Fixture {
        name: String,
        #[serde(default)]
        match_item_name: bool,
        #[serde(default)]
        rows: Vec<Value>,
    },
    Undercut {
        name: String,
        /// Must name a source declared earlier in the list.
        base: String,
        factor: f64,
    },
}

impl SourceConfig {
    pub fn name(&self) -> &str {
        match self {
            SourceConfig::Fixture { name, .. } => name,
            SourceConfig::Undercut { name, .. } => name,
        }
    }
}

/// Instantiates configured sources in declaration order.
pub fn build_sources(configs: &[SourceConfig]) -> Result<Vec<Arc<dyn PriceSource>>> {
    let mut built: Vec<Arc<dyn PriceSource>> = Vec::with_capacity(configs.len());
    let mut by_name: HashMap<String, Arc<dyn PriceSource>> = HashMap::new();

    for config in configs {
        let source: Arc<dyn PriceSource> = match config {
            SourceConfig::Fixture { name, match_item_name, rows } => {
                let rows = rows.iter().cloned().map(RawRow::from_value).collect();
                let fixture = FixtureSource::new(name.clone(), rows);
                if *match_item_name {
                    Arc::new(fixture.matching_item_name())
                } else {
                    Arc::new(fixture)
                }
            }
            SourceConfig::Undercut { name, base, factor } => {
                let inner = by_name
                    .get(base)
                    .cloned()
                    .ok_or_else(|| Error::UnknownSource(base.clone()))?;
                Arc::new(UndercutSource::new(name.clone(), inner, *factor)?)
            }
        };

        by_name.insert(config.name().to_string(), Arc::clone(&source));
        built.push(source);
    }

    tracing::info!("Built {} price sources", built.len());
    Ok(built)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builds_in_declaration_order() {
        let configs = vec![
            SourceConfig::Fixture {
                name: "ninja".into(),
                match_item_name: false,
                rows: vec![json!({"chaos_value": 10.0})],
            },
            SourceConfig::Undercut {
                name: "undercut".into(),
                base: "ninja".into(),
                factor: 0.95,
            },
        ];

        let sources = build_sources(&configs).unwrap();
        let names: Vec<&str> = sources.iter().map(|s| s.name()).collect();

        assert_eq!(names, vec!["ninja", "undercut"]);
    }

    #[test]
    fn test_undercut_requires_earlier_base() {
        let configs = vec![SourceConfig::Undercut {
            name: "undercut".into(),
            base: "ninja".into(),
            factor: 0.95,
        }];

        assert!(matches!(build_sources(&configs), Err(Error::UnknownSource(name)) if name == "ninja"));
    }

    #[test]
    fn test_invalid_factor_surfaces() {
        let configs = vec![
            SourceConfig::Fixture { name: "ninja".into(), match_item_name: false, rows: vec![] },
            SourceConfig::Undercut { name: "u".into(), base: "ninja".into(), factor: 0.0 },
        ];

        assert!(matches!(build_sources(&configs), Err(Error::InvalidFactor(_))));
    }
}
