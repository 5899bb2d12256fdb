use std::collections::BTreeMap;
use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod loader;
pub mod sources;

pub use loader::AppConfig;
pub use sources::{build_sources, SourceConfig};

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct AggregatorConfig {
    /// Worker pool size; defaults to min(8, source count).
    #[serde(default)]
    pub max_workers: Option<usize>,
    #[serde(default)]
    pub arbitration: bool,
    /// Static fields merged into every structured event.
    #[serde(default)]
    pub log_context: BTreeMap<String, String>,
    /// Where the enabled-source mapping is persisted, if anywhere.
    #[serde(default)]
    pub state_file: Option<PathBuf>,
}

impl AggregatorConfig {
    pub fn log_context_map(&self) -> Map<String, Value> {
        self.log_context
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect()
    }
}
