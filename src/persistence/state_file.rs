use std::fs;
use std::path::{Path, PathBuf};
use crate::error::{Error, Result};
use crate::price_infra::aggregator::EnabledStateCallback;
use crate::price_infra::enabled::EnabledState;

/// JSON file holding the enabled-source mapping across restarts.
#[derive(Clone, Debug)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        StateFile { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file yields an empty mapping (every source enabled).
    pub fn load(&self) -> Result<EnabledState> {
        match fs::read_to_string(&self.path) {
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                Error::PersistenceError(format!("{}: {}", self.path.display(), e))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(EnabledState::new()),
            Err(e) => Err(Error::IoError(e)),
        }
    }

    /// Writes through a sibling temp file and renames it into place.
    pub fn save(&self, state: &EnabledState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let payload = serde_json::to_string_pretty(state)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, payload)?;
        fs::rename(&tmp, &self.path)?;
        tracing::debug!("Enabled-state saved to {}", self.path.display());
        Ok(())
    }

    /// Callback for `MultiSourcePriceService::on_enabled_change`.
    pub fn callback(&self) -> EnabledStateCallback {
        let store = self.clone();
        Box::new(move |state: &EnabledState| store.save(state))
    }
}
