use std::collections::BTreeMap;

/// Mapping of source name to enabled flag, as exposed to callers.
pub type EnabledState = BTreeMap<String, bool>;

/// The subset of configured sources allowed to take part in aggregation.
///
/// Never empty: an update that would disable every source re-enables all.
#[derive(Clone, Debug, PartialEq)]
pub struct EnabledSources {
    configured: Vec<String>,
    enabled: BTreeMap<String, bool>,
}

impl EnabledSources {
    /// All configured sources start enabled.
    pub fn all(configured: &[String]) -> Self {
        let mut unique = Vec::with_capacity(configured.len());
        for name in configured {
            if !unique.contains(name) {
                unique.push(name.clone());
            }
        }
        let enabled = unique.iter().map(|n| (n.clone(), true)).collect();
        EnabledSources {
            configured: unique,
            enabled,
        }
    }

    /// Applies `requested`: a source stays enabled unless explicitly mapped to
    /// `false`. Entries for unknown sources are ignored.
    ///
    /// Returns `true` if the request would have emptied the set and the
    /// all-enabled fallback was applied instead.
    pub fn apply(&mut self, requested: &EnabledState) -> bool {
        let mut any_enabled = false;
        for name in &self.configured {
            let on = requested.get(name).copied().unwrap_or(true);
            any_enabled |= on;
            self.enabled.insert(name.clone(), on);
        }

        if !any_enabled {
            for flag in self.enabled.values_mut() {
                *flag = true;
            }
            return true;
        }
        false
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.enabled.get(name).copied().unwrap_or(false)
    }

    pub fn state(&self) -> EnabledState {
        self.enabled.clone()
    }

    pub fn enabled_count(&self) -> usize {
        self.enabled.values().filter(|on| **on).count()
    }
}
