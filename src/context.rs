use toml::{Table, Value};

use crate::environments::EnvironmentTable;

/// Explicit context handed to every generator entry during normalization.
///
/// Holds the lookups the host would otherwise keep in process-wide state, so
/// independent resolutions in one process never observe each other.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigContext {
    environments: EnvironmentTable,
    settings: Table,
}

impl ConfigContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_environments(mut self, environments: EnvironmentTable) -> Self {
        self.environments = environments;
        self
    }

    /// Attach an opaque host setting. The core never reads these.
    pub fn with_setting<V: Into<Value>>(mut self, key: &str, value: V) -> Self {
        self.settings.insert(key.to_string(), value.into());
        self
    }

    pub fn environments(&self) -> &EnvironmentTable {
        &self.environments
    }

    pub fn setting(&self, key: &str) -> Option<&Value> {
        self.settings.get(key)
    }
}
