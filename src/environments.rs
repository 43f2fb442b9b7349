//! Read-only lookups into an environment table.
//!
//! An environment is a named bundle of predefined globals (and optionally
//! parser options) such as `browser` or `node`. The table itself is owned
//! by the host and handed in through [`ConfigContext`](crate::ConfigContext).
//!
//! ```toml
//! [node.globals]
//! require = "readonly"
//! process = "readonly"
//!
//! [node.parserOptions]
//! ecmaVersion = 2022
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use toml::Table;

use crate::error::FlatcfgError;

/// Full definition record of one environment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    #[serde(default)]
    pub globals: Table,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parser_options: Option<Table>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnvironmentTable(BTreeMap<String, Environment>);

impl EnvironmentTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration.
    pub fn with(mut self, name: &str, env: Environment) -> Self {
        self.0.insert(name.to_string(), env);
        self
    }

    /// Parse a table of environments from TOML text. `path` is only used
    /// for error reporting.
    pub fn from_toml_str(content: &str, path: &Path) -> Result<Self, FlatcfgError> {
        toml::from_str(content).map_err(|e| FlatcfgError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// The global bindings an environment defines.
    pub fn env_globals(&self, name: &str) -> Result<&Table, FlatcfgError> {
        self.env_config(name).map(|env| &env.globals)
    }

    /// The full definition record of an environment.
    pub fn env_config(&self, name: &str) -> Result<&Environment, FlatcfgError> {
        self.0
            .get(name)
            .ok_or_else(|| FlatcfgError::UnknownEnvironment(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENVS: &str = r#"
[node.globals]
require = "readonly"
process = "readonly"

[node.parserOptions]
ecmaVersion = 2022

[browser.globals]
window = "readonly"
document = "readonly"
"#;

    fn table() -> EnvironmentTable {
        EnvironmentTable::from_toml_str(ENVS, Path::new("envs.toml")).unwrap()
    }

    #[test]
    fn globals_lookup() {
        let envs = table();
        let globals = envs.env_globals("node").unwrap();
        assert_eq!(globals["require"].as_str(), Some("readonly"));
        assert_eq!(globals.len(), 2);
    }

    #[test]
    fn full_record_lookup() {
        let envs = table();
        let node = envs.env_config("node").unwrap();
        let opts = node.parser_options.as_ref().unwrap();
        assert_eq!(opts["ecmaVersion"].as_integer(), Some(2022));
        assert!(envs.env_config("browser").unwrap().parser_options.is_none());
    }

    #[test]
    fn unknown_environment_errors() {
        let err = table().env_globals("deno").unwrap_err();
        assert!(matches!(err, FlatcfgError::UnknownEnvironment(name) if name == "deno"));
    }

    #[test]
    fn malformed_table_reports_path() {
        let err = EnvironmentTable::from_toml_str("node = 1", Path::new("/x/envs.toml"))
            .unwrap_err();
        assert!(err.to_string().contains("/x/envs.toml"));
    }

    #[test]
    fn names_are_sorted() {
        let envs = table();
        assert_eq!(envs.names().collect::<Vec<_>>(), vec!["browser", "node"]);
    }
}
