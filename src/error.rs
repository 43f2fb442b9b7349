use std::path::PathBuf;
use thiserror::Error;

/// A fragment value that does not fit the merge schema.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("Expected key '{key}' to be {expected}")]
    WrongType { key: String, expected: &'static str },

    #[error("Key '{key}' requires key '{requires}' in the same config")]
    MissingDependency { key: String, requires: String },

    #[error("Unknown key '{key}'")]
    UnknownKey { key: String },

    #[error("Missing required key '{key}'")]
    MissingRequired { key: String },

    #[error("Key '{key}' is not allowed inside an override")]
    NotAllowedInOverride { key: String },

    #[error("Key '{key}' already has a registered strategy")]
    DuplicateStrategy { key: String },
}

impl SchemaError {
    /// The offending key.
    pub fn key(&self) -> &str {
        match self {
            SchemaError::WrongType { key, .. }
            | SchemaError::MissingDependency { key, .. }
            | SchemaError::UnknownKey { key }
            | SchemaError::MissingRequired { key }
            | SchemaError::NotAllowedInOverride { key }
            | SchemaError::DuplicateStrategy { key } => key,
        }
    }
}

#[derive(Debug, Error)]
pub enum FlatcfgError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("Invalid config at index {index} (base path '{}'): {source}", base_path.display())]
    InvalidFragment {
        index: usize,
        base_path: PathBuf,
        source: SchemaError,
    },

    #[error("Invalid legacy config at {}: {source}", location.display())]
    InvalidLegacyConfig {
        location: PathBuf,
        source: SchemaError,
    },

    #[error("Config at index {index} is not normalized; call .normalize() first")]
    NotNormalized { index: usize },

    #[error("Invalid glob pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: globset::Error,
    },

    #[error("Failed to load '{reference}': {reason}")]
    LoadFailure { reference: String, reason: String },

    #[error("Failed to read {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Circular extends: {}", chain.join(" -> "))]
    CircularExtends { chain: Vec<String> },

    #[error("Unknown predefined config '{0}'")]
    UnknownPreset(String),

    #[error("Unknown environment '{0}'")]
    UnknownEnvironment(String),
}

impl FlatcfgError {
    /// Wrap a failure reported by a custom [`FragmentLoader`](crate::FragmentLoader).
    pub fn load_failure(reference: &str, reason: impl std::fmt::Display) -> Self {
        FlatcfgError::LoadFailure {
            reference: reference.to_string(),
            reason: reason.to_string(),
        }
    }

    /// The schema error behind this failure, if any.
    pub fn schema_error(&self) -> Option<&SchemaError> {
        match self {
            FlatcfgError::Schema(e)
            | FlatcfgError::InvalidFragment { source: e, .. }
            | FlatcfgError::InvalidLegacyConfig { source: e, .. } => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_fragment_formats_location_and_key() {
        let err = FlatcfgError::InvalidFragment {
            index: 3,
            base_path: "/project".into(),
            source: SchemaError::WrongType {
                key: "rules".into(),
                expected: "a table",
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("index 3"));
        assert!(msg.contains("/project"));
        assert!(msg.contains("rules"));
    }

    #[test]
    fn missing_dependency_names_both_keys() {
        let err = SchemaError::MissingDependency {
            key: "ignores".into(),
            requires: "files".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("ignores"));
        assert!(msg.contains("files"));
        assert_eq!(err.key(), "ignores");
    }

    #[test]
    fn circular_extends_shows_chain() {
        let err = FlatcfgError::CircularExtends {
            chain: vec!["a.toml".into(), "b.toml".into(), "a.toml".into()],
        };
        assert!(err.to_string().contains("a.toml -> b.toml -> a.toml"));
    }

    #[test]
    fn schema_error_is_reachable_through_wrapper() {
        let err = FlatcfgError::from(SchemaError::UnknownKey { key: "typo".into() });
        assert_eq!(err.schema_error().map(SchemaError::key), Some("typo"));
        assert!(FlatcfgError::UnknownPreset("x".into()).schema_error().is_none());
    }
}
