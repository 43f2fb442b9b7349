//! Shape validators for fragment values.
//!
//! Each validator checks one key's value. Dependencies between keys and
//! unknown-key handling live in [`MergeSchema`](crate::MergeSchema), which
//! runs these per key.

use toml::Value;

use crate::error::SchemaError;
use crate::types::Validation;

pub type ValidateFn = fn(&str, &Value, Validation) -> Result<(), SchemaError>;

pub fn any(_key: &str, _value: &Value, _mode: Validation) -> Result<(), SchemaError> {
    Ok(())
}

/// Map-like values (`globals`, `rules`).
pub fn table(key: &str, value: &Value, _mode: Validation) -> Result<(), SchemaError> {
    match value {
        Value::Table(_) => Ok(()),
        _ => Err(wrong_type(key, "a table")),
    }
}

pub fn string(key: &str, value: &Value, _mode: Validation) -> Result<(), SchemaError> {
    match value {
        Value::String(_) => Ok(()),
        _ => Err(wrong_type(key, "a string")),
    }
}

pub fn boolean(key: &str, value: &Value, _mode: Validation) -> Result<(), SchemaError> {
    match value {
        Value::Boolean(_) => Ok(()),
        _ => Err(wrong_type(key, "a boolean")),
    }
}

/// Glob pattern lists (`files`, `ignores`). Strict mode wants an array of
/// strings; permissive mode skips the check and leaves it to matching.
pub fn pattern_list(key: &str, value: &Value, mode: Validation) -> Result<(), SchemaError> {
    match mode {
        Validation::Strict => match value {
            Value::Array(items) if items.iter().all(Value::is_str) => Ok(()),
            _ => Err(wrong_type(key, "an array of strings")),
        },
        Validation::Permissive => Ok(()),
    }
}

/// Read a pattern list for matching. A bare string counts as a one-element
/// list; anything else that isn't an array of strings is a type error.
pub fn patterns<'a>(key: &str, value: &'a Value) -> Result<Vec<&'a str>, SchemaError> {
    match value {
        Value::String(s) => Ok(vec![s.as_str()]),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().ok_or_else(|| wrong_type(key, "an array of strings")))
            .collect(),
        _ => Err(wrong_type(key, "an array of strings")),
    }
}

fn wrong_type(key: &str, expected: &'static str) -> SchemaError {
    SchemaError::WrongType {
        key: key.to_string(),
        expected,
    }
}
