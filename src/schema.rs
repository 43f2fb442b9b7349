//! The merge schema: per-key strategies for combining and checking values.
//!
//! Every recognized key maps to one immutable [`Strategy`]. Built-ins:
//!
//! | Key | Merge | Shape |
//! |-----|-------|-------|
//! | `files` | no output | pattern list |
//! | `ignores` | no output, requires `files` | pattern list |
//! | `globals` | shallow union, later wins | table |
//! | `rules` | shallow union, later wins | table |
//! | `baseDirectory` | no output | string |
//!
//! Keys without a strategy are rejected in [`Validation::Strict`] and merged
//! by plain overwrite in [`Validation::Permissive`].

use std::collections::BTreeMap;

use toml::Value;

use crate::error::SchemaError;
use crate::merge::{self, MergeFn};
use crate::types::{
    BASE_DIRECTORY, EffectiveConfig, FILES, Fragment, GLOBALS, IGNORES, RULES, Validation,
};
use crate::validate::{self, ValidateFn};

/// How one key merges and what shape its value must have.
#[derive(Debug, Clone)]
pub struct Strategy {
    name: String,
    merge: MergeFn,
    validate: ValidateFn,
    requires: Vec<String>,
    required: bool,
}

impl Strategy {
    pub fn new(name: &str, merge: MergeFn, validate: ValidateFn) -> Self {
        Self {
            name: name.to_string(),
            merge,
            validate,
            requires: Vec::new(),
            required: false,
        }
    }

    /// Declare that this key is only valid next to `key` in the same fragment.
    pub fn requires(mut self, key: &str) -> Self {
        self.requires.push(key.to_string());
        self
    }

    /// Declare that every fragment must carry this key.
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dependencies(&self) -> &[String] {
        &self.requires
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn merge(&self, base: Option<&Value>, overlay: &Value) -> Option<Value> {
        (self.merge)(base, overlay)
    }
}

#[derive(Debug, Clone)]
pub struct MergeSchema {
    strategies: BTreeMap<String, Strategy>,
    mode: Validation,
}

impl Default for MergeSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl MergeSchema {
    /// A strict schema with the built-in strategies registered.
    pub fn new() -> Self {
        let mut schema = Self::empty();
        for strategy in builtin_strategies() {
            schema.strategies.insert(strategy.name.clone(), strategy);
        }
        schema
    }

    /// A strict schema with no strategies at all.
    pub fn empty() -> Self {
        Self {
            strategies: BTreeMap::new(),
            mode: Validation::Strict,
        }
    }

    pub fn with_validation(mut self, mode: Validation) -> Self {
        self.mode = mode;
        self
    }

    pub fn validation(&self) -> Validation {
        self.mode
    }

    /// Register a strategy. Registered strategies cannot be replaced.
    pub fn define_strategy(&mut self, strategy: Strategy) -> Result<(), SchemaError> {
        if self.strategies.contains_key(&strategy.name) {
            return Err(SchemaError::DuplicateStrategy {
                key: strategy.name.clone(),
            });
        }
        self.strategies.insert(strategy.name.clone(), strategy);
        Ok(())
    }

    pub fn strategy(&self, key: &str) -> Option<&Strategy> {
        self.strategies.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.strategies.keys().map(String::as_str)
    }

    /// Check one key's value, including its declared dependencies on other
    /// keys of the same fragment.
    pub fn validate(&self, key: &str, value: &Value, fragment: &Fragment) -> Result<(), SchemaError> {
        let Some(strategy) = self.strategies.get(key) else {
            return match self.mode {
                Validation::Strict => Err(SchemaError::UnknownKey {
                    key: key.to_string(),
                }),
                Validation::Permissive => Ok(()),
            };
        };

        (strategy.validate)(key, value, self.mode)?;

        if let Some(missing) = strategy
            .requires
            .iter()
            .find(|dep| !fragment.contains_key(dep))
        {
            return Err(SchemaError::MissingDependency {
                key: key.to_string(),
                requires: missing.clone(),
            });
        }
        Ok(())
    }

    /// Check every key of a fragment, then that required keys are present.
    pub fn validate_fragment(&self, fragment: &Fragment) -> Result<(), SchemaError> {
        for (key, value) in fragment.iter() {
            self.validate(key, value, fragment)?;
        }
        if let Some(missing) = self
            .strategies
            .values()
            .find(|s| s.required && !fragment.contains_key(&s.name))
        {
            return Err(SchemaError::MissingRequired {
                key: missing.name.clone(),
            });
        }
        Ok(())
    }

    /// Fold one fragment into an accumulated result.
    ///
    /// Keys absent from `fragment` are left alone. A strategy that yields no
    /// value removes the key from the result.
    pub fn merge(
        &self,
        mut result: EffectiveConfig,
        fragment: &Fragment,
    ) -> Result<EffectiveConfig, SchemaError> {
        for (key, value) in fragment.iter() {
            let merged = match (self.strategies.get(key.as_str()), self.mode) {
                (Some(strategy), _) => strategy.merge(result.get(key), value),
                (None, Validation::Permissive) => merge::overwrite(result.get(key), value),
                (None, Validation::Strict) => {
                    return Err(SchemaError::UnknownKey { key: key.clone() });
                }
            };
            match merged {
                Some(v) => {
                    result.insert(key.clone(), v);
                }
                None => {
                    result.remove(key);
                }
            }
        }
        Ok(result)
    }
}

fn builtin_strategies() -> Vec<Strategy> {
    vec![
        Strategy::new(FILES, merge::suppress, validate::pattern_list),
        Strategy::new(IGNORES, merge::suppress, validate::pattern_list).requires(FILES),
        Strategy::new(GLOBALS, merge::assign, validate::table),
        Strategy::new(RULES, merge::assign, validate::table),
        Strategy::new(BASE_DIRECTORY, merge::suppress, validate::string),
    ]
}
