//! Core value types: fragments, raw config entries, and validation modes.
//!
//! A [`Fragment`] is one partial configuration. A raw config source is a tree
//! of [`ConfigEntry`] values: realized fragments, generators evaluated against
//! a [`ConfigContext`], and nested lists. [`ConfigArray::normalize`](crate::ConfigArray::normalize)
//! flattens that tree into plain fragments.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use toml::{Table, Value};

use crate::context::ConfigContext;
use crate::error::FlatcfgError;

/// Inclusion glob patterns. Absent means "every file".
pub const FILES: &str = "files";
/// Exclusion glob patterns. Only valid next to `files`.
pub const IGNORES: &str = "ignores";
pub const GLOBALS: &str = "globals";
pub const RULES: &str = "rules";
/// Location that the fragment's relative references resolve against.
pub const BASE_DIRECTORY: &str = "baseDirectory";
// Legacy-only keys, stripped by hydration.
pub const EXTENDS: &str = "extends";
pub const OVERRIDES: &str = "overrides";
pub const ROOT: &str = "root";

/// The merged result for one file. Never contains `files` or `ignores`.
pub type EffectiveConfig = Table;

/// One partial, independently authored piece of configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fragment(Table);

impl Fragment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with<V: Into<Value>>(mut self, key: &str, value: V) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert<V: Into<Value>>(&mut self, key: &str, value: V) -> Option<Value> {
        self.0.insert(key.to_string(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_table(&self) -> &Table {
        &self.0
    }

    pub fn into_table(self) -> Table {
        self.0
    }

    /// The fragment's own base location, when it declares one.
    pub fn base_directory(&self) -> Option<PathBuf> {
        self.0
            .get(BASE_DIRECTORY)
            .and_then(Value::as_str)
            .map(PathBuf::from)
    }
}

impl From<Table> for Fragment {
    fn from(table: Table) -> Self {
        Fragment(table)
    }
}

impl From<Fragment> for Table {
    fn from(fragment: Fragment) -> Self {
        fragment.0
    }
}

impl std::str::FromStr for Fragment {
    type Err = toml::de::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<Table>().map(Fragment)
    }
}

/// What a generator produces: one fragment or an ordered list of them.
#[derive(Debug, Clone, PartialEq)]
pub enum Generated {
    One(Fragment),
    Many(Vec<Fragment>),
}

impl From<Fragment> for Generated {
    fn from(fragment: Fragment) -> Self {
        Generated::One(fragment)
    }
}

impl From<Vec<Fragment>> for Generated {
    fn from(fragments: Vec<Fragment>) -> Self {
        Generated::Many(fragments)
    }
}

impl Generated {
    pub fn into_fragments(self) -> Vec<Fragment> {
        match self {
            Generated::One(fragment) => vec![fragment],
            Generated::Many(fragments) => fragments,
        }
    }
}

pub type Generator =
    Arc<dyn Fn(&ConfigContext) -> Result<Generated, FlatcfgError> + Send + Sync + 'static>;

/// One raw entry of a config source.
#[derive(Clone)]
pub enum ConfigEntry {
    /// An already-realized fragment.
    Static(Fragment),
    /// A pure function of the context, evaluated once by `normalize`.
    Dynamic(Generator),
    /// A nested list, inlined at its position by `normalize`.
    Nested(Vec<ConfigEntry>),
}

impl ConfigEntry {
    /// Wrap an infallible generator.
    pub fn generator<F, R>(f: F) -> Self
    where
        F: Fn(&ConfigContext) -> R + Send + Sync + 'static,
        R: Into<Generated>,
    {
        ConfigEntry::Dynamic(Arc::new(move |ctx| Ok(f(ctx).into())))
    }

    /// Wrap a generator that may fail, e.g. because it loads a reference.
    pub fn try_generator<F, R>(f: F) -> Self
    where
        F: Fn(&ConfigContext) -> Result<R, FlatcfgError> + Send + Sync + 'static,
        R: Into<Generated>,
    {
        ConfigEntry::Dynamic(Arc::new(move |ctx| f(ctx).map(Into::into)))
    }

    pub fn as_fragment(&self) -> Option<&Fragment> {
        match self {
            ConfigEntry::Static(fragment) => Some(fragment),
            _ => None,
        }
    }
}

impl fmt::Debug for ConfigEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigEntry::Static(fragment) => f.debug_tuple("Static").field(fragment).finish(),
            ConfigEntry::Dynamic(_) => f.write_str("Dynamic(<generator>)"),
            ConfigEntry::Nested(entries) => f.debug_tuple("Nested").field(entries).finish(),
        }
    }
}

impl From<Fragment> for ConfigEntry {
    fn from(fragment: Fragment) -> Self {
        ConfigEntry::Static(fragment)
    }
}

impl From<Vec<ConfigEntry>> for ConfigEntry {
    fn from(entries: Vec<ConfigEntry>) -> Self {
        ConfigEntry::Nested(entries)
    }
}

impl From<Vec<Fragment>> for ConfigEntry {
    fn from(fragments: Vec<Fragment>) -> Self {
        ConfigEntry::Nested(fragments.into_iter().map(ConfigEntry::Static).collect())
    }
}

/// How strictly fragments are checked against the merge schema.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Validation {
    /// Unknown keys are errors; `files`/`ignores` must be arrays of strings.
    #[default]
    Strict,
    /// Unknown keys pass through with overwrite semantics; `files`/`ignores`
    /// may also be a single string. Table-typed keys and key dependencies
    /// are still checked.
    Permissive,
}
