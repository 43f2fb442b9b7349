//! Hydration of legacy `extends` + `overrides` configs.
//!
//! A legacy config composes itself from parents named in `extends` and adds
//! path-scoped `overrides`:
//!
//! ```toml
//! extends = ["./base.toml", "builtin:recommended"]
//! root = true
//!
//! [rules]
//! semi = "error"
//!
//! [[overrides]]
//! files = ["*.test.js"]
//! [overrides.globals]
//! describe = "readonly"
//! ```
//!
//! [`ExtendsResolver::hydrate`] turns that into a [`LegacyConfig`] tree.
//! Each `extends` entry becomes either an opaque [`Parent::Predefined`]
//! reference (anything starting with the predefined prefix, `builtin:` by
//! default) or a [`Parent::Config`] loaded through a
//! [`FragmentLoader`] and hydrated recursively against its *own* base
//! directory, so relative references keep working through every level.
//!
//! Parents load one at a time in declared order. A chain that revisits a
//! location fails with [`FlatcfgError::CircularExtends`].
//!
//! Overrides and inline parents that don't declare a `baseDirectory` take
//! their config's, so their `files` patterns stay anchored where they were
//! written.

use std::path::{Path, PathBuf};

use toml::Value;

use crate::error::{FlatcfgError, SchemaError};
use crate::loader::{FragmentLoader, LoadedFragment};
use crate::types::{BASE_DIRECTORY, EXTENDS, FILES, Fragment, OVERRIDES, ROOT};

pub const DEFAULT_PREDEFINED_PREFIX: &str = "builtin:";

/// One raw `extends` value: a reference, an inline fragment, or a list.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtendsEntry {
    Reference(String),
    Inline(Fragment),
    List(Vec<ExtendsEntry>),
}

impl ExtendsEntry {
    pub fn from_value(value: &Value) -> Result<Self, SchemaError> {
        match value {
            Value::String(s) => Ok(ExtendsEntry::Reference(s.clone())),
            Value::Table(t) => Ok(ExtendsEntry::Inline(Fragment::from(t.clone()))),
            Value::Array(items) => items
                .iter()
                .map(Self::from_value)
                .collect::<Result<Vec<_>, _>>()
                .map(ExtendsEntry::List),
            _ => Err(SchemaError::WrongType {
                key: EXTENDS.to_string(),
                expected: "a string, a table, or an array of them",
            }),
        }
    }
}

/// A hydrated `extends` entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Parent {
    /// A predefined bundle, left for an external preset registry.
    Predefined(String),
    Config(Box<LegacyConfig>),
}

/// A hydrated legacy config: its parents, its own keys, and its overrides.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyConfig {
    /// Where the config was loaded from; `None` for inline configs.
    pub location: Option<PathBuf>,
    /// Hydrated `extends`, in declared order.
    pub extends: Vec<Parent>,
    /// Every key other than `extends`, `overrides`, and `root`.
    pub body: Fragment,
    /// Scoped overrides, in declared order. Each carries `files`.
    pub overrides: Vec<Fragment>,
    pub root: bool,
}

impl LegacyConfig {
    /// Predefined references anywhere in the tree, depth first.
    pub fn predefined_references(&self) -> Vec<&str> {
        let mut out = Vec::new();
        collect_predefined(self, &mut out);
        out
    }
}

fn collect_predefined<'a>(config: &'a LegacyConfig, out: &mut Vec<&'a str>) {
    for parent in &config.extends {
        match parent {
            Parent::Predefined(name) => out.push(name),
            Parent::Config(inner) => collect_predefined(inner, out),
        }
    }
}

pub struct ExtendsResolver<'a> {
    loader: &'a dyn FragmentLoader,
    predefined_prefix: String,
}

impl<'a> ExtendsResolver<'a> {
    pub fn new(loader: &'a dyn FragmentLoader) -> Self {
        Self {
            loader,
            predefined_prefix: DEFAULT_PREDEFINED_PREFIX.to_string(),
        }
    }

    /// Override the namespace token marking predefined references.
    pub fn predefined_prefix(mut self, prefix: &str) -> Self {
        self.predefined_prefix = prefix.to_string();
        self
    }

    pub fn is_predefined(&self, reference: &str) -> bool {
        reference.starts_with(&self.predefined_prefix)
    }

    pub fn loader(&self) -> &dyn FragmentLoader {
        self.loader
    }

    /// Hydrate `fragment`, resolving its references against its own
    /// `baseDirectory` or, failing that, `relative_to`.
    pub fn hydrate(&self, fragment: Fragment, relative_to: &Path) -> Result<LegacyConfig, FlatcfgError> {
        self.hydrate_at(fragment, relative_to, None, &mut Vec::new())
    }

    /// Hydrate a fragment that came from a loader, seeding cycle detection
    /// with its location.
    pub fn hydrate_loaded(&self, loaded: LoadedFragment) -> Result<LegacyConfig, FlatcfgError> {
        let relative_to = match loaded.fragment.base_directory() {
            Some(dir) => dir,
            None => parent_dir(&loaded.location),
        };
        let mut chain = vec![loaded.location.clone()];
        self.hydrate_at(loaded.fragment, &relative_to, Some(loaded.location), &mut chain)
    }

    /// Load `reference` relative to `relative_to` and hydrate it.
    pub fn load(&self, reference: &str, relative_to: &Path) -> Result<LegacyConfig, FlatcfgError> {
        let loaded = self.loader.load(reference, relative_to)?;
        self.hydrate_loaded(loaded)
    }

    fn hydrate_at(
        &self,
        mut fragment: Fragment,
        relative_to: &Path,
        location: Option<PathBuf>,
        chain: &mut Vec<PathBuf>,
    ) -> Result<LegacyConfig, FlatcfgError> {
        let declared = fragment.base_directory();
        let relative_to = declared
            .clone()
            .unwrap_or_else(|| relative_to.to_path_buf());
        let invalid = |source: SchemaError| FlatcfgError::InvalidLegacyConfig {
            location: location.clone().unwrap_or_else(|| relative_to.clone()),
            source,
        };

        let extends = match fragment.remove(EXTENDS) {
            Some(value) => vec![ExtendsEntry::from_value(&value).map_err(invalid)?],
            None => Vec::new(),
        };
        let mut overrides = match fragment.remove(OVERRIDES) {
            Some(value) => parse_overrides(&value).map_err(invalid)?,
            None => Vec::new(),
        };
        if let Some(dir) = &declared {
            for scoped in &mut overrides {
                inherit_base_directory(scoped, dir);
            }
        }
        let root = match fragment.remove(ROOT) {
            Some(Value::Boolean(b)) => b,
            Some(_) => {
                return Err(invalid(SchemaError::WrongType {
                    key: ROOT.to_string(),
                    expected: "a boolean",
                }));
            }
            None => false,
        };

        let mut parents = Vec::new();
        self.hydrate_entries(extends, &relative_to, declared.as_deref(), chain, &mut parents)?;

        Ok(LegacyConfig {
            location,
            extends: parents,
            body: fragment,
            overrides,
            root,
        })
    }

    fn hydrate_entries(
        &self,
        entries: Vec<ExtendsEntry>,
        relative_to: &Path,
        base_directory: Option<&Path>,
        chain: &mut Vec<PathBuf>,
        out: &mut Vec<Parent>,
    ) -> Result<(), FlatcfgError> {
        for entry in entries {
            match entry {
                ExtendsEntry::List(nested) => {
                    self.hydrate_entries(nested, relative_to, base_directory, chain, out)?;
                }
                ExtendsEntry::Reference(name) if self.is_predefined(&name) => {
                    tracing::debug!(reference = %name, "keeping predefined config reference");
                    out.push(Parent::Predefined(name));
                }
                ExtendsEntry::Reference(name) => {
                    tracing::debug!(
                        reference = %name,
                        relative_to = %relative_to.display(),
                        "hydrating extended config"
                    );
                    let loaded = self.loader.load(&name, relative_to)?;
                    if chain.contains(&loaded.location) {
                        let mut cycle: Vec<String> =
                            chain.iter().map(|p| p.display().to_string()).collect();
                        cycle.push(loaded.location.display().to_string());
                        return Err(FlatcfgError::CircularExtends { chain: cycle });
                    }
                    let own_base = loaded
                        .fragment
                        .base_directory()
                        .unwrap_or_else(|| parent_dir(&loaded.location));

                    chain.push(loaded.location.clone());
                    let hydrated =
                        self.hydrate_at(loaded.fragment, &own_base, Some(loaded.location), chain);
                    chain.pop();
                    out.push(Parent::Config(Box::new(hydrated?)));
                }
                ExtendsEntry::Inline(mut fragment) => {
                    if let Some(dir) = base_directory {
                        inherit_base_directory(&mut fragment, dir);
                    }
                    let hydrated = self.hydrate_at(fragment, relative_to, None, chain)?;
                    out.push(Parent::Config(Box::new(hydrated)));
                }
            }
        }
        Ok(())
    }
}

fn inherit_base_directory(fragment: &mut Fragment, dir: &Path) {
    if !fragment.contains_key(BASE_DIRECTORY) {
        fragment.insert(BASE_DIRECTORY, dir.to_string_lossy().into_owned());
    }
}

fn parent_dir(location: &Path) -> PathBuf {
    location
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default()
}

/// `overrides` must be an array of tables, each scoped by `files`, none of
/// which nest further `extends` or `overrides`.
fn parse_overrides(value: &Value) -> Result<Vec<Fragment>, SchemaError> {
    let wrong_type = || SchemaError::WrongType {
        key: OVERRIDES.to_string(),
        expected: "an array of tables",
    };
    let Value::Array(items) = value else {
        return Err(wrong_type());
    };
    items
        .iter()
        .map(|item| {
            let Value::Table(table) = item else {
                return Err(wrong_type());
            };
            if let Some(key) = [EXTENDS, OVERRIDES, ROOT]
                .into_iter()
                .find(|key| table.contains_key(*key))
            {
                return Err(SchemaError::NotAllowedInOverride {
                    key: key.to_string(),
                });
            }
            if !table.contains_key(FILES) {
                return Err(SchemaError::MissingRequired {
                    key: FILES.to_string(),
                });
            }
            Ok(Fragment::from(table.clone()))
        })
        .collect()
}
