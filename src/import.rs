//! Importing a legacy config as a ready-to-query [`ConfigArray`].
//!
//! Pipeline: load the named config, hydrate its `extends` tree, linearize it,
//! expand predefined references through a [`PresetRegistry`], and collect the
//! result as the array's entries.

use std::collections::BTreeMap;
use std::path::Path;

use crate::array::ConfigArray;
use crate::error::FlatcfgError;
use crate::extends::{ExtendsResolver, LegacyConfig};
use crate::flatten::CascadeItem;
use crate::types::Fragment;

/// Expands predefined references (e.g. `builtin:recommended`) into fragments.
pub trait PresetRegistry {
    fn resolve(&self, name: &str) -> Option<Vec<Fragment>>;
}

/// A fixed, in-memory preset table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Presets(BTreeMap<String, Vec<Fragment>>);

impl Presets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, fragments: Vec<Fragment>) -> Self {
        self.0.insert(name.to_string(), fragments);
        self
    }
}

impl PresetRegistry for Presets {
    fn resolve(&self, name: &str) -> Option<Vec<Fragment>> {
        self.0.get(name).cloned()
    }
}

/// Linearize a hydrated tree into plain fragments, expanding presets in place.
pub fn legacy_fragments(
    config: &LegacyConfig,
    presets: &dyn PresetRegistry,
) -> Result<Vec<Fragment>, FlatcfgError> {
    let mut out = Vec::new();
    for item in config.cascade() {
        match item {
            CascadeItem::Fragment(fragment) => out.push(fragment.clone()),
            CascadeItem::Predefined(name) => {
                let expanded = presets
                    .resolve(name)
                    .ok_or_else(|| FlatcfgError::UnknownPreset(name.to_string()))?;
                tracing::debug!(preset = name, fragments = expanded.len(), "expanded preset");
                out.extend(expanded);
            }
        }
    }
    Ok(out)
}

/// Load `reference` relative to `base_path` and turn it into a config array
/// whose base path is `base_path`.
pub fn import_legacy(
    resolver: &ExtendsResolver<'_>,
    reference: &str,
    base_path: &Path,
    presets: &dyn PresetRegistry,
) -> Result<ConfigArray, FlatcfgError> {
    let tree = resolver.load(reference, base_path)?;
    let fragments = legacy_fragments(&tree, presets)?;
    tracing::debug!(
        reference,
        base_path = %base_path.display(),
        fragments = fragments.len(),
        "imported legacy config"
    );
    Ok(ConfigArray::builder()
        .entries(fragments)
        .base_path(base_path)
        .build())
}
