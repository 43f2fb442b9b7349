//! The config array: an ordered list of config entries plus a base path.
//!
//! Order is meaningful: on conflict, later fragments win. A raw array may
//! hold generators and nested lists; [`ConfigArray::normalize`] realizes them
//! into a new, flat array without touching the original, so the same raw
//! array can be normalized again under a different context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::builder::ConfigArrayBuilder;
use crate::context::ConfigContext;
use crate::error::FlatcfgError;
use crate::matcher::GlobMatcher;
use crate::resolve;
use crate::schema::MergeSchema;
use crate::types::{ConfigEntry, EffectiveConfig, Fragment};

#[derive(Clone)]
pub struct ConfigArray {
    pub(crate) entries: Vec<ConfigEntry>,
    pub(crate) base_path: PathBuf,
    pub(crate) schema: Arc<MergeSchema>,
    pub(crate) matcher: Arc<dyn GlobMatcher>,
}

impl std::fmt::Debug for ConfigArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigArray")
            .field("entries", &self.entries)
            .field("base_path", &self.base_path)
            .field("validation", &self.schema.validation())
            .finish()
    }
}

impl ConfigArray {
    /// Build an array with the default strict schema and glob matcher.
    ///
    /// `configs` may be a single fragment, a list of fragments, or any
    /// [`ConfigEntry`] tree.
    pub fn new<E: Into<ConfigEntry>>(configs: E, base_path: impl Into<PathBuf>) -> Self {
        Self::builder().entry(configs).base_path(base_path).build()
    }

    pub fn builder() -> ConfigArrayBuilder {
        ConfigArrayBuilder::new()
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn schema(&self) -> &MergeSchema {
        &self.schema
    }

    pub fn entries(&self) -> &[ConfigEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `true` when every entry is a realized fragment.
    pub fn is_normalized(&self) -> bool {
        self.entries
            .iter()
            .all(|entry| matches!(entry, ConfigEntry::Static(_)))
    }

    /// Realized fragments, in order. Unrealized entries are skipped.
    pub fn fragments(&self) -> impl Iterator<Item = &Fragment> {
        self.entries.iter().filter_map(ConfigEntry::as_fragment)
    }

    /// Flatten nested lists and evaluate generators, in order.
    ///
    /// Each generator runs exactly once against `context`. Returns a new
    /// array; `self` is left as it was.
    pub fn normalize(&self, context: &ConfigContext) -> Result<ConfigArray, FlatcfgError> {
        let mut flat = Vec::with_capacity(self.entries.len());
        let mut generators = 0;
        flatten_into(&self.entries, context, &mut flat, &mut generators)?;
        tracing::debug!(
            base_path = %self.base_path.display(),
            fragments = flat.len(),
            generators,
            "normalized config array"
        );
        Ok(ConfigArray {
            entries: flat.into_iter().map(ConfigEntry::Static).collect(),
            base_path: self.base_path.clone(),
            schema: Arc::clone(&self.schema),
            matcher: Arc::clone(&self.matcher),
        })
    }

    /// Validate every realized fragment against the schema up front.
    pub fn validate(&self) -> Result<(), FlatcfgError> {
        for (index, entry) in self.entries.iter().enumerate() {
            let fragment = entry
                .as_fragment()
                .ok_or(FlatcfgError::NotNormalized { index })?;
            self.schema
                .validate_fragment(fragment)
                .map_err(|source| FlatcfgError::InvalidFragment {
                    index,
                    base_path: self.base_path.clone(),
                    source,
                })?;
        }
        Ok(())
    }

    /// The effective configuration for one file: every matching fragment,
    /// folded in order.
    pub fn get_config(&self, file_path: impl AsRef<Path>) -> Result<EffectiveConfig, FlatcfgError> {
        resolve::resolve(self, file_path.as_ref())
    }
}

fn flatten_into(
    entries: &[ConfigEntry],
    context: &ConfigContext,
    out: &mut Vec<Fragment>,
    generators: &mut usize,
) -> Result<(), FlatcfgError> {
    for entry in entries {
        match entry {
            ConfigEntry::Static(fragment) => out.push(fragment.clone()),
            ConfigEntry::Nested(nested) => flatten_into(nested, context, out, generators)?,
            ConfigEntry::Dynamic(generator) => {
                *generators += 1;
                out.extend(generator(context)?.into_fragments());
            }
        }
    }
    Ok(())
}
