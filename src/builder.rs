use std::path::PathBuf;
use std::sync::Arc;

use crate::array::ConfigArray;
use crate::matcher::{GlobMatcher, GlobsetMatcher};
use crate::schema::MergeSchema;
use crate::types::{ConfigEntry, Validation};

/// Builder for a [`ConfigArray`].
///
/// Controls four independent settings:
///
/// - **Entries**: [`entry()`](Self::entry) appends config sources in cascade
///   order (first = lowest precedence). A list passed here is spread into
///   the top level; deeper lists stay nested until `normalize`.
/// - **Base path**: [`base_path()`](Self::base_path), where relative file
///   paths are measured from.
/// - **Schema**: [`schema()`](Self::schema) or [`validation()`](Self::validation):
///   which keys exist and how strictly they are checked.
/// - **Matcher**: [`matcher()`](Self::matcher), the glob engine.
pub struct ConfigArrayBuilder {
    entries: Vec<ConfigEntry>,
    base_path: PathBuf,
    schema: Option<MergeSchema>,
    validation: Option<Validation>,
    matcher: Option<Arc<dyn GlobMatcher>>,
}

impl Default for ConfigArrayBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigArrayBuilder {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            base_path: PathBuf::new(),
            schema: None,
            validation: None,
            matcher: None,
        }
    }

    /// Append a config source.
    pub fn entry<E: Into<ConfigEntry>>(mut self, entry: E) -> Self {
        match entry.into() {
            ConfigEntry::Nested(entries) => self.entries.extend(entries),
            other => self.entries.push(other),
        }
        self
    }

    /// Append several config sources, in order.
    pub fn entries<I, E>(self, entries: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<ConfigEntry>,
    {
        entries.into_iter().fold(self, |b, e| b.entry(e))
    }

    pub fn base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = path.into();
        self
    }

    /// Replace the default schema (built-in strategies, strict).
    pub fn schema(mut self, schema: MergeSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Set the validation mode. Takes precedence over the mode of a schema
    /// passed to [`schema()`](Self::schema).
    pub fn validation(mut self, mode: Validation) -> Self {
        self.validation = Some(mode);
        self
    }

    pub fn matcher<M: GlobMatcher + 'static>(mut self, matcher: M) -> Self {
        self.matcher = Some(Arc::new(matcher));
        self
    }

    pub fn build(self) -> ConfigArray {
        let mut schema = self.schema.unwrap_or_default();
        if let Some(mode) = self.validation {
            schema = schema.with_validation(mode);
        }
        ConfigArray {
            entries: self.entries,
            base_path: self.base_path,
            schema: Arc::new(schema),
            matcher: self
                .matcher
                .unwrap_or_else(|| Arc::new(GlobsetMatcher::new()) as Arc<dyn GlobMatcher>),
        }
    }
}
