//! Per-file resolution: match fragments against a path and fold them.
//!
//! Operates on an already-normalized [`ConfigArray`] with no I/O. Steps:
//!
//! 1. Validate each fragment against the schema (any failure aborts)
//! 2. Keep fragments whose `files`/`ignores` match the path, measured from
//!    the fragment's `baseDirectory` when it has one, else the array's base
//! 3. Left-fold the kept fragments through [`MergeSchema::merge`](crate::MergeSchema::merge),
//!    starting from an empty table
//!
//! An empty match set gives an empty config, not an error.

use std::path::{Component, Path, PathBuf};

use toml::Table;

use crate::array::ConfigArray;
use crate::error::{FlatcfgError, SchemaError};
use crate::types::{EffectiveConfig, FILES, Fragment, IGNORES};
use crate::validate;

pub fn resolve(array: &ConfigArray, file_path: &Path) -> Result<EffectiveConfig, FlatcfgError> {
    let anchored = anchor(file_path, &array.base_path);
    let invalid = |index: usize, source: SchemaError| FlatcfgError::InvalidFragment {
        index,
        base_path: array.base_path.clone(),
        source,
    };

    // 1-2: validate everything, keep matches in order
    let mut matching: Vec<(usize, &Fragment)> = Vec::new();
    for (index, entry) in array.entries.iter().enumerate() {
        let fragment = entry
            .as_fragment()
            .ok_or(FlatcfgError::NotNormalized { index })?;
        array
            .schema
            .validate_fragment(fragment)
            .map_err(|e| invalid(index, e))?;

        let matched = fragment_matches(array, fragment, &anchored).map_err(|e| match e {
            FlatcfgError::Schema(source) => invalid(index, source),
            other => other,
        })?;
        tracing::trace!(index, path = %anchored.display(), matched, "config match");
        if matched {
            matching.push((index, fragment));
        }
    }

    // 3: strict left-to-right fold
    let mut result = Table::new();
    for (index, fragment) in matching {
        result = array
            .schema
            .merge(result, fragment)
            .map_err(|e| invalid(index, e))?;
    }
    Ok(result)
}

/// A fragment without `files` matches every path.
fn fragment_matches(
    array: &ConfigArray,
    fragment: &Fragment,
    file_path: &Path,
) -> Result<bool, FlatcfgError> {
    let Some(files) = fragment.get(FILES) else {
        return Ok(true);
    };
    let path = match fragment.base_directory() {
        Some(dir) => relative_path(file_path, &dir),
        None => relative_path(file_path, &array.base_path),
    };
    let files = validate::patterns(FILES, files)?;
    let ignores = match fragment.get(IGNORES) {
        Some(value) => validate::patterns(IGNORES, value)?,
        None => Vec::new(),
    };
    array.matcher.matches(&path, &files, &ignores)
}

/// Join a base-relative `file_path` onto `base_path`. Absolute paths, and
/// any path when there is no base, are kept as given.
fn anchor(file_path: &Path, base_path: &Path) -> PathBuf {
    if file_path.is_relative() && !base_path.as_os_str().is_empty() {
        base_path.join(file_path)
    } else {
        file_path.to_path_buf()
    }
}

/// Express `file_path` relative to `base_path` when it lies underneath it.
/// `.` segments are dropped, so `./src/a.ts` and `src/a.ts` match alike.
fn relative_path(file_path: &Path, base_path: &Path) -> PathBuf {
    let relative = if base_path.as_os_str().is_empty() {
        file_path
    } else {
        file_path.strip_prefix(base_path).unwrap_or(file_path)
    };
    relative
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}
