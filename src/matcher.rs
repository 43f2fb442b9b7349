//! Glob matching of file paths against `files`/`ignores` pattern lists.
//!
//! Matching sits behind the [`GlobMatcher`] trait so hosts can plug in their
//! own engine. The default [`GlobsetMatcher`] uses `globset` with these rules:
//!
//! - A pattern without `/` is matched against the file's base name, so
//!   `*.ts` matches `src/app.ts`.
//! - A pattern with `/` is matched against the whole base-relative path,
//!   with `*` stopping at separators and `**` crossing them.
//! - A leading `./` on a pattern is ignored.
//! - Dotfiles are not special.
//!
//! Each distinct pattern is compiled once and cached for the matcher's
//! lifetime. Arrays derived from one another (e.g. by `normalize`) share
//! their matcher, and with it the cache.

use std::path::Path;

use dashmap::DashMap;
use globset::{GlobBuilder, GlobMatcher as CompiledGlob};

use crate::error::FlatcfgError;

pub trait GlobMatcher: Send + Sync {
    /// `true` when `path` matches at least one of `files` and none of `ignores`.
    fn matches(&self, path: &Path, files: &[&str], ignores: &[&str]) -> Result<bool, FlatcfgError>;
}

#[derive(Debug, Clone, Default)]
pub struct GlobsetMatcher {
    compiled: DashMap<String, CompiledGlob>,
}

impl GlobsetMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct patterns compiled so far.
    pub fn cached_patterns(&self) -> usize {
        self.compiled.len()
    }

    fn any_match(&self, path: &Path, patterns: &[&str]) -> Result<bool, FlatcfgError> {
        let full = path.to_string_lossy().replace('\\', "/");
        let base = full.rsplit('/').next().unwrap_or(&full);

        for raw in patterns {
            let pattern = raw.strip_prefix("./").unwrap_or(raw);
            let target = if pattern.contains('/') {
                full.as_str()
            } else {
                base
            };
            if self.is_match(pattern, target)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn is_match(&self, pattern: &str, target: &str) -> Result<bool, FlatcfgError> {
        if let Some(glob) = self.compiled.get(pattern) {
            return Ok(glob.is_match(target));
        }
        let glob = compile(pattern)?;
        let matched = glob.is_match(target);
        self.compiled.insert(pattern.to_string(), glob);
        Ok(matched)
    }
}

impl GlobMatcher for GlobsetMatcher {
    fn matches(&self, path: &Path, files: &[&str], ignores: &[&str]) -> Result<bool, FlatcfgError> {
        if !self.any_match(path, files)? {
            return Ok(false);
        }
        Ok(!self.any_match(path, ignores)?)
    }
}

fn compile(pattern: &str) -> Result<CompiledGlob, FlatcfgError> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|source| FlatcfgError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
}
