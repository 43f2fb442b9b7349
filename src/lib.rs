//! Cascading, glob-scoped configuration for static-analysis tools.
//!
//! A tool's setup is a list of partial configs ("fragments"). Each fragment
//! may be scoped to certain files with glob patterns. To configure one file,
//! flatcfg keeps the fragments that match it and merges them in order, later
//! fragments winning.
//!
//! ```ignore
//! let array = ConfigArray::new(
//!     vec![
//!         "[globals]\nwindow = \"readonly\"".parse::<Fragment>()?,
//!         "files = [\"*.ts\"]\n[rules]\nsemi = \"error\"".parse()?,
//!     ],
//!     "/project",
//! );
//! let config = array.get_config("/project/src/app.ts")?;
//! ```
//!
//! # Fragments
//!
//! A [`Fragment`] is a TOML table. The keys the core knows:
//!
//! | Key | Meaning | In output? |
//! |-----|---------|------------|
//! | `files` | inclusion globs; absent = every file | no |
//! | `ignores` | exclusion globs; needs `files` | no |
//! | `globals` | identifier → descriptor | yes, merged |
//! | `rules` | rule name → severity/options | yes, merged |
//! | `baseDirectory` | where relative references and patterns resolve | no |
//!
//! `globals` and `rules` merge as a shallow union: on a collision the later
//! fragment's entry wins, other entries survive. Hosts register more keys
//! with [`MergeSchema::define_strategy`].
//!
//! # Config sources
//!
//! A raw source is a tree of [`ConfigEntry`] values:
//!
//! - **`Static`**: a realized fragment.
//! - **`Dynamic`**: a generator, a pure function of a [`ConfigContext`]
//!   returning one fragment or a list of them.
//! - **`Nested`**: a list of entries, inlined where it stands.
//!
//! [`ConfigArray::normalize`] evaluates every generator once and flattens
//! the tree, returning a new array. The raw array stays as it was, so the
//! same source can be normalized again for another context. Normalizing an
//! already-flat array changes nothing.
//!
//! # Resolution
//!
//! [`ConfigArray::get_config`] validates every fragment, keeps those whose
//! `files` match the path and whose `ignores` don't, and folds them left to
//! right through the [`MergeSchema`]. No match means an empty config. A
//! single malformed fragment fails the whole call with its index and the
//! offending key.
//!
//! Paths under the array's base path are matched relative to it, or relative
//! to a fragment's own `baseDirectory` when it declares one. A pattern
//! without `/` matches the file's base name (`*.ts` matches `src/app.ts`);
//! a pattern with `/` matches the relative path.
//!
//! # Strictness
//!
//! Validation is **strict by default**: unknown keys fail with
//! [`SchemaError::UnknownKey`] and pattern lists must be arrays of strings.
//! [`Validation::Permissive`] lets unknown keys through (later value wins)
//! and accepts a bare string as a pattern list. Either way, `globals` and
//! `rules` must be tables and `ignores` needs `files`.
//!
//! # Legacy configs
//!
//! Older configs compose through `extends` (a reference, an inline fragment,
//! or a list of either) and path-scoped `overrides`. [`ExtendsResolver`]
//! hydrates such a config into a [`LegacyConfig`] tree: file references load
//! through a [`FragmentLoader`] relative to the referencing config's
//! directory, and references starting with `builtin:` are kept as opaque
//! names. [`LegacyConfig::cascade`] walks the tree lazily into cascade order
//! (parents, then the config itself, then its overrides), and
//! [`import_legacy`] wires the whole pipeline into a [`ConfigArray`],
//! expanding predefined names through a [`PresetRegistry`].
//!
//! # Error handling
//!
//! All fallible operations return [`FlatcfgError`]. Schema problems carry a
//! [`SchemaError`] naming the key; loader failures propagate unchanged.
//!
//! # Logging
//!
//! Normalization, hydration, and preset expansion emit `tracing` events at
//! `debug`; per-fragment match decisions at `trace`. Install a subscriber to
//! see them.

pub mod error;
pub mod types;

mod array;
mod builder;
mod context;
mod environments;
mod extends;
mod flatten;
mod import;
mod loader;
mod matcher;
pub mod merge;
mod resolve;
mod schema;
pub mod validate;

#[cfg(test)]
mod fixtures;

pub use array::ConfigArray;
pub use builder::ConfigArrayBuilder;
pub use context::ConfigContext;
pub use environments::{Environment, EnvironmentTable};
pub use error::{FlatcfgError, SchemaError};
pub use extends::{DEFAULT_PREDEFINED_PREFIX, ExtendsEntry, ExtendsResolver, LegacyConfig, Parent};
pub use flatten::{Cascade, CascadeItem};
pub use import::{PresetRegistry, Presets, import_legacy, legacy_fragments};
pub use loader::{FileLoader, FragmentLoader, LoadedFragment, parse_fragment};
pub use matcher::{GlobMatcher, GlobsetMatcher};
pub use schema::{MergeSchema, Strategy};
pub use types::{ConfigEntry, EffectiveConfig, Fragment, Generated, Generator, Validation};
