//! Linearize a hydrated [`LegacyConfig`] tree into cascade order.
//!
//! For each config, depth first:
//!
//! 1. everything its `extends` entries linearize to, in declared order
//! 2. the config's own keys (`extends`/`overrides`/`root` already stripped)
//! 3. each of its `overrides`, as independent `files`-scoped fragments
//!
//! The walk is lazy: parents are visited only as the iterator advances.
//! It borrows the tree, so walking it again yields the same sequence.

use crate::extends::{LegacyConfig, Parent};
use crate::types::Fragment;

/// One step of a linearized cascade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CascadeItem<'a> {
    /// A predefined bundle to be expanded by a preset registry.
    Predefined(&'a str),
    Fragment(&'a Fragment),
}

pub struct Cascade<'a> {
    inner: Box<dyn Iterator<Item = CascadeItem<'a>> + 'a>,
}

impl<'a> Iterator for Cascade<'a> {
    type Item = CascadeItem<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl LegacyConfig {
    pub fn cascade(&self) -> Cascade<'_> {
        Cascade {
            inner: linearize(self),
        }
    }
}

fn linearize<'a>(config: &'a LegacyConfig) -> Box<dyn Iterator<Item = CascadeItem<'a>> + 'a> {
    let parents = config.extends.iter().flat_map(
        |parent| -> Box<dyn Iterator<Item = CascadeItem<'a>> + 'a> {
            match parent {
                Parent::Predefined(name) => Box::new(std::iter::once(CascadeItem::Predefined(name))),
                Parent::Config(inner) => linearize(inner),
            }
        },
    );
    let own = std::iter::once(CascadeItem::Fragment(&config.body));
    let overrides = config.overrides.iter().map(CascadeItem::Fragment);
    Box::new(parents.chain(own).chain(overrides))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extends::ExtendsResolver;
    use crate::fixtures::test::{MemoryLoader, fragment};
    use std::path::Path;

    fn tag(item: &CascadeItem<'_>) -> String {
        match item {
            CascadeItem::Predefined(name) => name.to_string(),
            CascadeItem::Fragment(f) => f
                .get("name")
                .and_then(|v| v.as_str())
                .unwrap_or("<anon>")
                .to_string(),
        }
    }

    fn tree() -> LegacyConfig {
        let loader = MemoryLoader::new()
            .with(
                "/p/base.toml",
                "extends = \"./core.toml\"\nname = \"base\"\n[[overrides]]\nfiles = [\"*.ts\"]\nname = \"base-ts\"",
            )
            .with("/p/core.toml", "name = \"core\"");
        ExtendsResolver::new(&loader)
            .hydrate(
                fragment(
                    "extends = [\"./base.toml\", \"builtin:recommended\"]\nroot = true\nname = \"leaf\"\n[[overrides]]\nfiles = [\"*.test.js\"]\nname = \"leaf-test\"",
                ),
                Path::new("/p"),
            )
            .unwrap()
    }

    #[test]
    fn parents_then_self_then_overrides() {
        let tree = tree();
        let order: Vec<String> = tree.cascade().map(|i| tag(&i)).collect();
        assert_eq!(
            order,
            vec![
                "core",
                "base",
                "base-ts",
                "builtin:recommended",
                "leaf",
                "leaf-test"
            ]
        );
    }

    #[test]
    fn legacy_keys_never_appear() {
        let tree = tree();
        for item in tree.cascade() {
            if let CascadeItem::Fragment(f) = item {
                assert!(!f.contains_key("extends"));
                assert!(!f.contains_key("overrides"));
                assert!(!f.contains_key("root"));
            }
        }
    }

    #[test]
    fn cascade_is_restartable() {
        let tree = tree();
        let first: Vec<CascadeItem<'_>> = tree.cascade().collect();
        let second: Vec<CascadeItem<'_>> = tree.cascade().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn overrides_keep_their_scope() {
        let tree = tree();
        let scoped: Vec<&Fragment> = tree
            .cascade()
            .filter_map(|item| match item {
                CascadeItem::Fragment(f) if f.contains_key("files") => Some(f),
                _ => None,
            })
            .collect();
        assert_eq!(scoped.len(), 2);
    }

    #[test]
    fn lone_config_yields_itself() {
        let config = LegacyConfig {
            body: fragment("name = \"only\""),
            ..LegacyConfig::default()
        };
        let items: Vec<String> = config.cascade().map(|i| tag(&i)).collect();
        assert_eq!(items, vec!["only"]);
    }
}
