//! Locating and reading fragments referenced by `extends`.
//!
//! The core only needs [`FragmentLoader`]: given a reference and the location
//! to resolve it against, return the fragment and where it came from. The
//! bundled [`FileLoader`] reads fragment files from disk.
//!
//! # File lookup
//!
//! A reference is joined onto `relative_to` (absolute references are used
//! as is). Candidates are tried in order, first hit wins:
//!
//! 1. the path itself
//! 2. the path with `.toml` appended
//! 3. the path with `.json` appended
//!
//! A missing candidate is skipped; any other I/O error is propagated. Files
//! ending in `.json` are parsed as JSON, everything else as TOML. A loaded
//! fragment that has no `baseDirectory` gets the directory of its file.
//!
//! JSON fragments must be objects. TOML has no null, so a `null` anywhere in
//! a JSON fragment is a [`FlatcfgError::ParseError`] naming the key path
//! (e.g. `rules.semi`).

use std::path::{Path, PathBuf};

use toml::{Table, Value};

use crate::error::FlatcfgError;
use crate::types::{BASE_DIRECTORY, Fragment};

/// A fragment together with the location it was loaded from. The location
/// identifies the fragment for cycle detection.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedFragment {
    pub location: PathBuf,
    pub fragment: Fragment,
}

pub trait FragmentLoader {
    fn load(&self, reference: &str, relative_to: &Path) -> Result<LoadedFragment, FlatcfgError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FileLoader;

impl FragmentLoader for FileLoader {
    fn load(&self, reference: &str, relative_to: &Path) -> Result<LoadedFragment, FlatcfgError> {
        let base = relative_to.join(reference);
        for candidate in candidates(&base) {
            match std::fs::read_to_string(&candidate) {
                Ok(content) => return parse_loaded(candidate, &content),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(FlatcfgError::IoError {
                        path: candidate,
                        source: e,
                    });
                }
            }
        }
        Err(FlatcfgError::load_failure(
            reference,
            format!("no config file at {}", base.display()),
        ))
    }
}

fn candidates(base: &Path) -> Vec<PathBuf> {
    let mut out = vec![base.to_path_buf()];
    for ext in ["toml", "json"] {
        let mut with_ext = base.as_os_str().to_owned();
        with_ext.push(".");
        with_ext.push(ext);
        out.push(PathBuf::from(with_ext));
    }
    out
}

fn parse_loaded(path: PathBuf, content: &str) -> Result<LoadedFragment, FlatcfgError> {
    let mut fragment = parse_fragment(&path, content)?;
    let location = std::fs::canonicalize(&path).unwrap_or(path);
    if !fragment.contains_key(BASE_DIRECTORY)
        && let Some(dir) = location.parent()
    {
        fragment.insert(BASE_DIRECTORY, dir.to_string_lossy().into_owned());
    }
    Ok(LoadedFragment { location, fragment })
}

/// Parse fragment text, choosing JSON or TOML by file extension.
pub fn parse_fragment(path: &Path, content: &str) -> Result<Fragment, FlatcfgError> {
    let parse_error = |reason: String| FlatcfgError::ParseError {
        path: path.to_path_buf(),
        reason,
    };
    let table: Table = if path.extension().is_some_and(|ext| ext == "json") {
        let json: serde_json::Value =
            serde_json::from_str(content).map_err(|e| parse_error(e.to_string()))?;
        match json_to_toml(json, "").map_err(parse_error)? {
            Value::Table(table) => table,
            _ => return Err(parse_error("expected a JSON object at the top level".into())),
        }
    } else {
        toml::from_str(content).map_err(|e| parse_error(e.to_string()))?
    };
    Ok(Fragment::from(table))
}

fn json_to_toml(value: serde_json::Value, key: &str) -> Result<Value, String> {
    use serde_json::Value as Json;

    Ok(match value {
        Json::Null => return Err(format!("`{key}` is null, which TOML cannot represent")),
        Json::Bool(b) => Value::Boolean(b),
        Json::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Value::Integer(i),
            (None, Some(f)) => Value::Float(f),
            (None, None) => return Err(format!("`{key}` is not a representable number")),
        },
        Json::String(s) => Value::String(s),
        Json::Array(items) => Value::Array(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| json_to_toml(item, &format!("{key}[{i}]")))
                .collect::<Result<_, _>>()?,
        ),
        Json::Object(map) => Value::Table(
            map.into_iter()
                .map(|(k, v)| {
                    let path = if key.is_empty() { k.clone() } else { format!("{key}.{k}") };
                    json_to_toml(v, &path).map(|v| (k, v))
                })
                .collect::<Result<_, _>>()?,
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn loads_toml_relative_to_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("base.toml"), "[rules]\nsemi = 2\n").unwrap();

        let loaded = FileLoader.load("./base.toml", dir.path()).unwrap();
        assert_eq!(loaded.fragment.get("rules").unwrap()["semi"].as_integer(), Some(2));
        assert!(loaded.location.ends_with("base.toml"));
    }

    #[test]
    fn loads_json_by_extension() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("base.json"),
            r#"{"rules": {"quotes": ["error", "double"]}, "globals": {"x": true}}"#,
        )
        .unwrap();

        let loaded = FileLoader.load("base.json", dir.path()).unwrap();
        let quotes = &loaded.fragment.get("rules").unwrap()["quotes"];
        assert_eq!(quotes.as_array().unwrap().len(), 2);
        assert_eq!(loaded.fragment.get("globals").unwrap()["x"].as_bool(), Some(true));
    }

    #[test]
    fn json_null_names_the_key() {
        let err = parse_fragment(
            Path::new("base.json"),
            r#"{"rules": {"semi": null, "quotes": ["error", null]}}"#,
        )
        .unwrap_err();
        match err {
            FlatcfgError::ParseError { reason, .. } => {
                assert!(reason.contains("`rules.quotes[1]`") || reason.contains("`rules.semi`"));
            }
            other => panic!("Expected ParseError, got: {other:?}"),
        }

        let err = parse_fragment(Path::new("base.json"), r#"{"globals": {"x": null}}"#).unwrap_err();
        assert!(err.to_string().contains("`globals.x`"));
    }

    #[test]
    fn json_top_level_must_be_an_object() {
        let err = parse_fragment(Path::new("base.json"), "[1, 2]").unwrap_err();
        assert!(matches!(err, FlatcfgError::ParseError { .. }));
    }

    #[test]
    fn appends_extension_when_missing() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("base.config.toml"), "[globals]\ny = false\n").unwrap();

        let loaded = FileLoader.load("./base.config", dir.path()).unwrap();
        assert!(loaded.location.ends_with("base.config.toml"));
    }

    #[test]
    fn exact_path_wins_over_appended_extension() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("base"), "[rules]\nfrom = 1\n").unwrap();
        fs::write(dir.path().join("base.toml"), "[rules]\nfrom = 2\n").unwrap();

        let loaded = FileLoader.load("base", dir.path()).unwrap();
        assert_eq!(loaded.fragment.get("rules").unwrap()["from"].as_integer(), Some(1));
    }

    #[test]
    fn sets_base_directory_to_file_parent() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("shared");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("base.toml"), "[rules]\n").unwrap();

        let loaded = FileLoader.load("shared/base.toml", dir.path()).unwrap();
        let base_dir = loaded.fragment.base_directory().unwrap();
        assert!(base_dir.ends_with("shared"));
    }

    #[test]
    fn keeps_declared_base_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("base.toml"), "baseDirectory = \"/elsewhere\"\n").unwrap();

        let loaded = FileLoader.load("base.toml", dir.path()).unwrap();
        assert_eq!(loaded.fragment.base_directory(), Some(PathBuf::from("/elsewhere")));
    }

    #[test]
    fn missing_file_is_load_failure() {
        let dir = TempDir::new().unwrap();
        let err = FileLoader.load("./nope", dir.path()).unwrap_err();
        assert!(matches!(err, FlatcfgError::LoadFailure { reference, .. } if reference == "./nope"));
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("bad.toml"), "rules = [\n").unwrap();

        let err = FileLoader.load("bad.toml", dir.path()).unwrap_err();
        match err {
            FlatcfgError::ParseError { path, .. } => assert!(path.ends_with("bad.toml")),
            other => panic!("Expected ParseError, got: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_file_returns_io_error() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("base.toml");
        fs::write(&file_path, "[rules]\n").unwrap();
        fs::set_permissions(&file_path, fs::Permissions::from_mode(0o000)).unwrap();

        let result = FileLoader.load("base.toml", dir.path());
        fs::set_permissions(&file_path, fs::Permissions::from_mode(0o644)).unwrap();

        // root can read anything; only assert when the read was refused
        if let Err(err) = result {
            assert!(matches!(err, FlatcfgError::IoError { .. }));
        }
    }
}
