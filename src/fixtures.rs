#[cfg(test)]
pub mod test {
    use std::collections::BTreeMap;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    use toml::Table;

    use crate::error::FlatcfgError;
    use crate::loader::{FragmentLoader, LoadedFragment};
    use crate::types::{BASE_DIRECTORY, Fragment};

    pub fn fragment(toml_str: &str) -> Fragment {
        toml_str.parse().unwrap()
    }

    pub fn table(toml_str: &str) -> Table {
        toml_str.parse().unwrap()
    }

    /// In-memory loader keyed by `relative_to/reference`. Records every load
    /// so tests can check ordering.
    #[derive(Default)]
    pub struct MemoryLoader {
        files: BTreeMap<PathBuf, Fragment>,
        pub loads: Mutex<Vec<PathBuf>>,
    }

    impl MemoryLoader {
        pub fn new() -> Self {
            Self::default()
        }

        /// Register a fragment at an absolute location. Its base directory
        /// is set to the location's parent.
        pub fn with(mut self, location: &str, toml_str: &str) -> Self {
            let location = PathBuf::from(location);
            let mut frag = fragment(toml_str);
            if !frag.contains_key(BASE_DIRECTORY)
                && let Some(dir) = location.parent()
            {
                frag.insert(BASE_DIRECTORY, dir.to_string_lossy().into_owned());
            }
            self.files.insert(location, frag);
            self
        }

        pub fn loaded(&self) -> Vec<PathBuf> {
            self.loads.lock().unwrap().clone()
        }
    }

    impl FragmentLoader for MemoryLoader {
        fn load(&self, reference: &str, relative_to: &Path) -> Result<LoadedFragment, FlatcfgError> {
            let location = normalize(&relative_to.join(reference));
            self.loads.lock().unwrap().push(location.clone());
            let fragment = self
                .files
                .get(&location)
                .cloned()
                .ok_or_else(|| FlatcfgError::load_failure(reference, "no such fragment"))?;
            Ok(LoadedFragment { location, fragment })
        }
    }

    /// Collapse `.` and `..` components without touching the filesystem.
    fn normalize(path: &Path) -> PathBuf {
        use std::path::Component;
        let mut out = PathBuf::new();
        for component in path.components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    out.pop();
                }
                other => out.push(other),
            }
        }
        out
    }

    #[test]
    fn memory_loader_resolves_relative_references() {
        let loader = MemoryLoader::new().with("/p/base.toml", "[rules]\na = 1");
        let loaded = loader.load("./base.toml", Path::new("/p")).unwrap();
        assert_eq!(loaded.location, PathBuf::from("/p/base.toml"));
        assert_eq!(loaded.fragment.base_directory(), Some(PathBuf::from("/p")));

        let up = loader.load("../base.toml", Path::new("/p/sub")).unwrap();
        assert_eq!(up.location, PathBuf::from("/p/base.toml"));
    }

    #[test]
    fn memory_loader_missing_reference_fails() {
        let loader = MemoryLoader::new();
        let err = loader.load("./nope.toml", Path::new("/p")).unwrap_err();
        assert!(matches!(err, FlatcfgError::LoadFailure { reference, .. } if reference == "./nope.toml"));
    }
}
