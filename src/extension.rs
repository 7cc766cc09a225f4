//! The seam to the host: making a resolved file available to the running process.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, info};

use crate::error::InstallError;

#[cfg(windows)]
pub const PATH_SEPARATOR: &str = ";";
#[cfg(not(windows))]
pub const PATH_SEPARATOR: &str = ":";

/// Appends a file to the host's search path for dynamically loaded code.
///
/// Implementations are shared by reference and must serialize mutations themselves.
pub trait ExtensionLoader: Send + Sync {
    fn install(&self, path: &Path) -> Result<(), InstallError>;
}

impl <T: ExtensionLoader + ?Sized> ExtensionLoader for &T {
    fn install(&self, path: &Path) -> Result<(), InstallError> {
        (**self).install(path)
    }
}

/// An ordered search path that the host reads after loading, e.g. to start a process with it.
#[derive(Debug, Default)]
pub struct SearchPath {
    entries: Mutex<Vec<PathBuf>>,
}
impl SearchPath {
    pub fn new() -> SearchPath {
        Default::default()
    }

    pub fn entries(&self) -> Vec<PathBuf> {
        match self.entries.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// the entries joined with the platform's path separator
    pub fn to_path_string(&self) -> OsString {
        let mut result = OsString::new();
        for (idx, entry) in self.entries().iter().enumerate() {
            if idx > 0 {
                result.push(PATH_SEPARATOR);
            }
            result.push(entry);
        }
        result
    }
}

impl ExtensionLoader for SearchPath {
    fn install(&self, path: &Path) -> Result<(), InstallError> {
        if !path.is_file() {
            return Err(InstallError::Missing { path: path.to_path_buf() });
        }
        let path = path.canonicalize()
            .map_err(|e| InstallError::Rejected { path: path.to_path_buf(), reason: e.to_string() })?;

        let mut entries = self.entries.lock()
            .map_err(|_| InstallError::Rejected { path: path.clone(), reason: "search path lock is poisoned".to_string() })?;

        if entries.contains(&path) {
            debug!("{} is on the search path already", path.display());
        }
        else {
            info!("adding {} to the search path", path.display());
            entries.push(path);
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_install_appends_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.jar");
        let b = dir.path().join("b.jar");
        std::fs::write(&a, b"a").unwrap();
        std::fs::write(&b, b"b").unwrap();

        let search_path = SearchPath::new();
        search_path.install(&b).unwrap();
        search_path.install(&a).unwrap();
        search_path.install(&b).unwrap();

        let entries = search_path.entries();
        assert_eq!(entries, vec![b.canonicalize().unwrap(), a.canonicalize().unwrap()]);

        let expected = format!("{}{}{}", entries[0].display(), PATH_SEPARATOR, entries[1].display());
        assert_eq!(search_path.to_path_string().to_string_lossy(), expected);
    }

    #[test]
    fn test_install_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let search_path = SearchPath::new();

        assert!(matches!(search_path.install(&dir.path().join("missing.jar")), Err(InstallError::Missing { .. })));
        assert!(matches!(search_path.install(dir.path()), Err(InstallError::Missing { .. })));
        assert!(search_path.entries().is_empty());
        assert!(search_path.to_path_string().is_empty());
    }
}
