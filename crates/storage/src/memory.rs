use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::adapter::StorageAdapter;
use crate::error::Result;

/// In-memory adapter for tests. Paths are kept verbatim, so callers must
/// use the same absolute-path convention they would on disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    files: BTreeMap<PathBuf, String>,
    dirs: BTreeSet<PathBuf>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a bare directory, e.g. a repo marker like `.git`.
    pub fn add_dir(&self, path: &Path) {
        let mut inner = self.inner.lock().expect("memory store poisoned");
        inner.dirs.insert(path.to_path_buf());
    }
}

impl StorageAdapter for MemoryStore {
    fn exists(&self, path: &Path) -> bool {
        let inner = self.inner.lock().expect("memory store poisoned");
        if inner.files.contains_key(path) || inner.dirs.contains(path) {
            return true;
        }
        // A directory exists implicitly once anything lives under it.
        inner
            .files
            .keys()
            .chain(inner.dirs.iter())
            .any(|p| p.starts_with(path) && p != path)
    }

    fn read_file(&self, path: &Path) -> Result<String> {
        let inner = self.inner.lock().expect("memory store poisoned");
        inner.files.get(path).cloned().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no such file: {}", path.display()),
            )
            .into()
        })
    }

    fn write_file(&self, path: &Path, content: &str) -> Result<()> {
        let mut inner = self.inner.lock().expect("memory store poisoned");
        inner.files.insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        let mut inner = self.inner.lock().expect("memory store poisoned");
        inner.dirs.insert(path.to_path_buf());
        Ok(())
    }

    fn delete_file(&self, path: &Path) -> Result<bool> {
        let mut inner = self.inner.lock().expect("memory store poisoned");
        Ok(inner.files.remove(path).is_some())
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<String>> {
        let inner = self.inner.lock().expect("memory store poisoned");
        let mut names: Vec<String> = inner
            .files
            .keys()
            .filter_map(|p| {
                if p.parent() == Some(path) {
                    p.file_name().and_then(|n| n.to_str()).map(String::from)
                } else {
                    None
                }
            })
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn files_round_trip() {
        let store = MemoryStore::new();
        let path = Path::new("/repo/.repoatlas/notes.json");
        store.write_file(path, "[]").expect("write");
        assert_eq!(store.read_file(path).expect("read"), "[]");
        assert!(store.exists(path));
    }

    #[test]
    fn parent_dirs_exist_implicitly() {
        let store = MemoryStore::new();
        store
            .write_file(Path::new("/repo/.repoatlas/tags/api.md"), "")
            .expect("write");
        assert!(store.exists(Path::new("/repo/.repoatlas")));
        assert!(store.exists(Path::new("/repo/.repoatlas/tags")));
        assert!(!store.exists(Path::new("/repo/.repoatlas/views")));
    }

    #[test]
    fn read_dir_lists_direct_children_only() {
        let store = MemoryStore::new();
        store
            .write_file(Path::new("/repo/.repoatlas/views/main.json"), "{}")
            .expect("write");
        store
            .write_file(Path::new("/repo/.repoatlas/views/alt.json"), "{}")
            .expect("write");
        store
            .write_file(Path::new("/repo/.repoatlas/notes.json"), "[]")
            .expect("write");

        let names = store
            .read_dir(Path::new("/repo/.repoatlas/views"))
            .expect("read_dir");
        assert_eq!(names, vec!["alt.json".to_string(), "main.json".to_string()]);
    }
}
