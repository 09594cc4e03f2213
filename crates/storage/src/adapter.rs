use std::path::Path;

use crate::error::Result;

/// Synchronous file-system surface the stores run against.
///
/// Every read and write of repository metadata goes through this trait;
/// nothing above it touches the disk directly, so tests can swap in
/// [`crate::MemoryStore`] and exercise the full stack in-process.
pub trait StorageAdapter: Send + Sync {
    fn exists(&self, path: &Path) -> bool;

    fn read_file(&self, path: &Path) -> Result<String>;

    /// Replaces the file contents wholesale. Parent directories are
    /// created as needed.
    fn write_file(&self, path: &Path, content: &str) -> Result<()>;

    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Returns false when the file was already absent.
    fn delete_file(&self, path: &Path) -> Result<bool>;

    /// File names (not full paths) of directory entries, sorted.
    /// An absent directory reads as empty.
    fn read_dir(&self, path: &Path) -> Result<Vec<String>>;

    fn is_absolute(&self, path: &Path) -> bool {
        path.is_absolute()
    }
}
