use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::adapter::StorageAdapter;
use crate::error::{Result, StorageError};
use crate::paths::find_repo_root;

/// Explicit per-repository handle: an adapter plus the resolved repo root.
///
/// Every store operation takes one of these instead of consulting global
/// state, so two repositories can be driven side by side from one process
/// and every call re-derives its view of the world from storage.
#[derive(Clone)]
pub struct Repository {
    adapter: Arc<dyn StorageAdapter>,
    root: PathBuf,
}

impl Repository {
    /// Wraps an already-known repository root.
    pub fn at_root(adapter: Arc<dyn StorageAdapter>, root: impl Into<PathBuf>) -> Self {
        Repository {
            adapter,
            root: root.into(),
        }
    }

    /// Locates the repository root by walking up from `start`.
    pub fn discover(adapter: Arc<dyn StorageAdapter>, start: &Path) -> Result<Self> {
        let root = find_repo_root(adapter.as_ref(), start).ok_or_else(|| {
            StorageError::InvalidPath(format!(
                "no repository marker found above {}",
                start.display()
            ))
        })?;
        Ok(Repository { adapter, root })
    }

    #[must_use]
    pub fn adapter(&self) -> &dyn StorageAdapter {
        self.adapter.as_ref()
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}
