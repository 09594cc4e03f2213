use std::path::{Path, PathBuf};

use crate::adapter::StorageAdapter;

pub const ATLAS_DIR_NAME: &str = ".repoatlas";
pub const GIT_DIR_NAME: &str = ".git";

pub const NOTES_FILE_NAME: &str = "notes.json";
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const VIEWS_DIR_NAME: &str = "views";
pub const TAGS_DIR_NAME: &str = "tags";

/// Reserved view id under which the repository's default view is aliased.
pub const DEFAULT_VIEW_ID: &str = "default";

#[must_use]
pub fn atlas_dir_for_repo_root(root: &Path) -> PathBuf {
    root.join(ATLAS_DIR_NAME)
}

#[must_use]
pub fn notes_path(root: &Path) -> PathBuf {
    atlas_dir_for_repo_root(root).join(NOTES_FILE_NAME)
}

#[must_use]
pub fn config_path(root: &Path) -> PathBuf {
    atlas_dir_for_repo_root(root).join(CONFIG_FILE_NAME)
}

#[must_use]
pub fn views_dir(root: &Path) -> PathBuf {
    atlas_dir_for_repo_root(root).join(VIEWS_DIR_NAME)
}

#[must_use]
pub fn view_path(root: &Path, view_id: &str) -> PathBuf {
    views_dir(root).join(format!("{}.json", safe_file_component(view_id)))
}

#[must_use]
pub fn tags_dir(root: &Path) -> PathBuf {
    atlas_dir_for_repo_root(root).join(TAGS_DIR_NAME)
}

#[must_use]
pub fn tag_path(root: &Path, tag: &str) -> PathBuf {
    tags_dir(root).join(format!("{}.md", safe_file_component(tag)))
}

/// Maps an id or tag onto a stable file-name-safe form.
#[must_use]
pub fn safe_file_component(value: &str) -> String {
    value
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Walks up from `start` looking for a repository marker: an existing
/// metadata directory first, a `.git` directory as fallback.
#[must_use]
pub fn find_repo_root(adapter: &dyn StorageAdapter, start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        if adapter.exists(&dir.join(ATLAS_DIR_NAME)) {
            return Some(dir.to_path_buf());
        }
        current = dir.parent();
    }

    let mut current = Some(start);
    while let Some(dir) = current {
        if adapter.exists(&dir.join(GIT_DIR_NAME)) {
            return Some(dir.to_path_buf());
        }
        current = dir.parent();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use pretty_assertions::assert_eq;

    #[test]
    fn safe_file_component_keeps_word_chars() {
        assert_eq!(safe_file_component("api-notes_2"), "api-notes_2");
        assert_eq!(safe_file_component("a/b c"), "a_b_c");
    }

    #[test]
    fn tag_path_is_stable_for_odd_tag_names() {
        let root = Path::new("/repo");
        assert_eq!(
            tag_path(root, "needs review!"),
            Path::new("/repo/.repoatlas/tags/needs_review_.md")
        );
    }

    #[test]
    fn find_repo_root_prefers_metadata_dir_over_git() {
        let store = MemoryStore::new();
        store.add_dir(Path::new("/work/repo/.git"));
        store.add_dir(Path::new("/work/repo/nested/.repoatlas"));

        let found = find_repo_root(&store, Path::new("/work/repo/nested/src"));
        assert_eq!(found.as_deref(), Some(Path::new("/work/repo/nested")));
    }

    #[test]
    fn find_repo_root_falls_back_to_git_marker() {
        let store = MemoryStore::new();
        store.add_dir(Path::new("/work/repo/.git"));

        let found = find_repo_root(&store, Path::new("/work/repo/src/api"));
        assert_eq!(found.as_deref(), Some(Path::new("/work/repo")));
    }

    #[test]
    fn find_repo_root_returns_none_without_markers() {
        let store = MemoryStore::new();
        assert_eq!(find_repo_root(&store, Path::new("/nowhere")), None);
    }
}
