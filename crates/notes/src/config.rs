use serde::{Deserialize, Serialize};

use repoatlas_storage::{paths, Repository, StorageAdapter};

use crate::error::{NoteError, Result};

/// Per-repository limits and policy. Loaded from `config.json` on every
/// operation; nothing is cached across calls, so external edits take
/// effect on the next call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub tags: TagPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    #[serde(default = "default_max_note_length")]
    pub max_note_length: usize,
    #[serde(default = "default_max_tag_description_length")]
    pub max_tag_description_length: usize,
    #[serde(default = "default_max_tags_per_note")]
    pub max_tags_per_note: usize,
    #[serde(default = "default_max_anchors_per_note")]
    pub max_anchors_per_note: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagPolicy {
    #[serde(default)]
    pub enforce_allowed_tags: bool,
}

fn default_max_note_length() -> usize {
    10_000
}

fn default_max_tag_description_length() -> usize {
    2_000
}

fn default_max_tags_per_note() -> usize {
    10
}

fn default_max_anchors_per_note() -> usize {
    20
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_note_length: default_max_note_length(),
            max_tag_description_length: default_max_tag_description_length(),
            max_tags_per_note: default_max_tags_per_note(),
            max_anchors_per_note: default_max_anchors_per_note(),
        }
    }
}

impl RepositoryConfig {
    /// Reads the configuration document, falling back to defaults when
    /// the repository has none yet.
    pub fn load(repo: &Repository) -> Result<Self> {
        let path = paths::config_path(repo.root());
        if !repo.adapter().exists(&path) {
            return Ok(RepositoryConfig::default());
        }
        let raw = repo.adapter().read_file(&path)?;
        serde_json::from_str(&raw).map_err(|source| NoteError::Malformed {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn save(&self, repo: &Repository) -> Result<()> {
        let path = paths::config_path(repo.root());
        let raw = serde_json::to_string_pretty(self).map_err(|source| NoteError::Malformed {
            path: path.display().to_string(),
            source,
        })?;
        repo.adapter().write_file(&path, &raw)?;
        Ok(())
    }
}
