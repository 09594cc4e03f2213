use repoatlas_storage::{paths, Repository, StorageAdapter};

use crate::config::RepositoryConfig;
use crate::error::{NoteError, Result};
use crate::store::NoteStore;
use crate::types::AllowedTags;

const MAX_TAG_NAME_LEN: usize = 64;

/// Per-repository tag → description mapping, one markdown file per tag.
///
/// The registry records and reports policy; it never blocks note writes
/// itself. [`NoteStore::save_note`] consults [`TagRegistry::allowed_tags`]
/// before persisting.
pub struct TagRegistry {
    repo: Repository,
}

/// Tags double as file names, so the accepted alphabet is the
/// filename-safe one used across the metadata directory.
pub fn validate_tag_name(tag: &str) -> Result<()> {
    if tag.is_empty() {
        return Err(NoteError::Validation("tag must not be empty".to_string()));
    }
    if tag.len() > MAX_TAG_NAME_LEN {
        return Err(NoteError::Validation(format!(
            "tag '{tag}' exceeds {MAX_TAG_NAME_LEN} characters"
        )));
    }
    if !tag
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(NoteError::Validation(format!(
            "tag '{tag}' contains characters outside [A-Za-z0-9_-]"
        )));
    }
    Ok(())
}

impl TagRegistry {
    #[must_use]
    pub fn new(repo: Repository) -> Self {
        TagRegistry { repo }
    }

    /// Creates or replaces a tag's description document.
    pub fn save_tag_description(&self, tag: &str, body: &str) -> Result<()> {
        validate_tag_name(tag)?;
        let config = RepositoryConfig::load(&self.repo)?;
        let limit = config.limits.max_tag_description_length;
        let actual = body.chars().count();
        if actual > limit {
            return Err(NoteError::LimitExceeded {
                what: "tag description length",
                limit,
                actual,
            });
        }
        let path = paths::tag_path(self.repo.root(), tag);
        self.repo.adapter().write_file(&path, body)?;
        Ok(())
    }

    pub fn get_tag_description(&self, tag: &str) -> Result<Option<String>> {
        let path = paths::tag_path(self.repo.root(), tag);
        if !self.repo.adapter().exists(&path) {
            return Ok(None);
        }
        Ok(Some(self.repo.adapter().read_file(&path)?))
    }

    /// Deletes a tag's description. With `cascade_to_notes` the tag token
    /// is also stripped from every note. The return value reports only
    /// whether a description existed, regardless of the cascade outcome.
    pub fn delete_tag_description(&self, tag: &str, cascade_to_notes: bool) -> Result<bool> {
        validate_tag_name(tag)?;
        let path = paths::tag_path(self.repo.root(), tag);
        let existed = self.repo.adapter().delete_file(&path)?;
        if cascade_to_notes {
            let removed = NoteStore::new(self.repo.clone()).remove_tag_from_notes(tag)?;
            log::debug!("cascade removed tag '{tag}' from {removed} notes");
        }
        Ok(existed)
    }

    /// All described tags with their bodies, sorted by tag name.
    pub fn list_tag_descriptions(&self) -> Result<Vec<(String, String)>> {
        let dir = paths::tags_dir(self.repo.root());
        let mut out = Vec::new();
        for name in self.repo.adapter().read_dir(&dir)? {
            let Some(tag) = name.strip_suffix(".md") else {
                continue;
            };
            let body = self.repo.adapter().read_file(&dir.join(&name))?;
            out.push((tag.to_string(), body));
        }
        Ok(out)
    }

    /// Snapshot of the enforcement flag and the currently described tags.
    pub fn allowed_tags(&self) -> Result<AllowedTags> {
        let config = RepositoryConfig::load(&self.repo)?;
        let tags = self
            .list_tag_descriptions()?
            .into_iter()
            .map(|(tag, _)| tag)
            .collect();
        Ok(AllowedTags {
            enforced: config.tags.enforce_allowed_tags,
            tags,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use repoatlas_storage::MemoryStore;
    use std::sync::Arc;

    fn repo() -> Repository {
        Repository::at_root(Arc::new(MemoryStore::new()), "/repo")
    }

    #[test]
    fn description_round_trips() {
        let registry = TagRegistry::new(repo());
        registry
            .save_tag_description("api", "# API\nEdge notes.")
            .expect("save");
        assert_eq!(
            registry.get_tag_description("api").expect("get").as_deref(),
            Some("# API\nEdge notes.")
        );
    }

    #[test]
    fn oversized_description_is_rejected_with_both_numbers() {
        let repo = repo();
        let mut config = RepositoryConfig::default();
        config.limits.max_tag_description_length = 5;
        config.save(&repo).expect("save config");

        let err = TagRegistry::new(repo)
            .save_tag_description("api", "123456")
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains('5'), "missing limit: {message}");
        assert!(message.contains('6'), "missing actual: {message}");
    }

    #[test]
    fn delete_reports_whether_description_existed() {
        let registry = TagRegistry::new(repo());
        assert!(!registry.delete_tag_description("ghost", false).expect("delete"));
        registry.save_tag_description("api", "x").expect("save");
        assert!(registry.delete_tag_description("api", false).expect("delete"));
    }

    #[test]
    fn allowed_tags_lists_described_tags() {
        let registry = TagRegistry::new(repo());
        registry.save_tag_description("api", "").expect("save");
        registry.save_tag_description("deploy", "").expect("save");

        let allowed = registry.allowed_tags().expect("allowed");
        assert!(!allowed.enforced);
        assert_eq!(allowed.tags, vec!["api".to_string(), "deploy".to_string()]);
    }

    #[test]
    fn tag_names_are_restricted_to_filename_safe_chars() {
        assert!(validate_tag_name("api-v2_notes").is_ok());
        assert!(validate_tag_name("").is_err());
        assert!(validate_tag_name("a/b").is_err());
        assert!(validate_tag_name("spaced tag").is_err());
    }
}
