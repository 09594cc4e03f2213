use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use sha2::{Digest, Sha256};

use repoatlas_storage::{paths, Repository, StorageAdapter};

use crate::config::RepositoryConfig;
use crate::error::{NoteError, Result};
use crate::matcher::{match_anchors, rank_matches};
use crate::normalize::normalize_anchor;
use crate::tags::{validate_tag_name, TagRegistry};
use crate::types::{
    AnchoredNote, DescriptionAction, NoteDraft, NoteMatch, StaleReport, TagReplaceOutcome,
};

const NOTE_ID_LEN: usize = 16;

/// Owns the note collection of one repository: creation, queries, tag
/// rewrites, staleness scans. Every operation is a full read-modify-write
/// of `notes.json`; nothing is cached between calls.
pub struct NoteStore {
    repo: Repository,
}

impl NoteStore {
    #[must_use]
    pub fn new(repo: Repository) -> Self {
        NoteStore { repo }
    }

    /// Validates, normalizes and persists a new note, returning the
    /// stored form. All validation happens before anything is written.
    pub fn save_note(&self, draft: NoteDraft) -> Result<AnchoredNote> {
        let config = RepositoryConfig::load(&self.repo)?;

        if draft.anchors.is_empty() {
            return Err(NoteError::Validation(
                "a note needs at least one anchor".to_string(),
            ));
        }
        if draft.tags.is_empty() {
            return Err(NoteError::Validation(
                "a note needs at least one tag".to_string(),
            ));
        }

        let content_len = draft.content.chars().count();
        if content_len > config.limits.max_note_length {
            return Err(NoteError::LimitExceeded {
                what: "note content length",
                limit: config.limits.max_note_length,
                actual: content_len,
            });
        }

        let mut tags: Vec<String> = Vec::new();
        for tag in &draft.tags {
            validate_tag_name(tag)?;
            if !tags.iter().any(|t| t == tag) {
                tags.push(tag.clone());
            }
        }
        if tags.len() > config.limits.max_tags_per_note {
            return Err(NoteError::LimitExceeded {
                what: "note tag count",
                limit: config.limits.max_tags_per_note,
                actual: tags.len(),
            });
        }
        if draft.anchors.len() > config.limits.max_anchors_per_note {
            return Err(NoteError::LimitExceeded {
                what: "note anchor count",
                limit: config.limits.max_anchors_per_note,
                actual: draft.anchors.len(),
            });
        }

        let origin = draft
            .origin
            .clone()
            .unwrap_or_else(|| self.repo.root().to_path_buf());
        let mut anchors = Vec::with_capacity(draft.anchors.len());
        for anchor in &draft.anchors {
            let normalized = normalize_anchor(anchor, self.repo.root(), &origin);
            if normalized.is_empty() {
                return Err(NoteError::Validation(
                    "anchor must not be empty".to_string(),
                ));
            }
            anchors.push(normalized);
        }

        let registry = TagRegistry::new(self.repo.clone());
        let allowed = registry.allowed_tags()?;
        if allowed.enforced {
            for tag in &tags {
                if !allowed.tags.iter().any(|t| t == tag) {
                    return Err(NoteError::PolicyRejected {
                        tag: tag.clone(),
                        allowed: allowed.tags,
                    });
                }
            }
        } else {
            // First unenforced use of a tag seeds an empty description so
            // the registry always knows every tag in circulation.
            for tag in &tags {
                if registry.get_tag_description(tag)?.is_none() {
                    registry.save_tag_description(tag, "")?;
                }
            }
        }

        let mut notes = self.load_notes()?;
        let timestamp = unix_ms(SystemTime::now());
        let note = AnchoredNote {
            id: note_id(&draft.content, timestamp, notes.len()),
            content: draft.content,
            anchors,
            tags,
            metadata: draft.metadata,
            reviewed: false,
            timestamp,
            view_id: draft.view_id,
        };
        notes.push(note.clone());
        self.persist_notes(&notes)?;
        log::debug!("saved note {} with {} anchors", note.id, note.anchors.len());
        Ok(note)
    }

    pub fn get_note_by_id(&self, id: &str) -> Result<Option<AnchoredNote>> {
        Ok(self.load_notes()?.into_iter().find(|n| n.id == id))
    }

    /// Ranked notes relevant to a file or directory path. The query goes
    /// through the same normalizer as anchors, so absolute and
    /// `./`-prefixed queries work.
    pub fn get_notes_for_path(
        &self,
        query: &str,
        include_parent_notes: bool,
        max_results: usize,
    ) -> Result<Vec<NoteMatch>> {
        let query = normalize_anchor(query, self.repo.root(), self.repo.root());
        let matches = self
            .load_notes()?
            .into_iter()
            .filter_map(|note| {
                match_anchors(&query, &note.anchors, include_parent_notes).map(|m| NoteMatch {
                    note,
                    direct: m.direct,
                    ancestor: m.ancestor,
                    distance: m.distance,
                })
            })
            .collect();
        Ok(rank_matches(matches, max_results))
    }

    pub fn delete_note_by_id(&self, id: &str) -> Result<bool> {
        let mut notes = self.load_notes()?;
        let before = notes.len();
        notes.retain(|n| n.id != id);
        if notes.len() == before {
            return Ok(false);
        }
        self.persist_notes(&notes)?;
        Ok(true)
    }

    /// Flips the review flag. Returns false when the note is absent.
    pub fn set_note_reviewed(&self, id: &str, reviewed: bool) -> Result<bool> {
        let mut notes = self.load_notes()?;
        let Some(note) = notes.iter_mut().find(|n| n.id == id) else {
            return Ok(false);
        };
        note.reviewed = reviewed;
        self.persist_notes(&notes)?;
        Ok(true)
    }

    /// Strips `tag` from every note carrying it and reports how many
    /// notes changed. Notes may end up with zero tags, which is allowed
    /// here unlike at creation time. Idempotent.
    pub fn remove_tag_from_notes(&self, tag: &str) -> Result<usize> {
        let mut notes = self.load_notes()?;
        let mut modified = 0usize;
        for note in &mut notes {
            let before = note.tags.len();
            note.tags.retain(|t| t != tag);
            if note.tags.len() != before {
                modified += 1;
            }
        }
        if modified > 0 {
            self.persist_notes(&notes)?;
        }
        Ok(modified)
    }

    /// Rewrites `old` into `new` across all notes, de-duplicating where a
    /// note already carried both, and migrates the old tag's description
    /// per `transfer_description`.
    pub fn replace_tag(
        &self,
        old: &str,
        new: &str,
        transfer_description: bool,
    ) -> Result<TagReplaceOutcome> {
        validate_tag_name(old)?;
        validate_tag_name(new)?;
        if old == new {
            return Err(NoteError::Validation(
                "old and new tag are identical".to_string(),
            ));
        }

        let registry = TagRegistry::new(self.repo.clone());
        let old_body = registry.get_tag_description(old)?;
        let new_body = registry.get_tag_description(new)?;

        // Plan the description move up front so a limit failure surfaces
        // before any file changes.
        let plan = match (&old_body, &new_body, transfer_description) {
            (Some(old_text), Some(new_text), true) => {
                let merged = format!("{new_text}\n\n---\n\n{old_text}");
                let config = RepositoryConfig::load(&self.repo)?;
                let limit = config.limits.max_tag_description_length;
                let actual = merged.chars().count();
                if actual > limit {
                    return Err(NoteError::LimitExceeded {
                        what: "tag description length",
                        limit,
                        actual,
                    });
                }
                Some((merged, DescriptionAction::Merged))
            }
            (Some(old_text), None, true) => {
                Some((old_text.clone(), DescriptionAction::Transferred))
            }
            _ => None,
        };

        let mut notes = self.load_notes()?;
        let mut modified = 0usize;
        for note in &mut notes {
            if !note.tags.iter().any(|t| t == old) {
                continue;
            }
            note.tags.retain(|t| t != old);
            if !note.tags.iter().any(|t| t == new) {
                note.tags.push(new.to_string());
            }
            modified += 1;
        }
        if modified > 0 {
            self.persist_notes(&notes)?;
        }

        let description_action = match plan {
            Some((body, action)) => {
                self.repo
                    .adapter()
                    .write_file(&paths::tag_path(self.repo.root(), new), &body)?;
                self.repo
                    .adapter()
                    .delete_file(&paths::tag_path(self.repo.root(), old))?;
                action
            }
            None => DescriptionAction::None,
        };

        Ok(TagReplaceOutcome {
            notes_modified: modified,
            description_action,
        })
    }

    /// Tests every anchor of every note for existence and reports notes
    /// with at least one missing target. Comparing `stale_anchors` to the
    /// note's anchor count separates fully from partially stale notes.
    pub fn check_stale_anchors(&self) -> Result<Vec<StaleReport>> {
        let mut reports = Vec::new();
        for note in self.load_notes()? {
            let mut stale_anchors = Vec::new();
            let mut valid_anchors = Vec::new();
            for anchor in &note.anchors {
                let target: PathBuf = self.repo.root().join(anchor);
                if self.repo.adapter().exists(&target) {
                    valid_anchors.push(anchor.clone());
                } else {
                    stale_anchors.push(anchor.clone());
                }
            }
            if !stale_anchors.is_empty() {
                reports.push(StaleReport {
                    note,
                    stale_anchors,
                    valid_anchors,
                });
            }
        }
        Ok(reports)
    }

    fn load_notes(&self) -> Result<Vec<AnchoredNote>> {
        let path = paths::notes_path(self.repo.root());
        if !self.repo.adapter().exists(&path) {
            return Ok(Vec::new());
        }
        let raw = self.repo.adapter().read_file(&path)?;
        serde_json::from_str(&raw).map_err(|source| NoteError::Malformed {
            path: path.display().to_string(),
            source,
        })
    }

    fn persist_notes(&self, notes: &[AnchoredNote]) -> Result<()> {
        let path = paths::notes_path(self.repo.root());
        let raw = serde_json::to_string_pretty(notes).map_err(|source| NoteError::Malformed {
            path: path.display().to_string(),
            source,
        })?;
        self.repo.adapter().write_file(&path, &raw)?;
        Ok(())
    }
}

pub(crate) fn unix_ms(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or_default()
}

fn note_id(content: &str, timestamp: u64, seq: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hasher.update(timestamp.to_le_bytes());
    hasher.update(seq.to_le_bytes());
    let digest = hasher.finalize();

    use std::fmt::Write;
    let mut out = String::with_capacity(NOTE_ID_LEN);
    for b in digest.iter().take(NOTE_ID_LEN / 2) {
        let _ = write!(out, "{b:02x}");
    }
    out
}
