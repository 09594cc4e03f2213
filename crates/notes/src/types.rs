use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A short knowledge entry pinned to one or more repository paths.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnchoredNote {
    pub id: String,
    pub content: String,
    /// Repo-relative paths, normalized at creation. Never empty.
    pub anchors: Vec<String>,
    /// De-duplicated, order-preserving. Non-empty at creation; tag
    /// rewrites may later drain it.
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
    #[serde(default)]
    pub reviewed: bool,
    /// Unix milliseconds at creation.
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_id: Option<String>,
}

/// Input to [`crate::NoteStore::save_note`]. The stored form (id,
/// timestamp, normalized anchors) is returned by the store.
#[derive(Debug, Clone, Default)]
pub struct NoteDraft {
    pub content: String,
    pub anchors: Vec<String>,
    pub tags: Vec<String>,
    pub metadata: Map<String, Value>,
    pub view_id: Option<String>,
    /// Directory `./`- and `../`-prefixed anchors resolve against.
    /// Defaults to the repository root.
    pub origin: Option<std::path::PathBuf>,
}

/// One ranked query result.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteMatch {
    pub note: AnchoredNote,
    pub direct: bool,
    pub ancestor: bool,
    pub distance: usize,
}

/// One entry of the staleness scan. A note appears only when at least
/// one anchor target is gone; `stale_anchors.len() == note.anchors.len()`
/// means fully stale.
#[derive(Debug, Clone, PartialEq)]
pub struct StaleReport {
    pub note: AnchoredNote,
    pub stale_anchors: Vec<String>,
    pub valid_anchors: Vec<String>,
}

/// What happened to the old tag's description during `replace_tag`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptionAction {
    /// No transfer requested, or the old tag had no description.
    None,
    /// Old description renamed to the new tag.
    Transferred,
    /// Old description appended onto the new tag's existing one.
    Merged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagReplaceOutcome {
    pub notes_modified: usize,
    pub description_action: DescriptionAction,
}

/// Snapshot of the tag policy, as consulted before note creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedTags {
    pub enforced: bool,
    /// Tags that currently have a description. Meaningful as an
    /// allow-list only when `enforced` is true.
    pub tags: Vec<String>,
}
