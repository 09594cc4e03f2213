//! # Repoatlas Notes
//!
//! File-anchored knowledge entries for a source repository.
//!
//! ## Pipeline
//!
//! ```text
//! anchor strings
//!     │
//!     ├──> Path Normalizer (repo-relative form)
//!     │
//!     ├──> Note Store (notes.json, validated writes)
//!     │      └─> Tag Registry (tags/<tag>.md, policy)
//!     │
//!     └──> Anchor Matcher (direct/ancestor + distance)
//!            └─> ranked query results
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use repoatlas_notes::{NoteDraft, NoteStore};
//! use repoatlas_storage::{LocalStore, Repository};
//!
//! fn main() -> anyhow::Result<()> {
//!     let repo = Repository::discover(Arc::new(LocalStore::new()), Path::new("/path/to/repo"))?;
//!     let store = NoteStore::new(repo);
//!
//!     let note = store.save_note(NoteDraft {
//!         content: "retry loop caps at 3 attempts".to_string(),
//!         anchors: vec!["src/net/retry.rs".to_string()],
//!         tags: vec!["net".to_string()],
//!         ..NoteDraft::default()
//!     })?;
//!
//!     for m in store.get_notes_for_path("src/net", false, 10)? {
//!         println!("{} (distance {})", m.note.content, m.distance);
//!     }
//!     println!("saved {}", note.id);
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod matcher;
mod normalize;
mod store;
mod tags;
mod types;

pub use config::{Limits, RepositoryConfig, TagPolicy};
pub use error::{NoteError, Result};
pub use matcher::{match_anchors, rank_matches, AnchorMatch};
pub use normalize::normalize_anchor;
pub use store::NoteStore;
pub use tags::{validate_tag_name, TagRegistry};
pub use types::{
    AllowedTags, AnchoredNote, DescriptionAction, NoteDraft, NoteMatch, StaleReport,
    TagReplaceOutcome,
};
