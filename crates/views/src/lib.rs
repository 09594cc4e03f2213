//! # Repoatlas Views
//!
//! Named spatial grids ("views") that classify repository paths into
//! labeled cells via glob patterns.
//!
//! ## Model
//!
//! ```text
//! View (one JSON file per id)
//!     │
//!     ├──> CellSpec*  (patterns + [row, col] + priority)
//!     │      └─> conflict heuristic (exact / containment / prefix)
//!     │
//!     ├──> Validator  (errors vs advisory warnings/suggestions)
//!     │
//!     └──> auto-growth
//!            ├─> catchall: one cell per hour, 24 per row
//!            └─> session: one cell per top-level directory
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use repoatlas_storage::{LocalStore, Repository};
//! use repoatlas_views::{CellSpec, View, ViewStore};
//!
//! fn main() -> anyhow::Result<()> {
//!     let repo = Repository::discover(Arc::new(LocalStore::new()), Path::new("/path/to/repo"))?;
//!     let store = ViewStore::new(repo);
//!
//!     let mut view = View::new("architecture", "Architecture", 0);
//!     view.overview_path = Some("README.md".to_string());
//!     view.cells.insert(
//!         "core".to_string(),
//!         CellSpec::at(0, 0, vec!["src/**".to_string()]),
//!     );
//!
//!     let report = store.save_view(&view)?;
//!     for warning in &report.warnings {
//!         eprintln!("warning: {warning}");
//!     }
//!     Ok(())
//! }
//! ```

mod catchall;
mod error;
mod model;
mod session;
mod store;
mod validate;

pub use catchall::{hour_bucket, next_bucket_position, record_note_activity, CATCHALL_VIEW_ID};
pub use error::{Result, ViewError};
pub use model::{
    compute_grid_dimensions, CellSpec, GridDimensions, ScopeMatcher, View, ViewScope, VIEW_VERSION,
};
pub use session::bootstrap_session_view;
pub use store::{ViewStore, ViewSummary};
pub use validate::{
    detect_pattern_conflicts, grid_utilization, validate_view, ConflictKind, PatternConflict,
    ViewValidation,
};
