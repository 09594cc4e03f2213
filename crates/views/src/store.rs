use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use repoatlas_storage::{paths, Repository, StorageAdapter};

use crate::error::{Result, ViewError};
use crate::model::{CellSpec, View};
use crate::validate::{validate_view, ViewValidation};

/// CRUD persistence for views: one JSON document per view under
/// `views/`, plus the `default` alias. Every call re-reads from storage.
pub struct ViewStore {
    repo: Repository,
}

/// Derived listing entry; cheap to render without loading cell bodies
/// again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSummary {
    pub id: String,
    pub name: String,
    pub cell_count: usize,
    pub rows: u32,
    pub cols: u32,
}

impl ViewStore {
    #[must_use]
    pub fn new(repo: Repository) -> Self {
        ViewStore { repo }
    }

    /// Validates and persists a view. Structural errors abort the write;
    /// the returned report still carries advisory warnings/suggestions
    /// for views that saved fine.
    pub fn save_view(&self, view: &View) -> Result<ViewValidation> {
        if view.id == paths::DEFAULT_VIEW_ID {
            return Err(ViewError::Validation(format!(
                "view id '{}' is reserved; use set_default_view",
                paths::DEFAULT_VIEW_ID
            )));
        }
        let report = validate_view(view);
        if !report.valid {
            return Err(ViewError::Validation(report.errors.join("; ")));
        }
        self.persist(view)?;
        Ok(report)
    }

    pub fn get_view(&self, id: &str) -> Result<Option<View>> {
        let path = paths::view_path(self.repo.root(), id);
        if !self.repo.adapter().exists(&path) {
            return Ok(None);
        }
        let raw = self.repo.adapter().read_file(&path)?;
        let view = serde_json::from_str(&raw).map_err(|source| ViewError::Malformed {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Some(view))
    }

    /// Summaries of every stored view, sorted by id. Unparseable files
    /// are skipped with a warning rather than failing the listing.
    pub fn list_views(&self) -> Result<Vec<ViewSummary>> {
        let dir = paths::views_dir(self.repo.root());
        let mut out = Vec::new();
        for name in self.repo.adapter().read_dir(&dir)? {
            let Some(id) = name.strip_suffix(".json") else {
                continue;
            };
            match self.get_view(id) {
                Ok(Some(view)) => {
                    let dims = view.effective_dimensions();
                    out.push(ViewSummary {
                        id: view.id,
                        name: view.name,
                        cell_count: view.cells.len(),
                        rows: dims.rows,
                        cols: dims.cols,
                    });
                }
                Ok(None) => {}
                Err(err) => log::warn!("skipping unreadable view '{id}': {err}"),
            }
        }
        Ok(out)
    }

    pub fn delete_view(&self, id: &str) -> Result<bool> {
        let path = paths::view_path(self.repo.root(), id);
        Ok(self.repo.adapter().delete_file(&path)?)
    }

    /// Aliases a view as the repository default by copying it under the
    /// reserved id. The source view stays untouched.
    pub fn set_default_view(&self, id: &str) -> Result<View> {
        let source = self
            .get_view(id)?
            .ok_or_else(|| ViewError::NotFound(format!("view '{id}'")))?;
        let mut copy = source;
        copy.id = paths::DEFAULT_VIEW_ID.to_string();
        copy.timestamp = unix_ms(SystemTime::now());
        self.persist(&copy)?;
        Ok(copy)
    }

    /// Merges incoming cells into an existing view: known cells gain the
    /// missing patterns (keeping their coordinates and priority), unknown
    /// cells are inserted as-is.
    pub fn merge_into_view(
        &self,
        id: &str,
        incoming: BTreeMap<String, CellSpec>,
    ) -> Result<View> {
        let mut view = self
            .get_view(id)?
            .ok_or_else(|| ViewError::NotFound(format!("view '{id}'")))?;

        for (name, cell) in incoming {
            match view.cells.get_mut(&name) {
                Some(existing) => {
                    for pattern in cell.patterns {
                        if !existing.patterns.contains(&pattern) {
                            existing.patterns.push(pattern);
                        }
                    }
                }
                None => {
                    view.cells.insert(name, cell);
                }
            }
        }
        view.timestamp = unix_ms(SystemTime::now());
        self.persist(&view)?;
        Ok(view)
    }

    /// Writes without the reserved-id guard; used by the alias and
    /// auto-growth paths that own their ids.
    pub(crate) fn persist(&self, view: &View) -> Result<()> {
        let path = paths::view_path(self.repo.root(), &view.id);
        let raw = serde_json::to_string_pretty(view).map_err(|source| ViewError::Malformed {
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
