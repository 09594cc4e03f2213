use std::collections::BTreeMap;

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, ViewError};

pub const VIEW_VERSION: u32 = 1;

/// A named spatial grid classifying repository paths into cells.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct View {
    /// Filename-safe, unique within the repository.
    pub id: String,
    #[serde(default = "default_version")]
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Path rendered as the view's entry point when browsing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview_path: Option<String>,
    /// Explicit grid size. When omitted the size is implied by the
    /// cells' maximum coordinates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cols: Option<u32>,
    #[serde(default)]
    pub cells: BTreeMap<String, CellSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<ViewScope>,
    /// Unix milliseconds of the last write.
    #[serde(default)]
    pub timestamp: u64,
}

fn default_version() -> u32 {
    VIEW_VERSION
}

impl View {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, timestamp: u64) -> Self {
        View {
            id: id.into(),
            version: VIEW_VERSION,
            name: name.into(),
            description: String::new(),
            overview_path: None,
            rows: None,
            cols: None,
            cells: BTreeMap::new(),
            scope: None,
            timestamp,
        }
    }

    /// Declared grid size when present, implied size otherwise.
    #[must_use]
    pub fn effective_dimensions(&self) -> GridDimensions {
        let computed = compute_grid_dimensions(&self.cells);
        GridDimensions {
            rows: self.rows.unwrap_or(computed.rows),
            cols: self.cols.unwrap_or(computed.cols),
        }
    }
}

/// One labeled region of a view. Owned exclusively by its parent view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CellSpec {
    /// Glob patterns selecting the repository paths shown in this cell.
    pub patterns: Vec<String>,
    /// `[row, col]`, 0-indexed. Signed so that malformed documents can
    /// be diagnosed by the validator instead of failing to parse.
    pub coordinates: [i64; 2],
    /// Higher priority wins when two cells claim the same path.
    #[serde(default)]
    pub priority: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl CellSpec {
    #[must_use]
    pub fn at(row: i64, col: i64, patterns: Vec<String>) -> Self {
        CellSpec {
            patterns,
            coordinates: [row, col],
            priority: 0,
            links: None,
            metadata: None,
        }
    }

    #[must_use]
    pub fn row(&self) -> i64 {
        self.coordinates[0]
    }

    #[must_use]
    pub fn col(&self) -> i64 {
        self.coordinates[1]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridDimensions {
    pub rows: u32,
    pub cols: u32,
}

/// Grid size implied by the cells: `max(coordinate) + 1` per axis,
/// zero for an empty cell map. Cells with negative coordinates are
/// ignored here; the validator reports them separately.
#[must_use]
pub fn compute_grid_dimensions(cells: &BTreeMap<String, CellSpec>) -> GridDimensions {
    let mut rows = 0u32;
    let mut cols = 0u32;
    for cell in cells.values() {
        if cell.row() >= 0 {
            rows = rows.max(u32::try_from(cell.row()).unwrap_or(u32::MAX).saturating_add(1));
        }
        if cell.col() >= 0 {
            cols = cols.max(u32::try_from(cell.col()).unwrap_or(u32::MAX).saturating_add(1));
        }
    }
    GridDimensions { rows, cols }
}

/// Restricts a view to a slice of the repository.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ViewScope {
    /// Repo-relative directory the scope is anchored at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
}

impl ViewScope {
    /// Compiles the include/exclude globs. Invalid patterns surface as
    /// validation errors, not panics.
    pub fn compile(&self) -> Result<ScopeMatcher> {
        let include = if self.include.is_empty() {
            None
        } else {
            Some(build_glob_set(&self.include, "include")?)
        };
        let exclude = build_glob_set(&self.exclude, "exclude")?;
        Ok(ScopeMatcher {
            base_path: self.base_path.clone(),
            include,
            exclude,
        })
    }
}

fn build_glob_set(patterns: &[String], which: &str) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|err| {
            ViewError::Validation(format!("scope {which} pattern '{pattern}' is invalid: {err}"))
        })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|err| ViewError::Validation(format!("scope {which} patterns: {err}")))
}

/// Compiled form of [`ViewScope`].
#[derive(Debug)]
pub struct ScopeMatcher {
    base_path: Option<String>,
    include: Option<GlobSet>,
    exclude: GlobSet,
}

impl ScopeMatcher {
    /// Whether a repo-relative path falls inside the scope. An empty
    /// include list admits everything under the base path; exclusion
    /// wins over inclusion.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        if let Some(base) = &self.base_path {
            let base = base.trim_end_matches('/');
            let inside = path == base
                || (path.len() > base.len()
                    && path.starts_with(base)
                    && path.as_bytes()[base.len()] == b'/');
            if !inside {
                return false;
            }
        }
        if self.exclude.is_match(path) {
            return false;
        }
        match &self.include {
            Some(include) => include.is_match(path),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cells(coords: &[(i64, i64)]) -> BTreeMap<String, CellSpec> {
        coords
            .iter()
            .enumerate()
            .map(|(i, (r, c))| {
                (
                    format!("cell{i}"),
                    CellSpec::at(*r, *c, vec!["src/**".to_string()]),
                )
            })
            .collect()
    }

    #[test]
    fn dimensions_come_from_max_coordinates() {
        let dims = compute_grid_dimensions(&cells(&[(0, 0), (2, 3)]));
        assert_eq!(dims, GridDimensions { rows: 3, cols: 4 });
    }

    #[test]
    fn empty_cells_imply_a_zero_grid() {
        let dims = compute_grid_dimensions(&BTreeMap::new());
        assert_eq!(dims, GridDimensions { rows: 0, cols: 0 });
    }

    #[test]
    fn explicit_dimensions_override_computed_ones() {
        let mut view = View::new("v", "V", 0);
        view.cells = cells(&[(0, 0)]);
        view.rows = Some(5);
        let dims = view.effective_dimensions();
        assert_eq!(dims, GridDimensions { rows: 5, cols: 1 });
    }

    #[test]
    fn scope_matching_respects_base_include_and_exclude() {
        let scope = ViewScope {
            base_path: Some("src".to_string()),
            include: vec!["src/**/*.rs".to_string()],
            exclude: vec!["src/**/generated/**".to_string()],
        };
        let matcher = scope.compile().expect("compile");

        assert!(matcher.matches("src/api/mod.rs"));
        assert!(!matcher.matches("docs/guide.md"));
        assert!(!matcher.matches("src/api/generated/schema.rs"));
        assert!(!matcher.matches("srcx/api/mod.rs"));
    }

    #[test]
    fn invalid_scope_pattern_is_a_validation_error() {
        let scope = ViewScope {
            base_path: None,
            include: vec!["src/[".to_string()],
            exclude: Vec::new(),
        };
        assert!(matches!(
            scope.compile(),
            Err(ViewError::Validation(_))
        ));
    }

    #[test]
    fn view_serialization_omits_absent_optionals() {
        let view = View::new("main", "Main", 7);
        let raw = serde_json::to_string(&view).expect("serialize");
        assert!(!raw.contains("rows"));
        assert!(!raw.contains("scope"));
        let back: View = serde_json::from_str(&raw).expect("parse");
        assert_eq!(back, view);
    }
}
