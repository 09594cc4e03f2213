use std::collections::BTreeMap;

use crate::model::{CellSpec, View};

/// Outcome of structural validation. Heuristic findings (pattern
/// conflicts, duplicate positions, low utilization) stay in `warnings`
/// and `suggestions` and never flip `valid`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewValidation {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
}

const LOW_UTILIZATION_PERCENT: f64 = 30.0;

pub fn validate_view(view: &View) -> ViewValidation {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut suggestions = Vec::new();

    if view.id.is_empty() {
        errors.push("view id must not be empty".to_string());
    } else if !view
        .id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        errors.push(format!(
            "view id '{}' contains characters outside [A-Za-z0-9_-]",
            view.id
        ));
    }

    if view
        .overview_path
        .as_deref()
        .is_none_or(|p| p.trim().is_empty())
    {
        errors.push("overview_path is required".to_string());
    }

    if view.cells.is_empty() {
        errors.push("view has no cells".to_string());
    }

    for (name, cell) in &view.cells {
        if cell.patterns.is_empty() {
            errors.push(format!("cell '{name}': pattern list is empty"));
        }
        if cell.row() < 0 || cell.col() < 0 {
            errors.push(format!(
                "cell '{name}': coordinates [{}, {}] must be non-negative",
                cell.row(),
                cell.col()
            ));
        }
    }

    let dims = view.effective_dimensions();
    for (name, cell) in &view.cells {
        if cell.row() >= 0 && cell.row() >= i64::from(dims.rows) {
            errors.push(format!(
                "cell '{name}': row {} exceeds grid rows ({})",
                cell.row(),
                dims.rows
            ));
        }
        if cell.col() >= 0 && cell.col() >= i64::from(dims.cols) {
            errors.push(format!(
                "cell '{name}': col {} exceeds grid cols ({})",
                cell.col(),
                dims.cols
            ));
        }
    }

    if let Some(scope) = &view.scope {
        if let Err(err) = scope.compile() {
            errors.push(err.to_string());
        }
    }

    // Two cells on one position is a layout smell, not a hard conflict;
    // priority decides at assignment time.
    let mut seen: BTreeMap<[i64; 2], &str> = BTreeMap::new();
    for (name, cell) in &view.cells {
        if let Some(previous) = seen.insert(cell.coordinates, name.as_str()) {
            warnings.push(format!(
                "cells '{previous}' and '{name}' share position [{}, {}]; higher priority wins",
                cell.row(),
                cell.col()
            ));
        }
    }

    for conflict in detect_pattern_conflicts(&view.cells) {
        warnings.push(conflict.to_string());
    }

    if !view.cells.is_empty() {
        let utilization = grid_utilization(view);
        if utilization < LOW_UTILIZATION_PERCENT {
            suggestions.push(format!(
                "grid utilization {utilization:.0}% is below {LOW_UTILIZATION_PERCENT:.0}%; consider a smaller grid"
            ));
        }
    }

    ViewValidation {
        valid: errors.is_empty(),
        errors,
        warnings,
        suggestions,
    }
}

/// How two patterns were judged to overlap. Deliberately coarse: this is
/// a textual heuristic for authoring mistakes, not glob intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// Identical pattern strings.
    Exact,
    /// One pattern's literal part is contained in the other pattern.
    Containment,
    /// Both wildcarded with a shared literal prefix before the first
    /// wildcard.
    SharedWildcardPrefix,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternConflict {
    pub cell_a: String,
    pub cell_b: String,
    pub pattern_a: String,
    pub pattern_b: String,
    pub kind: ConflictKind,
}

impl std::fmt::Display for PatternConflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.kind {
            ConflictKind::Exact => "identical patterns",
            ConflictKind::Containment => "pattern containment",
            ConflictKind::SharedWildcardPrefix => "shared wildcard prefix",
        };
        write!(
            f,
            "cells '{}' and '{}' may overlap ({kind}): '{}' vs '{}'",
            self.cell_a, self.cell_b, self.pattern_a, self.pattern_b
        )
    }
}

/// Pairwise overlap heuristic over all cell pairs. False positives are
/// expected and accepted; the point is to surface likely authoring
/// mistakes early.
#[must_use]
pub fn detect_pattern_conflicts(cells: &BTreeMap<String, CellSpec>) -> Vec<PatternConflict> {
    let entries: Vec<(&String, &CellSpec)> = cells.iter().collect();
    let mut conflicts = Vec::new();
    for (i, (name_a, cell_a)) in entries.iter().enumerate() {
        for (name_b, cell_b) in entries.iter().skip(i + 1) {
            for pattern_a in &cell_a.patterns {
                for pattern_b in &cell_b.patterns {
                    if let Some(kind) = classify_overlap(pattern_a, pattern_b) {
                        conflicts.push(PatternConflict {
                            cell_a: (*name_a).clone(),
                            cell_b: (*name_b).clone(),
                            pattern_a: pattern_a.clone(),
                            pattern_b: pattern_b.clone(),
                            kind,
                        });
                    }
                }
            }
        }
    }
    conflicts
}

fn classify_overlap(a: &str, b: &str) -> Option<ConflictKind> {
    if a == b {
        return Some(ConflictKind::Exact);
    }
    let lit_a = literal_prefix(a);
    let lit_b = literal_prefix(b);
    if (!lit_a.is_empty() && b.contains(lit_a)) || (!lit_b.is_empty() && a.contains(lit_b)) {
        return Some(ConflictKind::Containment);
    }
    if has_wildcard(a) && has_wildcard(b) && shares_nonempty_prefix(lit_a, lit_b) {
        return Some(ConflictKind::SharedWildcardPrefix);
    }
    None
}

/// Everything before the first wildcard; the whole pattern when it has
/// none.
fn literal_prefix(pattern: &str) -> &str {
    match pattern.find(['*', '?', '[']) {
        Some(idx) => &pattern[..idx],
        None => pattern,
    }
}

fn has_wildcard(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

fn shares_nonempty_prefix(a: &str, b: &str) -> bool {
    match a.chars().next().zip(b.chars().next()) {
        Some((ca, cb)) => ca == cb,
        None => false,
    }
}

/// Share of the effective grid actually occupied, as a percentage.
/// Duplicate positions count once.
#[must_use]
pub fn grid_utilization(view: &View) -> f64 {
    let dims = view.effective_dimensions();
    let total = u64::from(dims.rows) * u64::from(dims.cols);
    if total == 0 {
        return 0.0;
    }
    let mut positions: Vec<[i64; 2]> = view.cells.values().map(|c| c.coordinates).collect();
    positions.sort_unstable();
    positions.dedup();
    (positions.len() as f64) / (total as f64) * 100.0
}
