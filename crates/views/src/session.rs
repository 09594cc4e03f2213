use std::collections::BTreeMap;

use crate::model::{CellSpec, View};

/// Columns before a session layout wraps to the next row.
const SESSION_COLS: i64 = 4;

/// Builds an ephemeral view from the first anchors touched in a working
/// session: one cell per top-level directory, laid out left to right.
/// Anchors without a directory component share a `root` cell matching
/// the files themselves. The caller decides whether to persist it.
#[must_use]
pub fn bootstrap_session_view(
    id: &str,
    name: &str,
    seed_anchors: &[String],
    now_ms: u64,
) -> View {
    let mut groups: Vec<(String, Vec<String>)> = Vec::new();
    for anchor in seed_anchors {
        let anchor = anchor.trim_matches('/');
        if anchor.is_empty() {
            continue;
        }
        let (cell_name, pattern) = match anchor.split_once('/') {
            Some((top, _)) => (top.to_string(), format!("{top}/**")),
            None => ("root".to_string(), anchor.to_string()),
        };
        match groups.iter_mut().find(|(group, _)| *group == cell_name) {
            Some((_, patterns)) => {
                if !patterns.contains(&pattern) {
                    patterns.push(pattern);
                }
            }
            None => groups.push((cell_name, vec![pattern])),
        }
    }

    let mut cells = BTreeMap::new();
    for (index, (cell_name, patterns)) in groups.into_iter().enumerate() {
        let index = index as i64;
        cells.insert(
            cell_name,
            CellSpec::at(index / SESSION_COLS, index % SESSION_COLS, patterns),
        );
    }

    let mut view = View::new(id, name, now_ms);
    view.description = "Session view derived from first-touched anchors".to_string();
    view.overview_path = seed_anchors.first().cloned();
    view.cells = cells;
    view
}
