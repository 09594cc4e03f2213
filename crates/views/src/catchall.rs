use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::model::{CellSpec, View};
use crate::store::ViewStore;

pub const CATCHALL_VIEW_ID: &str = "catchall";
const CATCHALL_VIEW_NAME: &str = "Recent activity";

/// One column per hour of the day.
const COLS_PER_ROW: i64 = 24;

/// Bucket name for an instant: `YYYY-MM-DD-HH` in UTC. This is the only
/// place the catchall layout touches the clock value, so growth stays
/// testable with fixed instants.
#[must_use]
pub fn hour_bucket(unix_ms: u64) -> String {
    let secs = i64::try_from(unix_ms / 1000).unwrap_or(i64::MAX);
    let instant: DateTime<Utc> = DateTime::from_timestamp(secs, 0).unwrap_or_default();
    instant.format("%Y-%m-%d-%H").to_string()
}

/// Where the next bucket cell lands: after the last column of the
/// bottom row, wrapping to a fresh row once the row holds 24 cells.
#[must_use]
pub fn next_bucket_position(cells: &BTreeMap<String, CellSpec>) -> [i64; 2] {
    let Some(max_row) = cells.values().map(CellSpec::row).max() else {
        return [0, 0];
    };
    let max_col = cells
        .values()
        .filter(|c| c.row() == max_row)
        .map(CellSpec::col)
        .max()
        .unwrap_or(-1);
    if max_col + 1 >= COLS_PER_ROW {
        [max_row + 1, 0]
    } else {
        [max_row, max_col + 1]
    }
}

/// Folds freshly used anchors into the repository's catchall view,
/// creating it on first use. Anchors land in the current hour's cell
/// without duplication; a new hour opens a new cell.
pub fn record_note_activity(
    store: &ViewStore,
    anchors: &[String],
    now_ms: u64,
) -> Result<View> {
    let mut view = store
        .get_view(CATCHALL_VIEW_ID)?
        .unwrap_or_else(|| View::new(CATCHALL_VIEW_ID, CATCHALL_VIEW_NAME, now_ms));

    if anchors.is_empty() {
        return Ok(view);
    }

    let bucket = hour_bucket(now_ms);
    match view.cells.get_mut(&bucket) {
        Some(cell) => {
            for anchor in anchors {
                if !cell.patterns.contains(anchor) {
                    cell.patterns.push(anchor.clone());
                }
            }
        }
        None => {
            let position = next_bucket_position(&view.cells);
            let mut patterns = Vec::new();
            for anchor in anchors {
                if !patterns.contains(anchor) {
                    patterns.push(anchor.clone());
                }
            }
            view.cells
                .insert(bucket, CellSpec::at(position[0], position[1], patterns));
        }
    }

    if view.overview_path.is_none() {
        view.overview_path = anchors.first().cloned();
    }
    view.timestamp = now_ms;
    store.persist(&view)?;
    Ok(view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use repoatlas_storage::{MemoryStore, Repository};
    use std::sync::Arc;

    const HOUR_MS: u64 = 3_600_000;
    // 2026-08-30 00:00:00 UTC.
    const BASE_MS: u64 = 1_788_048_000_000;

    fn store() -> ViewStore {
        ViewStore::new(Repository::at_root(Arc::new(MemoryStore::new()), "/repo"))
    }

    fn anchors(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bucket_name_is_utc_hour() {
        assert_eq!(hour_bucket(0), "1970-01-01-00");
        assert_eq!(hour_bucket(HOUR_MS * 25), "1970-01-02-01");
    }

    #[test]
    fn first_activity_creates_the_view_at_origin() {
        let store = store();
        let view =
            record_note_activity(&store, &anchors(&["src/a.rs"]), BASE_MS).expect("record");
        assert_eq!(view.id, CATCHALL_VIEW_ID);
        assert_eq!(view.cells.len(), 1);
        let cell = view.cells.values().next().expect("cell");
        assert_eq!(cell.coordinates, [0, 0]);
        assert_eq!(view.overview_path.as_deref(), Some("src/a.rs"));
    }

    #[test]
    fn same_hour_appends_anchors_without_duplicates() {
        let store = store();
        record_note_activity(&store, &anchors(&["src/a.rs"]), BASE_MS).expect("record");
        let view = record_note_activity(&store, &anchors(&["src/a.rs", "src/b.rs"]), BASE_MS)
            .expect("record");
        assert_eq!(view.cells.len(), 1);
        let cell = view.cells.values().next().expect("cell");
        assert_eq!(
            cell.patterns,
            vec!["src/a.rs".to_string(), "src/b.rs".to_string()]
        );
    }

    #[test]
    fn each_hour_advances_one_column() {
        let store = store();
        record_note_activity(&store, &anchors(&["a"]), BASE_MS).expect("record");
        let view =
            record_note_activity(&store, &anchors(&["b"]), BASE_MS + HOUR_MS).expect("record");
        assert_eq!(view.cells.len(), 2);
        let positions: Vec<[i64; 2]> = view.cells.values().map(|c| c.coordinates).collect();
        assert!(positions.contains(&[0, 0]));
        assert!(positions.contains(&[0, 1]));
    }

    #[test]
    fn twenty_fifth_hour_wraps_to_a_new_row() {
        let store = store();
        for hour in 0..25u64 {
            record_note_activity(&store, &anchors(&["a"]), BASE_MS + hour * HOUR_MS)
                .expect("record");
        }
        let view = store
            .get_view(CATCHALL_VIEW_ID)
            .expect("get")
            .expect("present");
        assert_eq!(view.cells.len(), 25);
        let max = view
            .cells
            .values()
            .map(|c| c.coordinates)
            .max()
            .expect("cells");
        assert_eq!(max, [1, 0]);
    }

    #[test]
    fn empty_anchor_list_changes_nothing() {
        let store = store();
        record_note_activity(&store, &[], BASE_MS).expect("record");
        assert_eq!(store.get_view(CATCHALL_VIEW_ID).expect("get"), None);
    }
}
