use crate::types::NoteMatch;

/// Relevance of one note's anchor list for a query path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorMatch {
    /// Exact match, or the query and an anchor nest within each other on
    /// a path-separator boundary.
    pub direct: bool,
    /// No direct anchor hit, but the note stays visible as repo-wide
    /// context. Only produced when the caller opts in.
    pub ancestor: bool,
    /// 0 for direct hits; query depth (segments from the repo root) for
    /// ancestor visibility. Drives ranking.
    pub distance: usize,
}

/// Decides whether a note with `anchors` is relevant for `query`.
/// Both sides are expected in normalized repo-relative form. Returns
/// `None` when the note should be excluded entirely.
#[must_use]
pub fn match_anchors(
    query: &str,
    anchors: &[String],
    include_parent_notes: bool,
) -> Option<AnchorMatch> {
    let query = query.trim_end_matches('/');
    let direct = anchors.iter().any(|anchor| {
        let anchor = anchor.trim_end_matches('/');
        (is_root(query) && is_root(anchor))
            || query == anchor
            || is_descendant(query, anchor)
            || is_descendant(anchor, query)
    });
    if direct {
        return Some(AnchorMatch {
            direct: true,
            ancestor: false,
            distance: 0,
        });
    }
    if include_parent_notes {
        return Some(AnchorMatch {
            direct: false,
            ancestor: true,
            distance: segment_count(query),
        });
    }
    None
}

/// The repository root, as the normalizer renders it.
fn is_root(path: &str) -> bool {
    path.is_empty() || path == "."
}

/// Separator-bounded prefix check: `src/api/mod.rs` descends from
/// `src/api`, never from the sibling `src/ap`. Every repo-relative path
/// descends from the root itself.
fn is_descendant(path: &str, ancestor: &str) -> bool {
    if is_root(ancestor) {
        return !is_root(path);
    }
    path.len() > ancestor.len()
        && path.starts_with(ancestor)
        && path.as_bytes()[ancestor.len()] == b'/'
}

fn segment_count(path: &str) -> usize {
    if path.is_empty() || path == "." {
        return 0;
    }
    path.split('/').filter(|s| !s.is_empty() && *s != ".").count()
}

/// Orders query results: nearest first, most recent first among ties,
/// truncated to `max_results` (floored at 1).
pub fn rank_matches(mut matches: Vec<NoteMatch>, max_results: usize) -> Vec<NoteMatch> {
    matches.sort_by(|a, b| {
        a.distance
            .cmp(&b.distance)
            .then(b.note.timestamp.cmp(&a.note.timestamp))
    });
    matches.truncate(max_results.max(1));
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AnchoredNote;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn anchors(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn note_at(id: &str, timestamp: u64, distance: usize) -> NoteMatch {
        NoteMatch {
            note: AnchoredNote {
                id: id.to_string(),
                content: String::new(),
                anchors: vec!["src".to_string()],
                tags: vec!["t".to_string()],
                metadata: serde_json::Map::new(),
                reviewed: false,
                timestamp,
                view_id: None,
            },
            direct: distance == 0,
            ancestor: distance != 0,
            distance,
        }
    }

    #[test]
    fn exact_anchor_matches_directly() {
        let m = match_anchors("src/api/mod.rs", &anchors(&["src/api/mod.rs"]), false)
            .expect("match");
        assert!(m.direct);
        assert_eq!(m.distance, 0);
    }

    #[test]
    fn query_inside_anchored_directory_matches() {
        let m = match_anchors("src/api/mod.rs", &anchors(&["src/api"]), false).expect("match");
        assert!(m.direct);
    }

    #[test]
    fn anchor_inside_queried_directory_matches() {
        let m = match_anchors("src", &anchors(&["src/api/mod.rs"]), false).expect("match");
        assert!(m.direct);
    }

    #[test]
    fn root_anchored_note_matches_any_file_query() {
        let m = match_anchors("src/a.rs", &anchors(&["."]), false).expect("match");
        assert!(m.direct);
        assert_eq!(m.distance, 0);
    }

    #[test]
    fn root_query_matches_every_anchor() {
        let m = match_anchors(".", &anchors(&["src/api/mod.rs"]), false).expect("match");
        assert!(m.direct);
        let m = match_anchors("", &anchors(&["."]), false).expect("match");
        assert!(m.direct);
    }

    #[test]
    fn sibling_with_shared_prefix_does_not_match() {
        assert_eq!(match_anchors("src/ap", &anchors(&["src/api"]), false), None);
        assert_eq!(
            match_anchors("src/api2/mod.rs", &anchors(&["src/api"]), false),
            None
        );
    }

    #[test]
    fn parent_opt_in_surfaces_ancestor_match_with_depth() {
        let m = match_anchors("docs/guide/setup.md", &anchors(&["src/api"]), true)
            .expect("ancestor");
        assert!(!m.direct);
        assert!(m.ancestor);
        assert_eq!(m.distance, 3);
    }

    #[test]
    fn ranking_sorts_by_distance_then_recency() {
        let ranked = rank_matches(
            vec![
                note_at("far-old", 10, 5),
                note_at("near-old", 10, 0),
                note_at("near-new", 20, 0),
            ],
            10,
        );
        let ids: Vec<&str> = ranked.iter().map(|m| m.note.id.as_str()).collect();
        assert_eq!(ids, vec!["near-new", "near-old", "far-old"]);
    }

    #[test]
    fn max_results_is_floored_at_one() {
        let ranked = rank_matches(vec![note_at("a", 1, 0), note_at("b", 2, 0)], 0);
        assert_eq!(ranked.len(), 1);
    }

    proptest! {
        #[test]
        fn proptest_descendant_queries_always_match(
            base in proptest::collection::vec("[a-z]{1,6}", 1..4),
            extra in proptest::collection::vec("[a-z]{1,6}", 1..3),
        ) {
            let anchor = base.join("/");
            let query = format!("{anchor}/{}", extra.join("/"));
            let m = match_anchors(&query, &[anchor], false);
            prop_assert!(m.is_some_and(|m| m.direct));
        }

        #[test]
        fn proptest_unrelated_siblings_never_match(
            stem in "[a-z]{2,6}",
            suffix in "[0-9]{1,3}",
        ) {
            let anchor = format!("src/{stem}");
            let query = format!("src/{stem}{suffix}");
            prop_assert_eq!(match_anchors(&query, &[anchor], false), None);
        }
    }
}
