use std::path::{Component, Path, PathBuf};

/// Normalizes an anchor string into the repository-relative form used
/// everywhere downstream (storage, matching, staleness).
///
/// - absolute anchors are re-expressed relative to `repo_root`;
/// - `./`- and `../`-prefixed anchors are resolved against `origin`
///   first, then re-expressed relative to `repo_root`, with no traversal
///   tokens left behind;
/// - anything else is treated as already repo-relative and returned
///   unchanged apart from separator folding.
///
/// Anchors that resolve outside the repository root are not rejected;
/// they come back with leading `..` segments and a logged warning, and
/// callers treat them as a data-quality signal.
#[must_use]
pub fn normalize_anchor(anchor: &str, repo_root: &Path, origin: &Path) -> String {
    let folded = anchor.trim().replace('\\', "/");
    if folded.is_empty() {
        return folded;
    }

    let candidate = Path::new(&folded);
    let relative = if candidate.is_absolute() {
        relative_path(repo_root, &lexical_normalize(candidate))
    } else if has_traversal_prefix(&folded) {
        let resolved = lexical_normalize(&origin.join(candidate));
        relative_path(repo_root, &resolved)
    } else {
        return trim_trailing_slash(&folded).to_string();
    };

    let rendered = render_relative(&relative);
    if rendered.starts_with("..") {
        log::warn!(
            "anchor '{anchor}' normalizes outside repository root {}: {rendered}",
            repo_root.display()
        );
    }
    rendered
}

fn has_traversal_prefix(path: &str) -> bool {
    path == "." || path == ".." || path.starts_with("./") || path.starts_with("../")
}

fn trim_trailing_slash(path: &str) -> &str {
    if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    }
}

/// Resolves `.` and `..` components lexically, without touching storage.
fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let last_is_normal =
                    matches!(out.components().next_back(), Some(Component::Normal(_)));
                if last_is_normal {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Expresses `target` relative to `base`, both lexically normalized.
fn relative_path(base: &Path, target: &Path) -> PathBuf {
    let base = lexical_normalize(base);
    let mut base_components = base.components().peekable();
    let mut target_components = target.components().peekable();

    while let (Some(b), Some(t)) = (base_components.peek(), target_components.peek()) {
        if b != t {
            break;
        }
        base_components.next();
        target_components.next();
    }

    let mut out = PathBuf::new();
    for component in base_components {
        if matches!(component, Component::Normal(_)) {
            out.push("..");
        }
    }
    for component in target_components {
        out.push(component.as_os_str());
    }
    out
}

fn render_relative(path: &Path) -> String {
    let rendered = path.to_string_lossy().replace('\\', "/");
    if rendered.is_empty() {
        ".".to_string()
    } else {
        rendered
    }
}
