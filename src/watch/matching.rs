// src/watch/matching.rs

//! Matching filesystem events against config dependencies.

use std::path::{Path, PathBuf};

/// Resolve `path` against `cwd` if it is relative.
pub fn absolutize(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// Does a change at `changed` affect dependency `dep`?
///
/// Exact matches count. So does any `<dep>.<ext>` sibling, because file mode
/// reports its dependency without an extension (`conf/app` stands for
/// `conf/app.yaml` and `conf/app.yml`).
pub fn dependency_matches(changed: &Path, dep: &Path) -> bool {
    if changed == dep {
        return true;
    }
    changed.parent() == dep.parent()
        && changed.file_stem().is_some()
        && changed.file_stem() == dep.file_name()
}

/// Directories to watch for a set of dependencies, first-seen order.
pub fn watch_dirs(deps: &[PathBuf]) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::new();
    for dep in deps {
        let dir = match dep.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if !dirs.contains(&dir) {
            dirs.push(dir);
        }
    }
    dirs
}
