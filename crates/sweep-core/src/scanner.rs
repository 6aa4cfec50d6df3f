use crate::detector::{is_metadata_dir, is_repository_root};
use crate::error::ScanError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Collects every repository root beneath `root`, nested repositories first.
///
/// The walk never descends into a repository it has found, never enters
/// hidden directories, and never follows symlinks. A scan root that is itself
/// a repository is returned alone. Otherwise the repository that contains the
/// root (if any) is appended last so nested repositories settle before their
/// container.
pub fn discover(root: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let root = fs::canonicalize(root).map_err(|source| ScanError::RootUnreadable {
        path: root.to_path_buf(),
        source,
    })?;
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root));
    }
    if is_repository_root(&root) {
        debug!(path = %root.display(), "scan root is a repository");
        return Ok(vec![root]);
    }
    let mut frontier = list_subdirectories(&root).map_err(|source| ScanError::RootUnreadable {
        path: root.clone(),
        source,
    })?;

    let mut found = Vec::new();
    while let Some(dir) = frontier.pop() {
        if is_metadata_dir(&dir) {
            continue;
        }
        if is_repository_root(&dir) {
            debug!(path = %dir.display(), "found repository");
            found.push(dir);
            continue;
        }
        match list_subdirectories(&dir) {
            Ok(children) => frontier.extend(children),
            Err(err) => {
                warn!(
                    path = %dir.display(),
                    error = %err,
                    "cannot list directory; skipping branch"
                );
            }
        }
    }

    if let Some(ancestor) = find_ancestor_repository(&root)
        && !found.iter().any(|path| same_path(path, &ancestor))
    {
        info!(path = %ancestor.display(), "scan root is inside repository");
        found.push(ancestor);
    }
    Ok(found)
}

/// Walks from `start` up to the filesystem root looking for a repository.
pub fn find_ancestor_repository(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| is_repository_root(dir))
        .map(Path::to_path_buf)
}

/// Immediate, non-hidden, non-symlink subdirectories in reverse name order,
/// so popping from the frontier visits siblings alphabetically.
fn list_subdirectories(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut children = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(path = %dir.display(), error = %err, "cannot read directory entry");
                continue;
            }
        };
        let name = entry.file_name();
        if is_metadata_dir(&entry.path()) {
            continue;
        }
        if name.to_string_lossy().starts_with('.') {
            continue;
        }
        match entry.file_type() {
            Ok(file_type) if file_type.is_dir() => children.push(entry.path()),
            Ok(_) => {}
            Err(err) => {
                warn!(path = %entry.path().display(), error = %err, "cannot read entry type");
            }
        }
    }
    children.sort();
    children.reverse();
    Ok(children)
}

fn same_path(left: &Path, right: &Path) -> bool {
    left.to_string_lossy()
        .eq_ignore_ascii_case(&right.to_string_lossy())
}
