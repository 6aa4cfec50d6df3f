use std::path::Path;

/// Name of the git metadata directory.
pub const GIT_DIR_NAME: &str = ".git";

/// Returns true when `path` holds a `.git` metadata directory.
///
/// Missing or unreadable paths are reported as `false`.
pub fn is_repository_root(path: &Path) -> bool {
    std::fs::metadata(path.join(GIT_DIR_NAME))
        .map(|metadata| metadata.is_dir())
        .unwrap_or(false)
}

pub fn is_metadata_dir(path: &Path) -> bool {
    path.file_name().is_some_and(|name| name == GIT_DIR_NAME)
}
