use std::path::PathBuf;

/// Failures that abort discovery before any repository is touched.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("scan root {path} is unreadable: {source}")]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("scan root {0} is not a directory")]
    NotADirectory(PathBuf),
}
