use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] relive_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Search query cannot be empty")]
    EmptySearchQuery,
    #[error("No text on stdin")]
    EmptyStdin,
    #[error("Media file is empty: {}", .0.display())]
    EmptyMediaFile(PathBuf),
    #[error("No {kind} at position {index} (entry has {len})")]
    MediaIndexOutOfRange {
        kind: &'static str,
        index: usize,
        len: usize,
    },
    #[error("Editor command failed: {0}")]
    EditorFailed(String),
}
