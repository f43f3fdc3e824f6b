//! Error types for relive-core

use thiserror::Error;

/// Result type alias using relive-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in relive-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// A store operation was attempted without a signed-in user
    #[error("User not authenticated")]
    AuthRequired,

    /// Object store upload failed (network, permission, quota)
    #[error("Upload failed: {0}")]
    Upload(String),

    /// A local recording produced no bytes
    #[error("Empty audio recording: {0}")]
    EmptyRecording(String),

    /// A local media handle could not be read
    #[error("Local media error: {0}")]
    LocalMedia(String),

    /// Signed URL generation failed
    #[error("Signed URL error: {0}")]
    Signing(String),

    /// Document store read/write failed
    #[error("Document store error: {0}")]
    DocumentStore(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error came from the object store rejecting an upload.
    #[must_use]
    pub const fn is_upload_failure(&self) -> bool {
        matches!(self, Self::Upload(_))
    }

    /// Whether this error came from signed URL generation.
    ///
    /// The resolver never propagates these; they only surface when a caller
    /// talks to the object store directly.
    #[must_use]
    pub const fn is_resolution_failure(&self) -> bool {
        matches!(self, Self::Signing(_))
    }
}
