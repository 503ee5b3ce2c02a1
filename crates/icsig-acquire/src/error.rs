//! Acquisition error types.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while collecting readings or handling photos.
#[derive(Debug, Error)]
pub enum AcquireError {
    /// The serial port could not be opened.
    #[error("serial port {port} unavailable: {source}")]
    Serial {
        port: String,
        source: tokio_serial::Error,
    },

    /// No line arrived from the fixture within the configured wait.
    #[error("no reading received within {0:?}")]
    Timeout(Duration),

    /// The source ended before a full message set was collected.
    #[error("source closed after {collected} of {expected} messages")]
    SourceClosed { collected: usize, expected: usize },

    /// The collection task panicked or was aborted.
    #[error("collection task failed: {0}")]
    Task(String),

    /// A stored photo is not valid base64.
    #[error("photo is not valid base64: {0}")]
    PhotoEncoding(#[from] base64::DecodeError),

    /// A photo could not be decoded or written as an image.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error propagated from the core domain layer.
    #[error("{0}")]
    Core(#[from] icsig_core::Error),
}

impl AcquireError {
    /// Returns `true` when the failure came from the serial resource rather
    /// than from the data it produced.
    #[must_use]
    pub fn is_resource_failure(&self) -> bool {
        matches!(
            self,
            Self::Serial { .. } | Self::Timeout(_) | Self::SourceClosed { .. } | Self::Io(_)
        )
    }
}

/// Convenience alias for acquisition results.
pub type AcquireResult<T> = std::result::Result<T, AcquireError>;
