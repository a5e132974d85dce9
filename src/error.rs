//! Error types for the archive pipeline.

use std::path::PathBuf;

use thiserror::Error;

use crate::cdx::CdxParseError;

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum WaybackError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse capture index: {0}")]
    Index(#[from] CdxParseError),

    #[error("No capture index found at {0}; fetch the index before exporting")]
    MissingIndex(PathBuf),

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

impl WaybackError {
    /// Wrap an I/O error with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
