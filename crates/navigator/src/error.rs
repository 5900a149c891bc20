use std::path::PathBuf;
use thiserror::Error;

/// Result type for navigator operations
pub type Result<T> = std::result::Result<T, NavigatorError>;

/// Errors that can occur while parsing a navigator or associating its points
#[derive(Error, Debug)]
pub enum NavigatorError {
    /// The navigator file could not be opened
    #[error("Error opening {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The navigator file was opened but reading it failed
    #[error("Error reading {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An output file could not be created
    #[error("Error creating {}: {source}", .path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A record the engine had to measure has no usable `StageXYZ`
    #[error("Malformed navigator record {position}: {reason}")]
    MalformedRecord { position: usize, reason: String },

    /// No record in the navigator is flagged `Acquire = 1`
    #[error(
        "There don't appear to be any view-maps set for acquisitions (A) among {records} navigator items. Please check this and try again."
    )]
    NoAnchors { records: usize },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Writing to a derived file failed
    #[error("Error writing {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl NavigatorError {
    /// Create a malformed-record error for the record at the 0-based `index`.
    ///
    /// The reported position is 1-based, matching the numbering used in the
    /// indices file.
    pub fn malformed(index: usize, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            position: index + 1,
            reason: reason.into(),
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Whether this is the "no anchors" condition rather than a hard failure.
    #[must_use]
    pub const fn is_no_anchors(&self) -> bool {
        matches!(self, Self::NoAnchors { .. })
    }
}
