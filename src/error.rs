//! Error types for track loading.
//!
//! A load either succeeds with a complete [`Track`](crate::Track) or fails with a
//! [`LoadError`]. There are no partial results.

use thiserror::Error;

/// Convenience alias for results produced while loading a track.
pub type Result<T> = std::result::Result<T, LoadError>;

/// Why a GPX document could not be turned into a track.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// The document is not well-formed XML or not a GPX document.
    #[error("invalid GPX document: {0}")]
    InvalidGpx(String),

    /// The document parsed but contains no track or route points.
    #[error("GPX document contains no track points")]
    NoPoints,

    /// A point carries a coordinate that is not a finite WGS84 value.
    #[error("invalid coordinate at point {index}: ({latitude}, {longitude})")]
    InvalidCoordinate {
        index: usize,
        latitude: f64,
        longitude: f64,
    },
}

/// Failure of a single track load attempt.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The document could not be retrieved (connection, timeout, HTTP status or body read).
    #[error("failed to retrieve {url}: {reason}")]
    Retrieval { url: String, reason: String },

    /// The document was retrieved but could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The HTTP client could not be constructed.
    #[error("failed to create HTTP client: {0}")]
    Client(String),
}

impl LoadError {
    pub(crate) fn retrieval(url: &str, reason: impl std::fmt::Display) -> Self {
        LoadError::Retrieval {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// True when the failure happened before any content was parsed.
    pub fn is_retrieval(&self) -> bool {
        matches!(self, LoadError::Retrieval { .. } | LoadError::Client(_))
    }
}
