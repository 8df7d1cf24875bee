//! Interaction history collaborator contract.

use thiserror::Error;

use crate::InteractionRecord;

/// Failure to fetch interaction history.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Reading from the source failed.
    #[error("failed to read interaction history from {origin}")]
    Io {
        /// Human-readable source location.
        origin: String,
        /// Source I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A record could not be decoded.
    #[error("malformed interaction record at {origin}:{line}")]
    Malformed {
        /// Human-readable source location.
        origin: String,
        /// One-based line or record number.
        line: usize,
        /// Underlying decode failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Supplies the finite interaction history for one training run.
///
/// Sources aggregate purchases over the configured trailing window.
/// Iteration order is not guaranteed; the matrix builder assigns indices
/// in whatever order records arrive, so reproducibility requires a source
/// with stable ordering.
pub trait InteractionSource {
    /// Fetches every interaction record inside the configured window.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the backing source cannot be read or
    /// produces undecodable records.
    fn fetch(&self) -> Result<Vec<InteractionRecord>, SourceError>;
}
