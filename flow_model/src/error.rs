//! Error types for document handling.

use thiserror::Error;

/// Failure while loading a system document.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The document is not valid JSON for this schema.
    #[error("malformed system document: {0}")]
    Parse(#[from] serde_json::Error),

    /// The document parsed but validation found errors.
    #[error("system document failed validation: {}", .0.join("; "))]
    Invalid(Vec<String>),
}
