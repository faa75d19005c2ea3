//! Error types for core text processing.

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The XML document could not be parsed.
    #[error("XML parse error at byte {position}: {message}")]
    Xml { position: u64, message: String },

    /// The XML document had no root element.
    #[error("XML document is empty")]
    EmptyDocument,

    /// Closing tag did not match the open element.
    #[error("Mismatched closing tag: expected </{expected}>, found </{found}>")]
    MismatchedTag { expected: String, found: String },
}
