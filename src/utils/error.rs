//! Error handling for the outer surfaces.
//!
//! The engine stages themselves never fail: unreadable input degrades to
//! blanks and arithmetic edge cases become signed infinities. Errors only
//! arise where data crosses into the crate from outside.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MathexError {
    /// Configuration JSON that is not an object of known fields.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[source] serde_json::Error),

    /// Structured tree JSON that does not match the tree schema.
    #[error("invalid structured tree: {0}")]
    InvalidTree(#[source] serde_json::Error),

    /// A structured tree could not be written out.
    #[error("cannot serialize tree: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for operations on the outer surfaces.
pub type MathexResult<T> = Result<T, MathexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failing_surface() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let message = MathexError::InvalidConfig(err).to_string();
        assert!(message.starts_with("invalid configuration:"), "{}", message);

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.txt");
        assert_eq!(MathexError::from(io).to_string(), "I/O error: missing.txt");
    }
}
