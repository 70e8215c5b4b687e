//! Error types for loading genomes and configuration.
//!
//! Brain construction and evaluation never fail; these errors only arise at
//! the I/O edges where external data enters the crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrainError {
    /// File system errors
    #[error("File system error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Hex decoding errors
    #[error("Hex error: {0}")]
    Hex(#[from] hex::FromHexError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    Context {
        context: String,
        source: Box<BrainError>,
    },
}

pub type Result<T> = std::result::Result<T, BrainError>;

impl BrainError {
    #[must_use]
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }

    /// Wraps an error with additional context.
    #[must_use]
    pub fn with_context<S: Into<String>>(self, context: S) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BrainError::validation("empty genome");
        assert_eq!(err.to_string(), "Validation error: empty genome");
    }

    #[test]
    fn test_error_context() {
        let err = BrainError::validation("bad").with_context("loading genome.json");
        assert!(err.to_string().starts_with("loading genome.json"));
    }

    #[test]
    fn test_from_hex_error() {
        let err: BrainError = hex::decode("zz").unwrap_err().into();
        assert!(matches!(err, BrainError::Hex(_)));
    }
}
