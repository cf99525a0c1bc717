//! Error type shared by the engine and the workbook boundary.
//!
//! Only conditions that stop a call are errors. Heuristic misses (no block
//! detected, undetected file category, join miss) are ordinary output values.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FusionError {
    /// The tabular reader could not produce rows and columns from the input.
    #[error("malformed workbook: {0}")]
    MalformedWorkbook(String),

    /// File extension not handled by any reader.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Reference table records could not be decoded.
    #[error("reference table error: {0}")]
    ReferenceParse(String),

    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// Config validation error (bad pattern, bad period, empty keyword set).
    #[error("config validation error: {0}")]
    ConfigValidation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FusionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_context() {
        let err = FusionError::MalformedWorkbook("zip header missing".into());
        assert_eq!(err.to_string(), "malformed workbook: zip header missing");

        let err = FusionError::ConfigValidation("layouts.tiers: bad pattern".into());
        assert!(err.to_string().starts_with("config validation error"));
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: FusionError = io.into();
        assert!(matches!(err, FusionError::Io(_)));
    }
}
