//! Error types for Sandhi
//!
//! The decision logic itself never fails; these cover configuration, trace
//! files and CLI output.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Sandhi error types
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be parsed, written or validated
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed trace line
    #[error("Trace error at line {line}: {message}")]
    Trace {
        /// 1-based line number
        line: usize,
        message: String,
    },

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// JSON encoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(e: toml::ser::Error) -> Self {
        Error::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_error_display() {
        let err = Error::Trace {
            line: 7,
            message: "missing field `t_ms`".to_string(),
        };
        assert_eq!(err.to_string(), "Trace error at line 7: missing field `t_ms`");
    }

    #[test]
    fn test_toml_error_maps_to_config() {
        let parse: std::result::Result<toml::Value, _> = toml::from_str("mode = ");
        let err: Error = parse.unwrap_err().into();
        assert!(matches!(err, Error::Config(_)));
    }
}
