//! Structured error types for the conversion pipeline
//!
//! Using thiserror for automatic Display implementation and error chaining.
//!
//! Fatal errors abort the conversion before any output is written. Two
//! conditions are deliberately *not* errors: an absent optional track simply
//! skips its extraction, and an address that resolves to no loaded image is
//! rendered as a raw-address frame.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("trace container not found: {} (run {run})", path.display())]
    ContainerNotFound { path: PathBuf, run: u32 },

    #[error("trace container is malformed: {0}")]
    ContainerMalformed(String),

    #[error("failed to decode {schema} rows: {reason}")]
    SchemaParse { schema: &'static str, reason: String },

    #[error("xctrace export failed: {0}")]
    Exporter(String),

    #[error("failed to write profile: {0}")]
    OutputWrite(#[source] std::io::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ConvertError {
    /// Shorthand for a row-decoding failure scoped to one table schema.
    pub fn schema(schema: &'static str, reason: impl Into<String>) -> Self {
        ConvertError::SchemaParse { schema, reason: reason.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_not_found_display() {
        let err = ConvertError::ContainerNotFound {
            path: PathBuf::from("/tmp/missing.trace"),
            run: 2,
        };
        assert_eq!(err.to_string(), "trace container not found: /tmp/missing.trace (run 2)");
    }

    #[test]
    fn test_schema_parse_display() {
        let err = ConvertError::schema("time-profile", "missing sample-time column");
        assert!(err.to_string().contains("time-profile"));
        assert!(err.to_string().contains("missing sample-time column"));
    }
}
