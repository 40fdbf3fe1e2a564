use thiserror::Error;

use crate::util::SchemaError;

/// Structured error type for schemadiff library operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Database connection failed: {message}")]
    Connection { message: String },

    #[error("Metadata query failed: {message}")]
    Query { message: String },

    #[error("Metadata row could not be decoded: {message}")]
    Scan { message: String },

    #[error("Invalid configuration: {message}")]
    Config { message: String },

    #[error("Snapshot failed: {message}")]
    Snapshot { message: String },

    #[error("Invalid schema source: {schema_source}")]
    InvalidSource { schema_source: String },

    #[error("Invalid filter pattern: {pattern}")]
    InvalidFilter { pattern: String },

    #[error("Runtime error: {message}")]
    Runtime { message: String },
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn invalid_source(schema_source: impl Into<String>) -> Self {
        Self::InvalidSource {
            schema_source: schema_source.into(),
        }
    }

    pub fn invalid_filter(pattern: impl Into<String>) -> Self {
        Self::InvalidFilter {
            pattern: pattern.into(),
        }
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime {
            message: message.into(),
        }
    }
}

impl From<SchemaError> for Error {
    fn from(err: SchemaError) -> Self {
        let message = err.to_string();
        match err {
            SchemaError::Connectivity(_) => Self::Connection { message },
            SchemaError::Query { .. } => Self::Query { message },
            SchemaError::Scan { .. } => Self::Scan { message },
            SchemaError::Config(_) => Self::Config { message },
            SchemaError::Snapshot(_) => Self::Snapshot { message },
        }
    }
}
