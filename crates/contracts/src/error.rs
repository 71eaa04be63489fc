//! Layered error definitions
//!
//! Categorized by source: config / stream load / registration / sink

use std::path::PathBuf;

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Stream Load Errors =====
    /// Record source could not be opened or read
    #[error("stream source '{path}' unreadable: {source}")]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A line in a record source is not a valid JSON object
    #[error("malformed record at {path}:{line}: {message}")]
    RecordParse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// A record lacks the required numeric `timestamp_ms` field
    #[error("record at {path}:{line} has no numeric '{field}' field")]
    MissingTimestamp {
        path: PathBuf,
        line: usize,
        field: &'static str,
    },

    /// A record carries a non-finite timestamp (NaN / infinity)
    #[error("record at {path}:{line} has non-finite timestamp {value}")]
    NonFiniteTimestamp {
        path: PathBuf,
        line: usize,
        value: f64,
    },

    // ===== Registration Errors =====
    /// A sensor name was registered twice
    #[error("sensor '{name}' is already registered")]
    DuplicateSensor { name: String },

    // ===== Sink Errors =====
    /// Sink write error
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    /// Sink connection error
    #[error("sink '{sink_name}' connection error: {message}")]
    SinkConnection { sink_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create record parse error
    pub fn record_parse(
        path: impl Into<PathBuf>,
        line: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::RecordParse {
            path: path.into(),
            line,
            message: message.into(),
        }
    }

    /// Create duplicate sensor registration error
    pub fn duplicate_sensor(name: impl Into<String>) -> Self {
        Self::DuplicateSensor { name: name.into() }
    }

    /// Create sink write error
    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    /// Create sink connection error
    pub fn sink_connection(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkConnection {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }
}
