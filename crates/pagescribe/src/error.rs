//! Error types for the pagescribe core.
//!
//! Heuristic misses are not errors: a fragment that fails a shape check is
//! simply left out of the record. The enums here cover the few conditions a
//! caller has to hear about.

/// Errors raised while loading or compiling configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid pattern for {field}: {source}")]
    Pattern {
        field: &'static str,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Errors raised while building a document.
#[derive(thiserror::Error, Debug)]
pub enum DocumentError {
    #[error("Document has no root element")]
    Empty,
}

/// Terminal failures of an apply pass. None of these mutate the document.
#[derive(thiserror::Error, Debug)]
pub enum ApplyError {
    #[error("Nothing to apply")]
    Empty,

    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Expected a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// Convenience result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;
