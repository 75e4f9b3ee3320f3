//! Error types for jwst-rust

use thiserror::Error;

/// Result type for jwst-rust operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when using jwst-rust
#[derive(Error, Debug)]
pub enum Error {
    /// Input segments disagree on an exposure configuration field
    #[error("exposure configuration mismatch: {field} differs between input segments")]
    ConfigMismatch { field: &'static str },

    /// Not enough observed packets to fit a timing model
    #[error("insufficient data to fit model: {0}")]
    InsufficientData(String),

    /// Frame-index query with an out-of-domain integration or group index
    #[error("invalid frame index request: integration={integration}, group={group}")]
    InvalidIndex { integration: i64, group: i64 },

    /// Exposure configuration with non-physical values
    #[error("invalid exposure configuration: {0}")]
    InvalidConfig(String),

    /// MAST API token missing or malformed
    #[error("MAST API token is not {0}")]
    InvalidToken(String),

    /// Service rejected the MAST API token
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Time value that could not be parsed
    #[error("unable to parse time specification: {0}")]
    TimeParse(String),

    /// Malformed record in an EDB payload
    #[error("malformed EDB record: {0}")]
    MalformedRecord(String),

    /// EDB value type outside the supported enumeration
    #[error("unsupported EDB value type: {0}")]
    UnsupportedType(String),

    /// Query built or used incorrectly
    #[error("query error: {0}")]
    Query(String),

    /// Configuration file error
    #[error("configuration error: {0}")]
    Configuration(String),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// CSV read/write error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
