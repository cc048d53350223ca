//! Error types for the growth_core library.

use crate::dose::DoseUnit;
use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for growth_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Measurement construction error (non-finite or non-positive value)
    #[error("Measurement error: {0}")]
    Measurement(String),

    /// Dose conversion between units that have no defined scaling path
    #[error("Unsupported dose conversion: {from} to {to}")]
    UnsupportedConversion { from: DoseUnit, to: DoseUnit },

    /// A conversion was invoked without a required patient input
    #[error("Missing input for calculation: {0}")]
    MissingInput(&'static str),

    /// Internal consistency violation. Indicates a bug in the calling
    /// wiring (an engine reached with data the validation gate should
    /// have rejected), never a user input problem.
    #[error("Internal consistency violation: {0}")]
    InternalInconsistency(String),
}
