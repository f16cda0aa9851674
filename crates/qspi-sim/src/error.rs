//! Error types for the simulated HAL

use thiserror::Error;

/// Errors from parsing simulator options
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimError {
    /// Option value could not be parsed
    #[error("Invalid value for sim option '{key}': {value}")]
    InvalidValue {
        /// Option name
        key: String,
        /// Offending value
        value: String,
    },

    /// Unknown protocol capability name
    #[error("Unknown capability '{0}' (expected single, dual or quad)")]
    UnknownCapability(String),
}

/// Result type for simulator option parsing
pub type Result<T> = std::result::Result<T, SimError>;
