//! Error types for the dynv6 updater
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for dynv6 operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the dynv6 updater
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed address string
    #[error("Parse error: {0}")]
    Parse(String),

    /// The zone list fetch was rejected with 401 or 403
    #[error("Authentication failed (HTTP {status}): check the API token")]
    Authentication {
        /// HTTP status returned by the API
        status: u16,
    },

    /// No zone in the account matches any suffix of the hostname
    #[error("Zone not found for {hostname}")]
    ZoneNotFound {
        /// Hostname that was being resolved
        hostname: String,
    },

    /// The zone exists but holds no record of the requested type and name
    #[error("{record_type} record for {hostname} not found in zone {zone}")]
    RecordNotFound {
        /// Hostname that was being resolved
        hostname: String,
        /// Zone the hostname resolved to
        zone: String,
        /// Requested record type
        record_type: String,
    },

    /// An HTTP call could not complete
    #[error("Transport error: {0}")]
    Transport(String),

    /// A PATCH was answered with a non-200 status
    #[error("Update rejected (HTTP {status}): {message}")]
    UpdateRejected {
        /// HTTP status returned by the API
        status: u16,
        /// What was being updated
        message: String,
    },

    /// A read call returned a non-200, non-auth status
    #[error("API error (HTTP {status}) while {context}")]
    Api {
        /// HTTP status returned by the API
        status: u16,
        /// What was being fetched
        context: String,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an API error for a failed read
    pub fn api(status: u16, context: impl Into<String>) -> Self {
        Self::Api {
            status,
            context: context.into(),
        }
    }
}
