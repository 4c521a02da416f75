//! Error types for the webhook
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for webhook operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the webhook
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors (missing base URL, conflicting credentials, ...)
    #[error("Configuration error: {0}")]
    Config(String),

    /// No zone name is contained in the record name
    #[error("no matching zone found for {0}")]
    ZoneNotFound(String),

    /// No existing record set matches name and type
    #[error("record set not found: {name} (type: {record_type})")]
    RecordSetNotFound {
        /// Record set name
        name: String,
        /// Record type
        record_type: String,
    },

    /// Non-2xx response from the remote API
    #[error("upstream API error ({status}): {message}")]
    UpstreamApi {
        /// HTTP status code
        status: u16,
        /// Message extracted from the response body
        message: String,
    },

    /// Response body does not parse as the expected schema
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The request never produced a response (connect, timeout, TLS, ...)
    #[error("transport error: {0}")]
    Transport(String),

    /// The operation's context was cancelled
    #[error("context cancelled")]
    Cancelled,

    /// The operation's context deadline passed
    #[error("context deadline exceeded")]
    DeadlineExceeded,

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a "zone not found" error
    pub fn zone_not_found(name: impl Into<String>) -> Self {
        Self::ZoneNotFound(name.into())
    }

    /// Create a "record set not found" error
    pub fn record_set_not_found(name: impl Into<String>, record_type: impl Into<String>) -> Self {
        Self::RecordSetNotFound {
            name: name.into(),
            record_type: record_type.into(),
        }
    }

    /// Create an upstream API error
    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        Self::UpstreamApi {
            status,
            message: message.into(),
        }
    }

    /// Create a malformed response error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// True when the remote API rejected the call with 429
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::UpstreamApi { status: 429, .. })
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
