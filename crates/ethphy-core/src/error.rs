//! Error types for the Ethernet physical interface manager
//!
//! This module defines all error types used throughout the crate.

use crate::types::IntfId;
use thiserror::Error;

/// Result type alias for interface manager operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the interface manager
#[derive(Error, Debug)]
pub enum Error {
    /// The interface is not currently a member of the registry
    ///
    /// Recoverable: the interface may have been deleted between
    /// iteration and the query. Callers should treat it as "gone".
    #[error("Interface not found: {0}")]
    NotFound(IntfId),

    /// A scoped watch was requested for an interface the manager has never seen
    #[error("Invalid subscription target: {0}")]
    InvalidSubscriptionTarget(IntfId),

    /// The platform collaborator could not answer the query
    ///
    /// Fatal to the current query only, never to the registry.
    #[error("Platform unavailable: {0}")]
    Unavailable(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O errors from platform backends
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a "not found" error for an interface
    pub fn not_found(intf_id: &IntfId) -> Self {
        Self::NotFound(intf_id.clone())
    }

    /// Create a platform unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Returns true if this error reports a missing interface
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
