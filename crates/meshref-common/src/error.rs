//! Error types for meshref
//!
//! Resolution itself never fails: malformed hosts degrade to "no match".
//! Errors only surface at the edges, when decoding configuration or a
//! resource snapshot handed over by the input collaborator.

use thiserror::Error;

/// Default context value when no specific context is available
pub const UNKNOWN_CONTEXT: &str = "unknown";

/// Main error type for meshref operations
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid resolver configuration
    #[error("validation error for {field}: {message}")]
    Validation {
        /// The invalid field path (e.g., "identityDomain")
        field: String,
        /// Description of what's invalid
        message: String,
    },

    /// Serialization/deserialization error
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of what failed
        message: String,
        /// The document kind being decoded (if known)
        kind: Option<String>,
    },
}

impl Error {
    /// Create a validation error with the given message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            field: UNKNOWN_CONTEXT.to_string(),
            message: msg.into(),
        }
    }

    /// Create a validation error with a field path
    pub fn validation_for_field(field: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: msg.into(),
        }
    }

    /// Create a serialization error with the given message
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            kind: None,
        }
    }

    /// Create a serialization error with document kind context
    pub fn serialization_for_kind(kind: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            kind: Some(kind.into()),
        }
    }

    /// Get the field path if this is a validation error
    pub fn field(&self) -> Option<&str> {
        match self {
            Error::Validation { field, .. } => Some(field),
            Error::Serialization { .. } => None,
        }
    }

    /// Get the document kind if this is a serialization error
    pub fn kind(&self) -> Option<&str> {
        match self {
            Error::Validation { .. } => None,
            Error::Serialization { kind, .. } => kind.as_deref(),
        }
    }
}
