//! Error types for the Flex core.
//!
//! Rendering never fails: a handler that cannot answer simply yields no value
//! and its component is skipped. The errors here cover the two places where
//! input is actually rejected, namely resolver registration and decoding of
//! persisted component records.

use thiserror::Error;

use crate::resolution::ResolutionModel;

// =============================================================================
// Registration Errors
// =============================================================================

/// Errors that can occur while registering handlers or extensions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// A handler was registered under an empty identifier.
    #[error("handler id must not be empty")]
    EmptyHandlerId,

    /// The registration targets the resolution model this deployment does not use.
    #[error("cannot register {kind} while the '{model}' resolution model is active")]
    WrongModel {
        /// What was being registered ("handler" or "extension").
        kind: &'static str,
        /// The model the deployment was configured with.
        model: ResolutionModel,
    },
}

// =============================================================================
// Record Errors
// =============================================================================

/// Errors produced while decoding a persisted component list.
#[derive(Debug, Error)]
pub enum RecordError {
    /// The document is not a well-formed list of `{handler, template}` records.
    #[error("malformed component list: {0}")]
    Syntax(#[from] serde_json::Error),

    /// A record names an empty handler id.
    #[error("component #{index}: handler id must not be empty")]
    EmptyHandler {
        /// Zero-based position of the record.
        index: usize,
    },

    /// A record's template contains the placeholder more than once.
    #[error(
        "component #{index}: template contains the placeholder '{placeholder}' {count} times, at most once is allowed"
    )]
    TooManyPlaceholders {
        /// Zero-based position of the record.
        index: usize,
        /// The configured placeholder token.
        placeholder: String,
        /// How many occurrences were found.
        count: usize,
    },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for registration operations.
pub type RegistrationResult<T> = Result<T, RegistrationError>;

/// Result type for record decoding.
pub type RecordResult<T> = Result<T, RecordError>;
