//! Runtime error types.

use std::path::PathBuf;

use flex_core::{RecordError, RegistrationError};
use thiserror::Error;

use crate::config::ConfigError;
use crate::store::Slot;

// =============================================================================
// Store Errors
// =============================================================================

/// Errors from loading, reloading or resetting a slot configuration.
///
/// Every variant leaves the slot's active components unchanged.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The candidate references handler ids nothing can resolve.
    #[error("{slot} configuration references unknown handlers: {}", ids.join(", "))]
    Unresolved {
        slot: Slot,
        /// Sorted, without duplicates.
        ids: Vec<String>,
    },

    /// The slot file does not exist.
    #[error("configuration file not found: {}", path.display())]
    Missing { path: PathBuf },

    /// Reading or writing the slot file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The slot file is not a valid component list.
    #[error("invalid configuration in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: RecordError,
    },

    /// Components could not be serialized for writing.
    #[error("failed to encode {slot} configuration: {source}")]
    Encode {
        slot: Slot,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Runtime Errors
// =============================================================================

/// Errors that can occur while building or driving the runtime.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Another runtime instance is still alive in this process.
    #[error("a Flex runtime is already initialized in this process")]
    AlreadyInitialized,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
