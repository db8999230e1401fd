//! Error types for the padlock-core library.
//!
//! This module provides error handling using the `thiserror` crate, with
//! variants for configuration failures and for per-call misuse of a padlock.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for padlock operations
pub type Result<T> = std::result::Result<T, Error>;

/// Why a buffer was rejected by a passcode check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferFault {
    /// The slot at this address was never written
    Uninitialized {
        /// First unset address
        address: usize,
    },
    /// This key index occupies more than one slot
    Duplicated {
        /// The repeated key index
        key_index: usize,
    },
}

impl fmt::Display for BufferFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized { address } => {
                write!(f, "uninitialized value at address {address}")
            }
            Self::Duplicated { key_index } => write!(f, "duplicated value {key_index}"),
        }
    }
}

/// Error type for all padlock operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Keypad size must be at least one
    #[error("keypad size must be a positive number, got {size}")]
    InvalidKeypadSize {
        /// The rejected size
        size: usize,
    },

    /// An injected passcode is not a permutation of its key range
    #[error("invalid preset passcode: {details}")]
    InvalidPasscode {
        /// What is wrong with it
        details: String,
    },

    /// Write address outside `[0, size)`
    #[error("address out of range. Keypad size: {size}, address: {address}")]
    AddressOutOfRange {
        /// The rejected address
        address: usize,
        /// Keypad size of the lock
        size: usize,
    },

    /// Key index outside `[0, size)`
    #[error("keyIndex out of range. Keypad size: {size}, keyIndex: {key_index}")]
    KeyIndexOutOfRange {
        /// The rejected key index
        key_index: usize,
        /// Keypad size of the lock
        size: usize,
    },

    /// Passcode check on an incomplete or duplicate-containing buffer
    #[error("invalid passcode: {reason}")]
    InvalidBuffer {
        /// What made the buffer invalid
        reason: BufferFault,
    },

    /// Access type that has no accessor implementation
    #[error("this padlock access type is not supported: {access_type}")]
    UnsupportedAccessType {
        /// Name of the access type
        access_type: String,
    },

    /// Failed to read a configuration file
    #[error("failed to read configuration '{path}': {source}")]
    ConfigRead {
        /// Path to the configuration file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Configuration is not valid JSON for [`crate::PadlockConfig`]
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

impl Error {
    /// Creates a new invalid passcode error
    pub fn invalid_passcode(details: impl Into<String>) -> Self {
        Self::InvalidPasscode {
            details: details.into(),
        }
    }

    /// Creates a new configuration read error
    pub fn config_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ConfigRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a new unsupported access type error
    pub fn unsupported_access_type(access_type: impl fmt::Display) -> Self {
        Self::UnsupportedAccessType {
            access_type: access_type.to_string(),
        }
    }

    /// Returns true if the error was caused by a single bad call on an
    /// otherwise healthy padlock, leaving its state untouched
    pub fn is_misuse(&self) -> bool {
        matches!(
            self,
            Self::AddressOutOfRange { .. }
                | Self::KeyIndexOutOfRange { .. }
                | Self::InvalidBuffer { .. }
        )
    }
}
