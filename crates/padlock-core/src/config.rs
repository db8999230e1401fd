//! Padlock configuration.
//!
//! A configuration selects the access type, the keypad size and, for the
//! `custom` access type, a chain of accessor constructors:
//!
//! ```json
//! {
//!   "access_type": "custom",
//!   "keypad_size": 0,
//!   "instance": {
//!     "kind": "traced",
//!     "inner": { "kind": "padlock", "keypad_size": 5 }
//!   }
//! }
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Keypad size used when nothing else is configured
pub const DEFAULT_KEYPAD_SIZE: usize = 4;

/// Configuration used when no argument is given
const DEFAULT_CONFIGURATION: &str = include_str!("../config/padlock-configuration.json");

/// How the padlock is reached
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessType {
    /// In-process [`crate::Padlock`]
    #[default]
    Local,
    /// HTTP transport (not supported)
    ///
    /// Rejected by [`crate::PadlockBuilder`] rather than falling back to a local padlock.
    Rest,
    /// Socket transport (not supported)
    ///
    /// Rejected by [`crate::PadlockBuilder`] rather than falling back to a local padlock.
    Socket,
    /// External command transport (not supported)
    Cli,
    /// Accessor described by [`PadlockConfig::instance`]
    Custom,
}

impl AccessType {
    /// Returns the configuration name of the access type
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessType::Local => "local",
            AccessType::Rest => "rest",
            AccessType::Socket => "socket",
            AccessType::Cli => "cli",
            AccessType::Custom => "custom",
        }
    }
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Constructor chain for a custom accessor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InstanceSpec {
    /// Local padlock with a random passcode
    Padlock {
        /// Number of keys
        keypad_size: usize,
    },
    /// Local padlock with a known passcode
    Preset {
        /// The passcode, a permutation of `0..len`
        passcode: Vec<usize>,
    },
    /// Logging wrapper around another accessor
    Traced {
        /// The wrapped accessor
        inner: Box<InstanceSpec>,
    },
}

/// Top-level padlock configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PadlockConfig {
    /// Access type, defaults to `local`
    #[serde(default)]
    pub access_type: AccessType,
    /// Keypad size, defaults to [`DEFAULT_KEYPAD_SIZE`]
    #[serde(default = "default_keypad_size")]
    pub keypad_size: usize,
    /// Skip the write latency
    #[serde(default)]
    pub fast: bool,
    /// Accessor constructor chain for the `custom` access type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<InstanceSpec>,
}

fn default_keypad_size() -> usize {
    DEFAULT_KEYPAD_SIZE
}

impl Default for PadlockConfig {
    fn default() -> Self {
        Self {
            access_type: AccessType::default(),
            keypad_size: DEFAULT_KEYPAD_SIZE,
            fast: false,
            instance: None,
        }
    }
}

impl PadlockConfig {
    /// Local configuration with the given keypad size
    pub fn with_keypad_size(keypad_size: usize) -> Self {
        Self {
            keypad_size,
            ..Self::default()
        }
    }

    /// Parses a configuration from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| Error::config_read(path, e))?;
        debug!("Loaded configuration from {}", path.display());
        Self::from_json(&content)
    }

    /// The embedded default configuration
    pub fn embedded() -> Result<Self> {
        Self::from_json(DEFAULT_CONFIGURATION)
    }

    /// Resolves a configuration from a single command line argument.
    ///
    /// - no argument: the embedded default configuration
    /// - path to an existing file: that file, parsed as JSON
    /// - an integer: a local configuration with that keypad size
    /// - anything else: defaults, with a warning
    pub fn from_arg(arg: Option<&str>) -> Result<Self> {
        let Some(arg) = arg else {
            return Self::embedded();
        };

        let path = Path::new(arg);
        if path.is_file() {
            return Self::load(path);
        }

        match arg.trim().parse::<usize>() {
            Ok(keypad_size) => Ok(Self::with_keypad_size(keypad_size)),
            Err(e) => {
                warn!(
                    "Expected a configuration file or a keypad size, got '{}' ({}); using defaults",
                    arg, e
                );
                Ok(Self::default())
            }
        }
    }
}
