//! # padlock-core
//!
//! A simulated numpad padlock and a cracker that discovers its passcode.
//!
//! The padlock's input buffer is expensive to write and cheap to verify, and
//! it is never reset between attempts. This crate provides:
//! - The padlock model with its latency and validation rules
//! - A depth-first backtracking cracker over any padlock accessor
//! - Configuration loading and an accessor factory
//!
//! ## Architecture
//!
//! - [`lock`]: The padlock model and write latency
//! - [`accessor`]: The capability trait consumed by the cracker
//! - [`cracker`]: The backtracking search
//! - [`config`]: JSON and command line configuration
//! - [`builder`]: Builds accessors from configuration
//! - [`error`]: Error types and handling
//!
//! ## Example
//!
//! ```
//! use padlock_core::{crack, Padlock, WriteLatency};
//!
//! let mut padlock = Padlock::new(5)?.with_latency(WriteLatency::none());
//! let passcode = crack(&mut padlock)?.expect("a permutation always opens the lock");
//!
//! assert_eq!(passcode.len(), 5);
//! assert!(padlock.check()?);
//! # Ok::<(), padlock_core::Error>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod accessor;
pub mod builder;
pub mod config;
pub mod cracker;
pub mod error;
pub mod lock;

// Re-export primary types for convenience
pub use accessor::{PadlockAccessor, TracedPadlock};
pub use builder::PadlockBuilder;
pub use config::{AccessType, InstanceSpec, PadlockConfig, DEFAULT_KEYPAD_SIZE};
pub use cracker::{crack, Cracker};
pub use error::{BufferFault, Error, Result};
pub use lock::{Padlock, WriteLatency};

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
