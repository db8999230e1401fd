//! Simulated hardware latency for padlock writes.
//!
//! Every write to the input buffer makes the hardware resolve a memory
//! address, which takes about a second. [`WriteLatency`] reproduces that cost
//! as a blocking pause, or skips it entirely in fast mode.

use std::time::{Duration, Instant};
use tracing::trace;

/// Delay paid by every write in production mode
pub const DEFAULT_WRITE_DELAY: Duration = Duration::from_millis(1000);

/// Environment variable that switches every padlock into fast mode
pub const FAST_MODE_ENV: &str = "PADLOCK_FAST";

/// Per-write pause applied by a [`super::Padlock`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteLatency {
    delay: Duration,
}

impl Default for WriteLatency {
    fn default() -> Self {
        Self {
            delay: DEFAULT_WRITE_DELAY,
        }
    }
}

impl WriteLatency {
    /// Latency with a custom delay
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// No latency at all (fast mode)
    pub fn none() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Default latency, unless `PADLOCK_FAST=true` is set in the environment
    pub fn from_env() -> Self {
        let fast = std::env::var(FAST_MODE_ENV)
            .map(|value| value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        if fast {
            Self::none()
        } else {
            Self::default()
        }
    }

    /// Returns the configured delay
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Returns true if writes are not delayed
    pub fn is_fast(&self) -> bool {
        self.delay.is_zero()
    }

    /// Block until the full delay has elapsed.
    ///
    /// A sleep that wakes early is resumed for the remaining time, so the
    /// caller always pays at least `delay`.
    pub fn pause(&self) {
        if self.is_fast() {
            return;
        }
        let deadline = Instant::now() + self.delay;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            trace!("Write latency: sleeping {:?}", remaining);
            std::thread::sleep(remaining);
        }
    }
}
