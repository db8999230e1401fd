//! The capability set a cracker needs from a padlock.
//!
//! [`PadlockAccessor`] abstracts over how the padlock is reached. The local
//! [`Padlock`] model implements it directly; [`TracedPadlock`] wraps any other
//! accessor and logs every call.
//!
//! ```
//! use padlock_core::{Padlock, PadlockAccessor, TracedPadlock, WriteLatency};
//!
//! let padlock = Padlock::with_passcode(vec![1, 0])?.with_latency(WriteLatency::none());
//! let mut accessor = TracedPadlock::new(padlock);
//! accessor.write(0, 1)?;
//! accessor.write(1, 0)?;
//! assert!(accessor.check()?);
//! # Ok::<(), padlock_core::Error>(())
//! ```

use crate::error::Result;
use crate::lock::Padlock;
use tracing::{debug, info};

/// Operations available on any padlock, local or otherwise.
///
/// Every mutating operation takes `&mut self`: an accessor is owned by a
/// single cracking session at a time.
pub trait PadlockAccessor {
    /// Number of keys on the numpad
    fn size(&self) -> usize;

    /// Write `key_index` at `address`, returning the previous value
    fn write(&mut self, address: usize, key_index: usize) -> Result<Option<usize>>;

    /// Check whether the input buffer holds the correct passcode
    fn check(&mut self) -> Result<bool>;

    /// Accepted writes since creation or the last reset
    fn write_count(&self) -> u64;

    /// Valid checks since creation or the last reset
    fn check_count(&self) -> u64;

    /// Zero both counters
    fn reset_counters(&mut self);
}

impl PadlockAccessor for Padlock {
    fn size(&self) -> usize {
        Padlock::size(self)
    }

    fn write(&mut self, address: usize, key_index: usize) -> Result<Option<usize>> {
        Padlock::write(self, address, key_index)
    }

    fn check(&mut self) -> Result<bool> {
        Padlock::check(self)
    }

    fn write_count(&self) -> u64 {
        Padlock::write_count(self)
    }

    fn check_count(&self) -> u64 {
        Padlock::check_count(self)
    }

    fn reset_counters(&mut self) {
        Padlock::reset_counters(self)
    }
}

macro_rules! forward_accessor {
    ($($ty:ty),*) => {$(
        impl<A: PadlockAccessor + ?Sized> PadlockAccessor for $ty {
            fn size(&self) -> usize {
                (**self).size()
            }

            fn write(&mut self, address: usize, key_index: usize) -> Result<Option<usize>> {
                (**self).write(address, key_index)
            }

            fn check(&mut self) -> Result<bool> {
                (**self).check()
            }

            fn write_count(&self) -> u64 {
                (**self).write_count()
            }

            fn check_count(&self) -> u64 {
                (**self).check_count()
            }

            fn reset_counters(&mut self) {
                (**self).reset_counters()
            }
        }
    )*};
}

forward_accessor!(&mut A, Box<A>);

/// Accessor decorator that logs every call through `tracing`
#[derive(Debug)]
pub struct TracedPadlock<A> {
    inner: A,
}

impl<A: PadlockAccessor> TracedPadlock<A> {
    /// Wraps an accessor
    pub fn new(inner: A) -> Self {
        Self { inner }
    }

    /// Returns the wrapped accessor
    pub fn into_inner(self) -> A {
        self.inner
    }
}

impl<A: PadlockAccessor> PadlockAccessor for TracedPadlock<A> {
    fn size(&self) -> usize {
        self.inner.size()
    }

    fn write(&mut self, address: usize, key_index: usize) -> Result<Option<usize>> {
        let result = self.inner.write(address, key_index);
        match &result {
            Ok(previous) => debug!(
                "write({}, {}) -> previous {:?} (writes: {})",
                address,
                key_index,
                previous,
                self.inner.write_count()
            ),
            Err(e) => debug!("write({}, {}) rejected: {}", address, key_index, e),
        }
        result
    }

    fn check(&mut self) -> Result<bool> {
        let result = self.inner.check();
        match &result {
            Ok(true) => info!("check -> open (checks: {})", self.inner.check_count()),
            Ok(false) => debug!("check -> closed (checks: {})", self.inner.check_count()),
            Err(e) => debug!("check rejected: {}", e),
        }
        result
    }

    fn write_count(&self) -> u64 {
        self.inner.write_count()
    }

    fn check_count(&self) -> u64 {
        self.inner.check_count()
    }

    fn reset_counters(&mut self) {
        debug!("reset counters");
        self.inner.reset_counters()
    }
}
