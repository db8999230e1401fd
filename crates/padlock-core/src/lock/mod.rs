//! Logical model of a physical padlock with a numpad.
//!
//! ## Lock Rules
//!
//! - Every key on the numpad is used exactly once, so a valid code is a
//!   permutation of `0..size` (`1234` and `1432` are valid, `112` is not)
//! - Writing to the input buffer is expensive: each write pays a
//!   [`WriteLatency`], even when it is rejected
//! - Asking whether the buffer holds the correct passcode is cheap
//! - The input buffer is never reset, not even after a failed check
//!
//! After construction the input buffer is empty and must be filled through
//! [`Padlock::write`] before [`Padlock::check`] will accept it.

mod latency;

use crate::error::{BufferFault, Error, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, trace};

pub use latency::{WriteLatency, DEFAULT_WRITE_DELAY, FAST_MODE_ENV};

/// A padlock with a hidden passcode and a persistent input buffer
#[derive(Debug)]
pub struct Padlock {
    size: usize,
    passcode: Vec<usize>,
    buffer: Vec<Option<usize>>,
    write_count: u64,
    check_count: u64,
    latency: WriteLatency,
}

impl Padlock {
    /// Creates a padlock with `size` keys and a randomly shuffled passcode
    pub fn new(size: usize) -> Result<Self> {
        Self::with_rng(size, &mut rand::thread_rng())
    }

    /// Creates a padlock whose passcode is shuffled with the given RNG
    pub fn with_rng<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Result<Self> {
        if size < 1 {
            return Err(Error::InvalidKeypadSize { size });
        }
        let mut passcode: Vec<usize> = (0..size).collect();
        passcode.shuffle(rng);
        Ok(Self::from_parts(passcode))
    }

    /// Creates a padlock with a known passcode.
    ///
    /// The passcode must be a permutation of `0..passcode.len()`.
    pub fn with_passcode(passcode: Vec<usize>) -> Result<Self> {
        let size = passcode.len();
        if size < 1 {
            return Err(Error::InvalidKeypadSize { size });
        }
        let mut seen = vec![false; size];
        for &key in &passcode {
            if key >= size {
                return Err(Error::invalid_passcode(format!(
                    "key {key} is outside 0..{size}"
                )));
            }
            if seen[key] {
                return Err(Error::invalid_passcode(format!("key {key} is repeated")));
            }
            seen[key] = true;
        }
        Ok(Self::from_parts(passcode))
    }

    fn from_parts(passcode: Vec<usize>) -> Self {
        let size = passcode.len();
        debug!("Created padlock with {} keys", size);
        Self {
            size,
            passcode,
            buffer: vec![None; size],
            write_count: 0,
            check_count: 0,
            latency: WriteLatency::from_env(),
        }
    }

    /// Replaces the write latency
    pub fn with_latency(mut self, latency: WriteLatency) -> Self {
        self.latency = latency;
        self
    }

    /// Number of keys on the numpad, and of addresses in the buffer
    pub fn size(&self) -> usize {
        self.size
    }

    /// The write latency in effect
    pub fn latency(&self) -> WriteLatency {
        self.latency
    }

    /// Write a key index into the input buffer. This is a very expensive operation.
    ///
    /// Returns the value previously stored at `address`, `None` if the slot
    /// was never written. The latency is paid before validation, so rejected
    /// calls cost as much as accepted ones.
    pub fn write(&mut self, address: usize, key_index: usize) -> Result<Option<usize>> {
        self.latency.pause();
        if key_index >= self.size {
            return Err(Error::KeyIndexOutOfRange {
                key_index,
                size: self.size,
            });
        }
        if address >= self.size {
            return Err(Error::AddressOutOfRange {
                address,
                size: self.size,
            });
        }
        self.write_count += 1;
        trace!("Write buffer[{}] = {}", address, key_index);
        Ok(self.buffer[address].replace(key_index))
    }

    /// Check whether the input buffer holds the correct passcode.
    ///
    /// Fails with [`Error::InvalidBuffer`] if a slot is unset or a key index
    /// repeats; the check counter only moves for valid buffers.
    pub fn check(&mut self) -> Result<bool> {
        let mut seen = vec![false; self.size];
        for (address, &slot) in self.buffer.iter().enumerate() {
            let key_index = slot.ok_or(Error::InvalidBuffer {
                reason: BufferFault::Uninitialized { address },
            })?;
            if seen[key_index] {
                return Err(Error::InvalidBuffer {
                    reason: BufferFault::Duplicated { key_index },
                });
            }
            seen[key_index] = true;
        }
        self.check_count += 1;

        let correct = self
            .buffer
            .iter()
            .zip(&self.passcode)
            .all(|(slot, key)| *slot == Some(*key));
        trace!("Check #{}: {}", self.check_count, correct);
        Ok(correct)
    }

    /// Number of accepted writes since creation or the last reset
    pub fn write_count(&self) -> u64 {
        self.write_count
    }

    /// Number of valid checks since creation or the last reset
    pub fn check_count(&self) -> u64 {
        self.check_count
    }

    /// Zero both counters; the buffer and passcode are untouched
    pub fn reset_counters(&mut self) {
        self.write_count = 0;
        self.check_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::{Duration, Instant};

    fn fast(padlock: Padlock) -> Padlock {
        padlock.with_latency(WriteLatency::none())
    }

    #[test]
    fn test_rejects_zero_size() {
        assert!(matches!(
            Padlock::new(0),
            Err(Error::InvalidKeypadSize { size: 0 })
        ));
        assert!(Padlock::new(1).is_ok());
        assert!(Padlock::new(500).is_ok());
    }

    #[test]
    fn test_passcode_is_permutation() {
        let mut rng = StdRng::seed_from_u64(7);
        let padlock = Padlock::with_rng(9, &mut rng).unwrap();
        let mut sorted = padlock.passcode.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..9).collect::<Vec<_>>());
    }

    #[test]
    fn test_with_passcode_validation() {
        assert!(Padlock::with_passcode(vec![2, 0, 1]).is_ok());
        assert!(matches!(
            Padlock::with_passcode(vec![]),
            Err(Error::InvalidKeypadSize { size: 0 })
        ));
        assert!(matches!(
            Padlock::with_passcode(vec![0, 0, 1]),
            Err(Error::InvalidPasscode { .. })
        ));
        assert!(matches!(
            Padlock::with_passcode(vec![0, 3, 1]),
            Err(Error::InvalidPasscode { .. })
        ));
    }

    #[test]
    fn test_first_writes_return_none() {
        let mut padlock = fast(Padlock::with_passcode(vec![4, 3, 2, 1, 0]).unwrap());
        for i in 0..5 {
            assert_eq!(padlock.write(i, i).unwrap(), None);
        }
        assert!(!padlock.check().unwrap());
        assert_eq!(padlock.write(0, 4).unwrap(), Some(0));
        assert_eq!(padlock.write_count(), 6);
    }

    #[test]
    fn test_reject_invalid_buffer() {
        let mut padlock = fast(Padlock::new(5).unwrap());
        for i in 0..3 {
            padlock.write(i, i).unwrap();
        }
        assert!(matches!(
            padlock.check(),
            Err(Error::InvalidBuffer {
                reason: BufferFault::Uninitialized { address: 3 }
            })
        ));
        for i in 0..2 {
            padlock.write(i + 3, i).unwrap();
        }
        assert!(matches!(
            padlock.check(),
            Err(Error::InvalidBuffer {
                reason: BufferFault::Duplicated { key_index: 0 }
            })
        ));
        for i in 0..2 {
            padlock.write(i + 3, i + 3).unwrap();
        }
        assert!(padlock.check().is_ok());
        assert_eq!(padlock.check_count(), 1);
    }

    #[test]
    fn test_reject_out_of_range_write() {
        let mut padlock = fast(Padlock::new(5).unwrap());
        for address in [5, 50] {
            assert!(matches!(
                padlock.write(address, 1),
                Err(Error::AddressOutOfRange { .. })
            ));
        }
        for key_index in [5, 50] {
            assert!(matches!(
                padlock.write(1, key_index),
                Err(Error::KeyIndexOutOfRange { .. })
            ));
        }
        // key index is validated before the address
        assert!(matches!(
            padlock.write(50, 5),
            Err(Error::KeyIndexOutOfRange { .. })
        ));
        assert_eq!(padlock.write_count(), 0);
        assert!(padlock.buffer.iter().all(Option::is_none));
    }

    #[test]
    fn test_check_verdict() {
        let mut padlock = fast(Padlock::with_passcode(vec![1, 0, 2]).unwrap());
        padlock.write(0, 0).unwrap();
        padlock.write(1, 1).unwrap();
        padlock.write(2, 2).unwrap();
        assert!(!padlock.check().unwrap());
        padlock.write(0, 1).unwrap();
        padlock.write(1, 0).unwrap();
        assert!(padlock.check().unwrap());
        assert_eq!(padlock.check_count(), 2);
    }

    #[test]
    fn test_reset_counters_keeps_buffer() {
        let mut padlock = fast(Padlock::with_passcode(vec![0, 1]).unwrap());
        padlock.write(0, 0).unwrap();
        padlock.write(1, 1).unwrap();
        assert!(padlock.check().unwrap());

        padlock.reset_counters();
        assert_eq!(padlock.write_count(), 0);
        assert_eq!(padlock.check_count(), 0);
        assert_eq!(padlock.buffer, vec![Some(0), Some(1)]);
        assert!(padlock.check().unwrap());
    }

    #[test]
    fn test_rejected_write_pays_latency() {
        let delay = Duration::from_millis(20);
        let mut padlock = Padlock::new(3)
            .unwrap()
            .with_latency(WriteLatency::new(delay));
        assert_eq!(padlock.latency().delay(), delay);

        let start = Instant::now();
        assert!(padlock.write(9, 0).is_err());
        assert!(padlock.write(0, 9).is_err());
        assert!(start.elapsed() >= delay * 2);
        assert_eq!(padlock.write_count(), 0);
    }
}
