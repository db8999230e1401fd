//! Passcode search over a [`PadlockAccessor`].
//!
//! ## Algorithm Overview
//!
//! The cracker enumerates permutations of `0..size` depth first:
//!
//! 1. At depth `d`, try each unused key index in ascending order
//! 2. Write it to address `d` (one real write per attempt)
//! 3. Recurse to depth `d + 1`
//! 4. At depth `size` every address has been written along the current path,
//!    so the buffer is complete and duplicate free: check it
//! 5. Stop at the first permutation the padlock accepts
//!
//! A failed candidate is never erased from the buffer; it is overwritten by
//! the next candidate at the same address. The padlock keeps one shared,
//! non-resettable buffer, so the search runs on a single thread.

use crate::accessor::PadlockAccessor;
use crate::error::Result;
use tracing::{debug, info, trace};

/// Per-invocation search state
#[derive(Debug)]
struct SearchState {
    /// Permutation under construction, indexed by address
    attempt: Vec<usize>,
    /// Key indices assigned on the active path
    used: Vec<bool>,
}

impl SearchState {
    fn new(size: usize) -> Self {
        Self {
            attempt: vec![0; size],
            used: vec![false; size],
        }
    }
}

/// Depth-first backtracking cracker
#[derive(Debug)]
pub struct Cracker<'a, A: PadlockAccessor + ?Sized> {
    accessor: &'a mut A,
}

impl<'a, A: PadlockAccessor + ?Sized> Cracker<'a, A> {
    /// Creates a cracker that owns the accessor for the whole session
    pub fn new(accessor: &'a mut A) -> Self {
        Self { accessor }
    }

    /// Run the search.
    ///
    /// Returns the passcode, which the padlock's buffer also holds on return,
    /// or `None` if no permutation was accepted. Accessor errors abort the
    /// search.
    pub fn crack(&mut self) -> Result<Option<Vec<usize>>> {
        let size = self.accessor.size();
        debug!("Starting search over {} keys", size);

        let mut state = SearchState::new(size);
        if self.backtrack(&mut state, 0)? {
            info!("Cracked the code: {:?}", state.attempt);
            Ok(Some(state.attempt))
        } else {
            debug!("Search exhausted without a match");
            Ok(None)
        }
    }

    fn backtrack(&mut self, state: &mut SearchState, depth: usize) -> Result<bool> {
        let size = state.attempt.len();
        if depth == size {
            return self.accessor.check();
        }

        for candidate in 0..size {
            if state.used[candidate] {
                continue;
            }
            state.used[candidate] = true;
            state.attempt[depth] = candidate;
            trace!("Depth {}: trying {}", depth, candidate);
            self.accessor.write(depth, candidate)?;

            if self.backtrack(state, depth + 1)? {
                return Ok(true);
            }
            state.used[candidate] = false;
        }
        Ok(false)
    }
}

/// Crack the padlock behind `accessor`
///
/// Convenience wrapper around [`Cracker::crack`].
pub fn crack<A: PadlockAccessor + ?Sized>(accessor: &mut A) -> Result<Option<Vec<usize>>> {
    Cracker::new(accessor).crack()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::lock::{Padlock, WriteLatency};
    use pretty_assertions::assert_eq;

    fn fast_padlock(passcode: Vec<usize>) -> Padlock {
        Padlock::with_passcode(passcode)
            .unwrap()
            .with_latency(WriteLatency::none())
    }

    #[test]
    fn test_identity_passcode_takes_one_write_per_address() {
        let mut padlock = fast_padlock(vec![0, 1, 2, 3]);
        assert_eq!(crack(&mut padlock).unwrap(), Some(vec![0, 1, 2, 3]));
        assert_eq!(padlock.write_count(), 4);
        assert_eq!(padlock.check_count(), 1);
    }

    #[test]
    fn test_write_and_check_counts() {
        let mut padlock = fast_padlock(vec![1, 0, 2]);
        assert_eq!(crack(&mut padlock).unwrap(), Some(vec![1, 0, 2]));
        // [0,1,2], [0,2,1] rejected, then [1,0,2]
        assert_eq!(padlock.write_count(), 8);
        assert_eq!(padlock.check_count(), 3);
    }

    #[test]
    fn test_single_key() {
        let mut padlock = fast_padlock(vec![0]);
        assert_eq!(crack(&mut padlock).unwrap(), Some(vec![0]));
    }

    /// Accessor whose passcode is unreachable
    struct NeverOpens {
        size: usize,
        writes: u64,
        checks: u64,
    }

    impl PadlockAccessor for NeverOpens {
        fn size(&self) -> usize {
            self.size
        }

        fn write(&mut self, _address: usize, _key_index: usize) -> Result<Option<usize>> {
            self.writes += 1;
            Ok(None)
        }

        fn check(&mut self) -> Result<bool> {
            self.checks += 1;
            Ok(false)
        }

        fn write_count(&self) -> u64 {
            self.writes
        }

        fn check_count(&self) -> u64 {
            self.checks
        }

        fn reset_counters(&mut self) {
            self.writes = 0;
            self.checks = 0;
        }
    }

    #[test]
    fn test_not_found_after_exhausting_permutations() {
        let mut accessor = NeverOpens {
            size: 3,
            writes: 0,
            checks: 0,
        };
        assert_eq!(crack(&mut accessor).unwrap(), None);
        assert_eq!(accessor.check_count(), 6);
        // 3 + 3*2 + 3*2*1
        assert_eq!(accessor.write_count(), 15);
    }

    #[test]
    fn test_accessor_error_aborts_search() {
        struct Broken;

        impl PadlockAccessor for Broken {
            fn size(&self) -> usize {
                2
            }

            fn write(&mut self, address: usize, _key_index: usize) -> Result<Option<usize>> {
                Err(Error::AddressOutOfRange { address, size: 0 })
            }

            fn check(&mut self) -> Result<bool> {
                Ok(true)
            }

            fn write_count(&self) -> u64 {
                0
            }

            fn check_count(&self) -> u64 {
                0
            }

            fn reset_counters(&mut self) {}
        }

        assert!(matches!(
            crack(&mut Broken),
            Err(Error::AddressOutOfRange { address: 0, .. })
        ));
    }
}
