use portable_atomic::{AtomicI32, Ordering};
use users_tonic_core::{Error, Result, types::UserId};

/// Process-wide id allocator for stored users.
///
/// Each call to [`allocate`](Self::allocate) is a single atomic
/// read-modify-write, so concurrent creators (unary calls and items of a
/// client stream alike) never observe the same id. The counter only moves
/// forward; ids freed by deletion are never handed out again.
#[derive(Debug)]
pub struct IdSequence {
    next: AtomicI32,
}

impl IdSequence {
    /// Creates a sequence whose first allocation returns `first`.
    pub const fn starting_at(first: UserId) -> Self {
        Self {
            next: AtomicI32::new(first),
        }
    }

    /// Returns the next id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IdSpaceExhausted`] once the counter would have to
    /// wrap past `i32::MAX`, instead of reissuing ids.
    pub fn allocate(&self) -> Result<UserId> {
        self.next
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
                current.checked_add(1)
            })
            .map_err(|_| Error::IdSpaceExhausted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn allocations_strictly_increase() -> Result<()> {
        let seq = IdSequence::starting_at(3);
        let mut last = 2;
        for _ in 0..1_000 {
            let id = seq.allocate()?;
            assert!(id > last, "id {id} not greater than {last}");
            last = id;
        }
        assert_eq!(last, 1_002);
        Ok(())
    }

    #[test]
    fn exhaustion_is_an_error_not_a_wrap() {
        let seq = IdSequence::starting_at(UserId::MAX - 1);
        assert_eq!(seq.allocate(), Ok(UserId::MAX - 1));
        assert_eq!(seq.allocate(), Err(Error::IdSpaceExhausted));
        assert_eq!(seq.allocate(), Err(Error::IdSpaceExhausted));
    }

    #[test]
    fn concurrent_allocations_are_unique_and_gap_free() {
        const THREADS: usize = 16;
        const PER_THREAD: usize = 1_000;

        let seq = Arc::new(IdSequence::starting_at(3));
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let seq = Arc::clone(&seq);
                std::thread::spawn(move || {
                    (0..PER_THREAD)
                        .map(|_| seq.allocate().unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::with_capacity(THREADS * PER_THREAD);
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "Duplicate ID detected: {id}");
            }
        }

        let expected: HashSet<UserId> = (3..3 + (THREADS * PER_THREAD) as UserId).collect();
        assert_eq!(seen, expected);
    }
}
