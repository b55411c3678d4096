//! Thread-safe sequence backing `inc` columns.

use std::sync::atomic::{AtomicI64, Ordering};

/// Monotonically increasing counter owned by a single `inc` column.
///
/// The counter holds `start - 1` so that the first call to [`Sequence::next`]
/// yields `start`.
#[derive(Debug)]
pub struct Sequence {
    start: i64,
    current: AtomicI64,
}

impl Sequence {
    /// Create a sequence whose first value is `start`.
    pub fn new(start: i64) -> Self {
        Self {
            start,
            current: AtomicI64::new(start.wrapping_sub(1)),
        }
    }

    /// The configured first value.
    pub fn start(&self) -> i64 {
        self.start
    }

    /// Return the next value.
    pub fn next(&self) -> i64 {
        self.current.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_first_value_is_start() {
        let seq = Sequence::new(10);
        assert_eq!(seq.next(), 10);
        assert_eq!(seq.next(), 11);
        assert_eq!(seq.start(), 10);
    }

    #[test]
    fn test_concurrent_calls_have_no_gaps_or_duplicates() {
        let seq = Arc::new(Sequence::new(1));
        let threads = 8;
        let per_thread = 1000;

        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let seq = Arc::clone(&seq);
                thread::spawn(move || (0..per_thread).map(|_| seq.next()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for v in handle.join().unwrap() {
                assert!(seen.insert(v), "duplicate value {v}");
            }
        }

        let total = (threads * per_thread) as i64;
        assert_eq!(seen.len() as i64, total);
        assert!((1..=total).all(|v| seen.contains(&v)));
    }
}
