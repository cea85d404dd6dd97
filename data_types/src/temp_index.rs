//! The monotonic "temp index" counter every write call draws from, used to
//! disambiguate part names written in the same block-range window.

use std::sync::atomic::{AtomicU64, Ordering};

/// A shared, lock-free monotonic counter. One instance lives for the
/// lifetime of a table; each `writeTempPart` call draws the next value via
/// [`TempIndexAllocator::next`] (the "insert_increment" of the concurrency
/// model).
#[derive(Debug, Default)]
pub struct TempIndexAllocator {
    next: AtomicU64,
}

impl TempIndexAllocator {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(0),
        }
    }

    /// Starting the counter at a specific value, e.g. when resuming after a
    /// restart and replaying the highest index already on disk.
    pub fn starting_at(value: u64) -> Self {
        Self {
            next: AtomicU64::new(value),
        }
    }

    /// Draw the next index.
    pub fn next(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocates_strictly_increasing_values() {
        let alloc = TempIndexAllocator::new();
        assert_eq!(alloc.next(), 0);
        assert_eq!(alloc.next(), 1);
        assert_eq!(alloc.next(), 2);
    }

    #[test]
    fn resumes_from_a_given_starting_point() {
        let alloc = TempIndexAllocator::starting_at(100);
        assert_eq!(alloc.next(), 100);
    }
}
