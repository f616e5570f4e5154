use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::errors::{BenchError, BenchResult};

/// One flag per test case, set by whichever worker processed that index.
///
/// Marking goes through `&self`, so a single vector can be shared by every
/// thread of a parallel run. A second mark of the same index is counted as a
/// duplicate rather than silently absorbed.
#[derive(Debug)]
pub struct CoverageVector {
    flags: Vec<AtomicBool>,
    duplicates: AtomicUsize,
}

impl CoverageVector {
    /// Creates a vector of `len` unset entries
    pub fn new(len: usize) -> Self {
        Self {
            flags: (0..len).map(|_| AtomicBool::new(false)).collect(),
            duplicates: AtomicUsize::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Marks `index` as processed and returns `true` if it was not marked before.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range: that can only come from a broken
    /// partition.
    pub fn mark(&self, index: usize) -> bool {
        let already = self.flags[index].swap(true, Ordering::AcqRel);
        if already {
            self.duplicates.fetch_add(1, Ordering::Relaxed);
        }
        !already
    }

    pub fn is_marked(&self, index: usize) -> bool {
        self.flags
            .get(index)
            .is_some_and(|flag| flag.load(Ordering::Acquire))
    }

    /// Number of entries currently set
    pub fn covered(&self) -> usize {
        self.flags
            .iter()
            .filter(|flag| flag.load(Ordering::Acquire))
            .count()
    }

    /// Number of marks that hit an already-set entry
    pub fn duplicates(&self) -> usize {
        self.duplicates.load(Ordering::Relaxed)
    }

    pub fn is_complete(&self) -> bool {
        self.covered() == self.len() && self.duplicates() == 0
    }

    /// Checks that every index was processed exactly once.
    pub fn verify(&self) -> BenchResult<()> {
        let covered = self.covered();
        let duplicates = self.duplicates();
        if covered != self.len() || duplicates != 0 {
            return Err(BenchError::CoverageViolation {
                expected: self.len(),
                covered,
                duplicates,
            });
        }
        Ok(())
    }
}
