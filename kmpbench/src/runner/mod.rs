//! Single-process runners: one thread, or a thread pool over shared memory.
pub mod parallel;
pub mod sequential;

use std::num::NonZeroUsize;
use tracing::info;

use crate::batch::TestBatch;
use crate::coverage::CoverageVector;
use crate::errors::BenchResult;
use crate::results::{ensure_agreement, RunReport};

pub use parallel::{run_parallel, run_parallel_with_threads, PARALLEL_LABEL};
pub use sequential::{run_sequential, SEQUENTIAL_LABEL};

/// Runs the sequential and then the shared-memory strategy over `batch`.
///
/// Each strategy gets its own coverage vector, which must be complete
/// afterwards, and both must report the same number of matches.
pub fn run_local(batch: &TestBatch, threads: NonZeroUsize) -> BenchResult<Vec<RunReport>> {
    let coverage = CoverageVector::new(batch.len());
    let sequential = run_sequential(batch, &coverage);
    coverage.verify()?;

    let coverage = CoverageVector::new(batch.len());
    let parallel = run_parallel_with_threads(batch, &coverage, threads)?;
    coverage.verify()?;

    let reports = vec![sequential, parallel];
    ensure_agreement(&reports)?;
    info!(
        "Sequential and shared-memory runs agree on {} matches",
        reports[0].matches
    );
    Ok(reports)
}
