/// Shared-memory runner built on Rayon's work-stealing pool.
///
/// # .NET vs Rust Data Parallelism
///
/// In .NET the usual shape is a `Parallel.For` with an `Interlocked` counter:
/// ```csharp
/// long total = 0;
/// Parallel.For(0, tests.Count, i => {
///     Interlocked.Add(ref total, Kmp(tests[i]).Count);
/// });
/// ```
///
/// Here every worker produces a partial sum and Rayon combines them after the
/// implicit join, so no counter is shared at all:
/// ```rust,ignore
/// let total: usize = cases.par_iter().map(|case| count(case)).sum();
/// ```
///
/// The coverage vector is the only state touched by more than one thread, and
/// it only holds atomics.
use rayon::prelude::*;
use std::num::NonZeroUsize;
use std::time::Instant;
use tracing::{debug, info};

use crate::batch::TestBatch;
use crate::coverage::CoverageVector;
use crate::errors::{BenchError, BenchResult};
use crate::results::RunReport;
use crate::search::KmpMatcher;

pub const PARALLEL_LABEL: &str = "Shared memory";

const MIN_CHUNK_SIZE: usize = 1; // Test cases are independent and roughly equal in cost
const MAX_CHUNK_SIZE: usize = 256; // Keep enough splits for work stealing to balance

/// Searches the batch on the current Rayon pool.
pub fn run_parallel(batch: &TestBatch, coverage: &CoverageVector) -> RunReport {
    let threads = rayon::current_num_threads();
    info!(
        "Starting shared-memory run over {} test cases on {} threads",
        batch.len(),
        threads
    );
    let start = Instant::now();

    let chunk_size = (batch.len() / threads).clamp(MIN_CHUNK_SIZE, MAX_CHUNK_SIZE);
    debug!("Using minimum split length of {}", chunk_size);

    let matches: usize = batch
        .cases()
        .par_iter()
        .enumerate()
        .with_min_len(chunk_size)
        .map(|(index, case)| {
            let found = KmpMatcher::new(&case.pattern).count(&case.text);
            coverage.mark(index);
            found
        })
        .sum();

    let elapsed = start.elapsed();
    debug!(
        "Shared-memory run finished in {}",
        humantime::format_duration(elapsed)
    );
    RunReport::new(PARALLEL_LABEL, matches, batch.len(), elapsed)
}

/// Searches the batch on a dedicated pool of `threads` workers.
///
/// Pool construction happens before the clock starts.
pub fn run_parallel_with_threads(
    batch: &TestBatch,
    coverage: &CoverageVector,
    threads: NonZeroUsize,
) -> BenchResult<RunReport> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads.get())
        .thread_name(|i| format!("kmpbench-worker-{}", i))
        .build()
        .map_err(|e| BenchError::thread_pool_error(e.to_string()))?;
    Ok(pool.install(|| run_parallel(batch, coverage)))
}
