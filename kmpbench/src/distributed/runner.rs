use std::panic;
use std::thread;
use std::time::Instant;
use tracing::{debug, info};

use super::coordinator::run_coordinator;
use super::local::LocalWorld;
use super::message::{Endpoint, Notification};
use super::partition::{striped_indices, striped_len};
use super::world::WorldPosition;
use super::DistributedMode;
use crate::batch::TestBatch;
use crate::coverage::CoverageVector;
use crate::errors::{BenchError, BenchResult};
use crate::results::RunReport;
use crate::search::KmpMatcher;

pub const DISTRIBUTED_LABEL: &str = "Distributed";

/// Record label for the partial result of one rank
pub fn rank_label(rank: usize) -> String {
    format!("{} (rank {})", DISTRIBUTED_LABEL, rank)
}

/// Simple mode: rank `r` of `size` handles `r, r + size, ...` and reports only
/// its own partial count.
pub fn run_striped(
    batch: &TestBatch,
    position: WorldPosition,
    coverage: &CoverageVector,
) -> RunReport {
    let (rank, size) = (position.rank(), position.size());
    debug!(
        "Rank {} of {} takes {} of {} test cases",
        rank,
        size,
        striped_len(rank, size, batch.len()),
        batch.len()
    );
    let start = Instant::now();

    let mut matches = 0;
    let mut cases = 0;
    for index in striped_indices(rank, size, batch.len()) {
        let case = &batch[index];
        matches += KmpMatcher::new(&case.pattern).count(&case.text);
        coverage.mark(index);
        cases += 1;
    }

    RunReport::new(rank_label(rank), matches, cases, start.elapsed())
}

/// Coordinator mode, worker side: ranks `1..size` stripe the batch among
/// themselves and notify rank 0 after every test case.
pub fn run_worker<E: Endpoint>(
    batch: &TestBatch,
    position: WorldPosition,
    endpoint: &mut E,
    coverage: &CoverageVector,
) -> BenchResult<RunReport> {
    position.require(DistributedMode::Coordinator)?;
    if position.is_coordinator() {
        return Err(BenchError::invalid_rank(position.rank(), position.size()));
    }

    let (slot, workers) = (position.rank() - 1, position.size() - 1);
    debug!(
        "Worker rank {} takes {} of {} test cases",
        position.rank(),
        striped_len(slot, workers, batch.len()),
        batch.len()
    );
    let start = Instant::now();

    let mut matches = 0;
    let mut cases = 0;
    for index in striped_indices(slot, workers, batch.len()) {
        let case = &batch[index];
        let found = KmpMatcher::new(&case.pattern).count(&case.text);
        coverage.mark(index);
        endpoint.notify(Notification {
            rank: position.rank(),
            index,
            matches: found,
        })?;
        matches += found;
        cases += 1;
    }

    Ok(RunReport::new(rank_label(position.rank()), matches, cases, start.elapsed()))
}

/// Everything a distributed run produced when all ranks live in one process
#[derive(Debug, Clone)]
pub struct DistributedOutcome {
    /// Partial reports of the ranks that did match work
    pub ranks: Vec<RunReport>,
    /// Aggregate over the whole group
    pub total: RunReport,
}

/// Runs a whole distributed group as scoped threads of this process.
///
/// Unlike separate processes, every rank here shares one coverage vector, so
/// exactly-once processing across ranks is verified before returning.
pub fn run_in_threads(
    batch: &TestBatch,
    size: usize,
    mode: DistributedMode,
) -> BenchResult<DistributedOutcome> {
    WorldPosition::new(0, size)?.require(mode)?;
    info!(
        "Starting {} run over {} test cases with {} ranks",
        mode,
        batch.len(),
        size
    );
    let start = Instant::now();
    let coverage = CoverageVector::new(batch.len());

    let outcome = match mode {
        DistributedMode::Simple => {
            let ranks = thread::scope(|s| {
                let handles: Vec<_> = (0..size)
                    .map(|rank| {
                        let coverage = &coverage;
                        s.spawn(move || -> BenchResult<RunReport> {
                            let position = WorldPosition::new(rank, size)?;
                            Ok(run_striped(batch, position, coverage))
                        })
                    })
                    .collect();
                join_all(handles)
            })?;
            let mut total = RunReport::combine(DISTRIBUTED_LABEL, &ranks);
            total.elapsed = start.elapsed();
            DistributedOutcome { ranks, total }
        }
        DistributedMode::Coordinator => {
            let (mut inbox, endpoints) = LocalWorld::create(size)?.split();
            let (total, ranks) = thread::scope(|s| {
                let handles: Vec<_> = endpoints
                    .into_iter()
                    .enumerate()
                    .map(|(i, mut endpoint)| {
                        let coverage = &coverage;
                        s.spawn(move || -> BenchResult<RunReport> {
                            let position = WorldPosition::new(i + 1, size)?;
                            run_worker(batch, position, &mut endpoint, coverage)
                        })
                    })
                    .collect();
                let total = run_coordinator(&mut inbox, batch.len());
                let ranks = join_all(handles);
                (total, ranks)
            });
            let ranks = ranks?;
            let mut total = total?;
            total.label = DISTRIBUTED_LABEL.to_string();
            total.elapsed = start.elapsed();
            DistributedOutcome { ranks, total }
        }
    };

    coverage.verify()?;
    Ok(outcome)
}

fn join_all(
    handles: Vec<thread::ScopedJoinHandle<'_, BenchResult<RunReport>>>,
) -> BenchResult<Vec<RunReport>> {
    handles
        .into_iter()
        .map(|handle| match handle.join() {
            Ok(result) => result,
            Err(payload) => panic::resume_unwind(payload),
        })
        .collect()
}
