use std::time::Instant;
use tracing::{debug, info, trace};

use super::message::{Inbox, Notification};
use crate::errors::{BenchError, BenchResult};
use crate::results::RunReport;

pub const COORDINATOR_LABEL: &str = "Distributed (coordinator)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    AwaitingMessages { received: usize },
    Done,
}

/// Rank 0 bookkeeping in coordinator mode.
///
/// Each notification is one transition. The machine reaches `Done` exactly
/// when every index of the batch has been reported once; an out-of-range or
/// repeated index is an error, so reaching `Done` implies full coverage.
#[derive(Debug)]
pub struct Coordinator {
    coverage: Vec<bool>,
    matches: usize,
    state: CoordinatorState,
}

impl Coordinator {
    pub fn new(expected: usize) -> Self {
        let state = if expected == 0 {
            CoordinatorState::Done
        } else {
            CoordinatorState::AwaitingMessages { received: 0 }
        };
        Self {
            coverage: vec![false; expected],
            matches: 0,
            state,
        }
    }

    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == CoordinatorState::Done
    }

    pub fn expected(&self) -> usize {
        self.coverage.len()
    }

    /// Aggregate matches reported so far
    pub fn matches(&self) -> usize {
        self.matches
    }

    pub fn coverage(&self) -> &[bool] {
        &self.coverage
    }

    /// Applies one notification and returns the new state.
    pub fn on_notification(&mut self, n: Notification) -> BenchResult<CoordinatorState> {
        let received = match self.state {
            CoordinatorState::AwaitingMessages { received } => received,
            // Nothing may arrive after the last index was accounted for
            CoordinatorState::Done => {
                return Err(BenchError::CoverageViolation {
                    expected: self.expected(),
                    covered: self.expected(),
                    duplicates: 1,
                });
            }
        };

        let len = self.expected();
        let slot = self
            .coverage
            .get_mut(n.index)
            .ok_or(BenchError::UnexpectedIndex {
                index: n.index,
                len,
            })?;
        if *slot {
            return Err(BenchError::CoverageViolation {
                expected: len,
                covered: received,
                duplicates: 1,
            });
        }
        *slot = true;
        self.matches += n.matches;

        let received = received + 1;
        trace!(
            "Index {} from rank {} ({}/{})",
            n.index, n.rank, received, len
        );
        self.state = if received == len {
            CoordinatorState::Done
        } else {
            CoordinatorState::AwaitingMessages { received }
        };
        Ok(self.state)
    }
}

/// Receives notifications until all `expected` indices are accounted for.
///
/// There is no timeout: a worker that dies without reporting leaves this
/// blocked for as long as the transport keeps the inbox open.
pub fn run_coordinator<I: Inbox>(inbox: &mut I, expected: usize) -> BenchResult<RunReport> {
    info!("Coordinator awaiting {} notifications", expected);
    let start = Instant::now();

    let mut coordinator = Coordinator::new(expected);
    while !coordinator.is_done() {
        let notification = inbox.recv()?;
        coordinator.on_notification(notification)?;
    }

    let elapsed = start.elapsed();
    debug!(
        "All {} test cases accounted for in {}",
        expected,
        humantime::format_duration(elapsed)
    );
    Ok(RunReport::new(COORDINATOR_LABEL, coordinator.matches(), expected, elapsed))
}
