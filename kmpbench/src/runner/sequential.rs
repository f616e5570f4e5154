use std::time::Instant;
use tracing::{debug, info};

use crate::batch::TestBatch;
use crate::coverage::CoverageVector;
use crate::results::RunReport;
use crate::search::KmpMatcher;

pub const SEQUENTIAL_LABEL: &str = "Single thread";

/// Searches every test case in index order on the calling thread.
pub fn run_sequential(batch: &TestBatch, coverage: &CoverageVector) -> RunReport {
    info!("Starting sequential run over {} test cases", batch.len());
    let start = Instant::now();

    let mut matches = 0;
    for (index, case) in batch.iter().enumerate() {
        matches += KmpMatcher::new(&case.pattern).count(&case.text);
        coverage.mark(index);
    }

    let elapsed = start.elapsed();
    debug!(
        "Sequential run finished in {}",
        humantime::format_duration(elapsed)
    );
    RunReport::new(SEQUENTIAL_LABEL, matches, batch.len(), elapsed)
}
