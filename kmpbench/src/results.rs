use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::{BenchError, BenchResult};

/// Outcome of one runner invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Human readable strategy name, written as the record header
    pub label: String,
    /// Total number of pattern occurrences found
    pub matches: usize,
    /// Number of test cases this run processed
    pub cases: usize,
    /// Wall-clock time of the run
    pub elapsed: Duration,
}

impl RunReport {
    pub fn new(label: impl Into<String>, matches: usize, cases: usize, elapsed: Duration) -> Self {
        Self {
            label: label.into(),
            matches,
            cases,
            elapsed,
        }
    }

    /// Elapsed time in whole milliseconds
    pub fn elapsed_ms(&self) -> u128 {
        self.elapsed.as_millis()
    }

    /// Sums partial reports from several ranks into one.
    ///
    /// Ranks run concurrently, so the combined time is the slowest rank's time.
    pub fn combine<'a>(
        label: impl Into<String>,
        parts: impl IntoIterator<Item = &'a RunReport>,
    ) -> Self {
        let mut combined = Self::new(label, 0, 0, Duration::ZERO);
        for part in parts {
            combined.matches += part.matches;
            combined.cases += part.cases;
            combined.elapsed = combined.elapsed.max(part.elapsed);
        }
        combined
    }
}

/// Fails if the reports do not all agree on the aggregate match count.
pub fn ensure_agreement(reports: &[RunReport]) -> BenchResult<()> {
    let Some(first) = reports.first() else {
        return Ok(());
    };
    match reports.iter().find(|r| r.matches != first.matches) {
        Some(other) => Err(BenchError::strategy_mismatch(
            other.label.clone(),
            first.matches,
            other.matches,
        )),
        None => Ok(()),
    }
}
