pub mod batch;
pub mod config;
pub mod coverage;
pub mod distributed;
pub mod errors;
pub mod report;
pub mod results;
pub mod runner;
pub mod search;

pub use batch::{generate, generate_seeded, TestBatch, TestCase};
pub use config::{BenchConfig, CliOverrides};
pub use coverage::CoverageVector;
pub use distributed::DistributedMode;
pub use errors::{BenchError, BenchResult};
pub use report::Reporter;
pub use results::{ensure_agreement, RunReport};
pub use search::KmpMatcher;
