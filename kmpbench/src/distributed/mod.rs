//! Multi-process strategy: ranks, striped partitioning, coordinator bookkeeping
//! and the transports that carry notifications between ranks.
pub mod coordinator;
pub mod local;
pub mod message;
pub mod partition;
pub mod process;
pub mod runner;
pub mod world;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::BenchError;

pub use coordinator::{run_coordinator, Coordinator, CoordinatorState, COORDINATOR_LABEL};
pub use local::{ChannelEndpoint, ChannelInbox, LocalWorld};
pub use message::{Endpoint, Inbox, Notification};
pub use partition::{striped_indices, striped_len};
pub use process::{PipeEndpoint, ProcessGroup};
pub use runner::{
    rank_label, run_in_threads, run_striped, run_worker, DistributedOutcome, DISTRIBUTED_LABEL,
};
pub use world::{World, WorldPosition};

/// How the ranks of a distributed run aggregate their work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistributedMode {
    /// Every rank searches its stripe and reports on its own
    #[default]
    Simple,
    /// Rank 0 only collects per-case notifications from ranks `1..size`
    Coordinator,
}

impl DistributedMode {
    /// Smallest group this mode can run with
    pub fn min_world_size(self) -> usize {
        match self {
            Self::Simple => 1,
            Self::Coordinator => 2,
        }
    }
}

impl fmt::Display for DistributedMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple => write!(f, "simple"),
            Self::Coordinator => write!(f, "coordinator"),
        }
    }
}

impl FromStr for DistributedMode {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "simple" => Ok(Self::Simple),
            "coordinator" => Ok(Self::Coordinator),
            other => {
                let msg = format!("Unknown distributed mode: {}", other);
                Err(BenchError::config_error(msg))
            }
        }
    }
}
