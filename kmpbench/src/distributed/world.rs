use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

use super::DistributedMode;
use crate::errors::{BenchError, BenchResult};

static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Identity of one process inside a cooperating group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldPosition {
    rank: usize,
    size: usize,
}

impl WorldPosition {
    pub fn new(rank: usize, size: usize) -> BenchResult<Self> {
        if size == 0 {
            return Err(BenchError::invalid_world_size(size, 1));
        }
        if rank >= size {
            return Err(BenchError::invalid_rank(rank, size));
        }
        Ok(Self { rank, size })
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_coordinator(&self) -> bool {
        self.rank == 0
    }

    /// Fails unless the group is large enough for `mode`.
    pub fn require(&self, mode: DistributedMode) -> BenchResult<()> {
        let required = mode.min_world_size();
        if self.size < required {
            return Err(BenchError::invalid_world_size(self.size, required));
        }
        Ok(())
    }
}

/// Process-wide membership in the distributed group.
///
/// Acquiring it is allowed once per process lifetime. Finalization happens on
/// drop, so every exit path (including `?` and unwinding) releases it.
#[derive(Debug)]
pub struct World {
    position: WorldPosition,
}

impl World {
    pub fn init(rank: usize, size: usize) -> BenchResult<Self> {
        let position = WorldPosition::new(rank, size)?;
        if INITIALIZED.swap(true, Ordering::SeqCst) {
            return Err(BenchError::AlreadyInitialized);
        }
        debug!("Initialized world: rank {} of {}", rank, size);
        Ok(Self { position })
    }

    pub fn position(&self) -> WorldPosition {
        self.position
    }

    pub fn rank(&self) -> usize {
        self.position.rank
    }

    pub fn size(&self) -> usize {
        self.position.size
    }
}

impl Drop for World {
    fn drop(&mut self) {
        debug!(
            "Finalized world: rank {} of {}",
            self.position.rank, self.position.size
        );
    }
}
