use serde::{Deserialize, Serialize};

use crate::errors::BenchResult;

/// Sent by a worker to the coordinator after it finished one test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Rank of the sender
    pub rank: usize,
    /// Index of the processed test case
    pub index: usize,
    /// Matches found in that test case
    pub matches: usize,
}

impl Notification {
    /// Encodes as a single JSON line, newline included
    pub fn to_line(&self) -> BenchResult<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }

    pub fn from_line(line: &str) -> BenchResult<Self> {
        Ok(serde_json::from_str(line.trim_end())?)
    }
}

/// Worker side of the transport
pub trait Endpoint {
    /// Delivers one notification to the coordinator; returns once it is handed off.
    fn notify(&mut self, notification: Notification) -> BenchResult<()>;
}

/// Coordinator side of the transport
pub trait Inbox {
    /// Blocks until the next notification from any rank arrives.
    fn recv(&mut self) -> BenchResult<Notification>;
}
