use crossbeam_channel::{unbounded, Receiver, Sender};
use std::io::{self, BufRead, BufReader, Write};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

use super::message::{Endpoint, Inbox, Notification};
use super::DistributedMode;
use crate::errors::{BenchError, BenchResult};

/// Worker endpoint that writes one JSON line per notification.
///
/// Every notification is flushed before `notify` returns, so the coordinator
/// sees it as soon as the worker moves on.
pub struct PipeEndpoint<W: Write> {
    out: W,
}

impl PipeEndpoint<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> PipeEndpoint<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Endpoint for PipeEndpoint<W> {
    fn notify(&mut self, notification: Notification) -> BenchResult<()> {
        self.out.write_all(notification.to_line()?.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

/// Worker ranks `1..size` running as child processes, seen from rank 0.
///
/// The launching process is rank 0 itself. In coordinator mode each child's
/// stdout is piped and read on its own thread; decoded notifications are
/// merged into one channel in arrival order. In simple mode children inherit
/// stdout and nothing is exchanged.
///
/// Children still running when the group is dropped are killed and reaped.
pub struct ProcessGroup {
    mode: DistributedMode,
    children: Vec<(usize, Child)>,
    readers: Vec<JoinHandle<()>>,
    rx: Option<Receiver<BenchResult<Notification>>>,
}

impl ProcessGroup {
    /// Spawns ranks `1..size`, building each command with `command_for(rank)`.
    pub fn launch<F>(size: usize, mode: DistributedMode, mut command_for: F) -> BenchResult<Self>
    where
        F: FnMut(usize) -> Command,
    {
        if size < mode.min_world_size() {
            return Err(BenchError::invalid_world_size(size, mode.min_world_size()));
        }

        let (tx, rx) = match mode {
            DistributedMode::Coordinator => {
                let (tx, rx) = unbounded();
                (Some(tx), Some(rx))
            }
            DistributedMode::Simple => (None, None),
        };

        let mut group = Self {
            mode,
            children: Vec::with_capacity(size.saturating_sub(1)),
            readers: Vec::new(),
            rx,
        };

        for rank in 1..size {
            let mut command = command_for(rank);
            command.stdin(Stdio::null());
            if tx.is_some() {
                command.stdout(Stdio::piped());
            }

            // On failure `group` drops here and reaps what was already started
            let mut child = command.spawn()?;
            debug!("Spawned rank {} as pid {}", rank, child.id());

            if let Some(tx) = &tx {
                let stdout = child
                    .stdout
                    .take()
                    .ok_or_else(|| BenchError::transport_error("child stdout not captured"))?;
                group.readers.push(spawn_reader(rank, stdout, tx.clone())?);
            }
            group.children.push((rank, child));
        }

        info!("Launched {} worker processes in {} mode", size - 1, mode);
        Ok(group)
    }

    pub fn mode(&self) -> DistributedMode {
        self.mode
    }

    /// Waits for every child to exit and fails if any of them did not succeed.
    pub fn finish(mut self) -> BenchResult<()> {
        let mut failure = None;
        for (rank, mut child) in std::mem::take(&mut self.children) {
            let status = child.wait()?;
            debug!("Rank {} exited with {}", rank, status);
            if !status.success() && failure.is_none() {
                failure = Some(BenchError::worker_failed(rank, status));
            }
        }
        for reader in std::mem::take(&mut self.readers) {
            if reader.join().is_err() {
                warn!("Reader thread panicked");
            }
        }
        failure.map_or(Ok(()), Err)
    }
}

impl Inbox for ProcessGroup {
    fn recv(&mut self) -> BenchResult<Notification> {
        let rx = self.rx.as_ref().ok_or_else(|| {
            BenchError::transport_error("no notifications are exchanged in simple mode")
        })?;
        rx.recv()
            .map_err(|_| BenchError::transport_error("all workers disconnected"))?
    }
}

impl Drop for ProcessGroup {
    fn drop(&mut self) {
        for (rank, child) in &mut self.children {
            warn!("Terminating rank {}", rank);
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

fn spawn_reader(
    rank: usize,
    stdout: ChildStdout,
    tx: Sender<BenchResult<Notification>>,
) -> BenchResult<JoinHandle<()>> {
    let handle = thread::Builder::new()
        .name(format!("kmpbench-rank-{}-reader", rank))
        .spawn(move || {
            for line in BufReader::new(stdout).lines() {
                let message = line
                    .map_err(BenchError::from)
                    .and_then(|line| Notification::from_line(&line));
                let failed = message.is_err();
                if tx.send(message).is_err() || failed {
                    break;
                }
            }
            debug!("Rank {} closed its pipe", rank);
        })?;
    Ok(handle)
}
