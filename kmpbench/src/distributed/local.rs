use crossbeam_channel::{unbounded, Receiver, Sender};

use super::message::{Endpoint, Inbox, Notification};
use crate::errors::{BenchError, BenchResult};

/// Worker endpoint backed by an in-process channel
#[derive(Debug, Clone)]
pub struct ChannelEndpoint {
    tx: Sender<Notification>,
}

impl Endpoint for ChannelEndpoint {
    fn notify(&mut self, notification: Notification) -> BenchResult<()> {
        self.tx
            .send(notification)
            .map_err(|_| BenchError::transport_error("coordinator inbox closed"))
    }
}

/// Coordinator inbox backed by an in-process channel
#[derive(Debug)]
pub struct ChannelInbox {
    rx: Receiver<Notification>,
}

impl Inbox for ChannelInbox {
    fn recv(&mut self) -> BenchResult<Notification> {
        self.rx
            .recv()
            .map_err(|_| BenchError::transport_error("all workers disconnected"))
    }
}

/// A group of ranks living as threads of the current process.
#[derive(Debug)]
pub struct LocalWorld {
    size: usize,
    tx: Sender<Notification>,
    inbox: ChannelInbox,
}

impl LocalWorld {
    pub fn create(size: usize) -> BenchResult<Self> {
        if size == 0 {
            return Err(BenchError::invalid_world_size(size, 1));
        }
        let (tx, rx) = unbounded();
        Ok(Self {
            size,
            tx,
            inbox: ChannelInbox { rx },
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Splits into the coordinator inbox and one endpoint per worker rank `1..size`.
    ///
    /// The inbox reports a transport error once every endpoint is dropped.
    pub fn split(self) -> (ChannelInbox, Vec<ChannelEndpoint>) {
        let endpoints = (1..self.size)
            .map(|_| ChannelEndpoint {
                tx: self.tx.clone(),
            })
            .collect();
        (self.inbox, endpoints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_channel() {
        let (mut inbox, mut endpoints) = LocalWorld::create(3).unwrap().split();
        assert_eq!(endpoints.len(), 2);
        let n = Notification {
            rank: 2,
            index: 4,
            matches: 1,
        };
        endpoints[1].notify(n).unwrap();
        assert_eq!(inbox.recv().unwrap(), n);
    }

    #[test]
    fn test_disconnect_is_reported() {
        let (mut inbox, endpoints) = LocalWorld::create(2).unwrap().split();
        drop(endpoints);
        assert!(matches!(inbox.recv(), Err(BenchError::TransportError(_))));
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(LocalWorld::create(0).is_err());
    }
}
