//! Broadcast hub for ordered snapshots.

use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::debug;

/// Snapshots buffered per subscriber before the oldest are dropped.
pub const DEFAULT_CAPACITY: usize = 64;

/// An immutable view of published state.
#[derive(Debug)]
pub struct Snapshot<T> {
    sequence: u64,
    items: Arc<[T]>,
}

impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Self {
            sequence: self.sequence,
            items: Arc::clone(&self.items),
        }
    }
}

impl<T> Snapshot<T> {
    /// Returns the publication sequence number. The initial empty snapshot
    /// is sequence zero.
    #[must_use]
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Returns the published items.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Returns a shared handle to the published items.
    #[must_use]
    pub fn shared(&self) -> Arc<[T]> {
        Arc::clone(&self.items)
    }
}

/// Errors returned to subscribers.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum SnapshotError {
    /// The hub was dropped and no further snapshots will arrive.
    #[error("snapshot hub closed")]
    Closed,
}

/// A snapshot delivered to a subscriber.
#[derive(Debug, Clone)]
pub struct Received<T> {
    /// The delivered snapshot.
    pub snapshot: Snapshot<T>,
    /// Snapshots skipped since the previous delivery.
    pub missed: u64,
}

#[derive(Debug)]
struct HubState<T> {
    latest: Snapshot<T>,
}

/// Single authoritative publisher of snapshots.
///
/// Cloning the hub yields another handle to the same publisher.
#[derive(Debug)]
pub struct SnapshotHub<T> {
    sender: broadcast::Sender<Snapshot<T>>,
    state: Arc<Mutex<HubState<T>>>,
}

impl<T> Clone for SnapshotHub<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

impl<T: Send + Sync + 'static> Default for SnapshotHub<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + Sync + 'static> SnapshotHub<T> {
    /// Creates a hub buffering [`DEFAULT_CAPACITY`] snapshots.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a hub buffering `capacity` snapshots per subscriber.
    ///
    /// A zero capacity is raised to one.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            state: Arc::new(Mutex::new(HubState {
                latest: Snapshot {
                    sequence: 0,
                    items: Arc::from(Vec::new()),
                },
            })),
        }
    }

    /// Publishes `items` as the next snapshot and returns its sequence
    /// number.
    ///
    /// Sequence assignment and broadcast happen under one lock, so
    /// subscribers see sequence numbers in increasing order.
    pub fn publish(&self, items: impl Into<Arc<[T]>>) -> u64 {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let snapshot = Snapshot {
            sequence: state.latest.sequence.saturating_add(1),
            items: items.into(),
        };
        state.latest = snapshot.clone();
        let sequence = snapshot.sequence;
        if self.sender.send(snapshot).is_err() {
            debug!(sequence, "snapshot published with no subscribers");
        }
        sequence
    }

    /// Returns the most recent snapshot.
    #[must_use]
    pub fn latest(&self) -> Snapshot<T> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .latest
            .clone()
    }

    /// Subscribes to snapshots published from now on.
    #[must_use]
    pub fn subscribe(&self) -> SnapshotSubscriber<T> {
        SnapshotSubscriber {
            receiver: self.sender.subscribe(),
        }
    }

    /// Returns the number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Read-only subscription to a [`SnapshotHub`].
#[derive(Debug)]
pub struct SnapshotSubscriber<T> {
    receiver: broadcast::Receiver<Snapshot<T>>,
}

impl<T: Send + Sync + 'static> SnapshotSubscriber<T> {
    /// Waits for the next snapshot.
    ///
    /// Snapshots arrive one at a time in publication order. Once the
    /// subscriber overflows its buffer, it drains the backlog and returns the
    /// newest snapshot, with [`Received::missed`] counting everything skipped.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Closed`] once every hub handle is dropped
    /// and the backlog is empty.
    pub async fn recv(&mut self) -> Result<Received<T>, SnapshotError> {
        let mut missed: u64 = 0;
        loop {
            match self.receiver.recv().await {
                Ok(snapshot) if missed == 0 => {
                    return Ok(Received {
                        snapshot,
                        missed,
                    });
                }
                Ok(snapshot) => return Ok(self.skip_to_newest(snapshot, missed)),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "snapshot subscriber lagged");
                    missed = missed.saturating_add(skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return Err(SnapshotError::Closed),
            }
        }
    }

    fn skip_to_newest(&mut self, first: Snapshot<T>, mut missed: u64) -> Received<T> {
        let mut snapshot = first;
        loop {
            match self.receiver.try_recv() {
                Ok(newer) => {
                    missed = missed.saturating_add(1);
                    snapshot = newer;
                }
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    missed = missed.saturating_add(skipped);
                }
                Err(
                    broadcast::error::TryRecvError::Empty | broadcast::error::TryRecvError::Closed,
                ) => return Received { snapshot, missed },
            }
        }
    }
}
