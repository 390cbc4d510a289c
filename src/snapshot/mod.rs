//! Live snapshots of authoritative state.
//!
//! A [`SnapshotHub`] is the single publisher for one piece of state. Every
//! publication is an immutable [`Snapshot`] carrying a strictly increasing
//! sequence number. Subscribers observe snapshots in publication order and
//! never write back; a subscriber that falls behind skips straight to the
//! newest snapshot and is told how many it missed.

mod hub;

pub use hub::{
    DEFAULT_CAPACITY, Received, Snapshot, SnapshotError, SnapshotHub, SnapshotSubscriber,
};
