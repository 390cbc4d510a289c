//! Task repository decorator that publishes task-list snapshots.

use crate::identity::domain::UserId;
use crate::snapshot::{SnapshotHub, SnapshotSubscriber};
use crate::task::{
    domain::{Task, TaskId},
    ports::{TaskRepository, TaskRepositoryResult},
};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::warn;

/// Wraps a [`TaskRepository`] so every successful write publishes the full
/// task list, newest first, to a [`SnapshotHub`].
///
/// Reads pass straight through. A failed write publishes nothing. Writes
/// and their publications are serialised, so a higher snapshot sequence
/// never carries an older task list.
#[derive(Debug, Clone)]
pub struct ObservedTaskRepository<R> {
    inner: R,
    hub: SnapshotHub<Task>,
    write_order: Arc<Mutex<()>>,
}

impl<R: TaskRepository> ObservedTaskRepository<R> {
    /// Decorates `inner`, publishing to a fresh hub.
    #[must_use]
    pub fn new(inner: R) -> Self {
        Self::with_hub(inner, SnapshotHub::new())
    }

    /// Decorates `inner`, publishing to `hub`.
    #[must_use]
    pub fn with_hub(inner: R, hub: SnapshotHub<Task>) -> Self {
        Self {
            inner,
            hub,
            write_order: Arc::new(Mutex::new(())),
        }
    }

    /// Returns the hub task-list snapshots are published to.
    #[must_use]
    pub const fn hub(&self) -> &SnapshotHub<Task> {
        &self.hub
    }

    /// Subscribes to task-list snapshots.
    #[must_use]
    pub fn subscribe(&self) -> SnapshotSubscriber<Task> {
        self.hub.subscribe()
    }

    async fn publish(&self) {
        match self.inner.list().await {
            Ok(tasks) => {
                self.hub.publish(tasks);
            }
            Err(err) => warn!(error = %err, "failed to read tasks for snapshot"),
        }
    }
}

#[async_trait]
impl<R: TaskRepository> TaskRepository for ObservedTaskRepository<R> {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let _ordered = self.write_order.lock().await;
        self.inner.store(task).await?;
        self.publish().await;
        Ok(())
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<Task> {
        let _ordered = self.write_order.lock().await;
        let stored = self.inner.update(task).await?;
        self.publish().await;
        Ok(stored)
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()> {
        let _ordered = self.write_order.lock().await;
        self.inner.delete(id).await?;
        self.publish().await;
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.inner.find_by_id(id).await
    }

    async fn list(&self) -> TaskRepositoryResult<Vec<Task>> {
        self.inner.list().await
    }

    async fn find_by_creator(&self, creator: &UserId) -> TaskRepositoryResult<Vec<Task>> {
        self.inner.find_by_creator(creator).await
    }

    async fn find_by_assignee(&self, assignee: &UserId) -> TaskRepositoryResult<Vec<Task>> {
        self.inner.find_by_assignee(assignee).await
    }
}
