//! In-memory repository for task chat logs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::task::lock_error;
use crate::task::{
    domain::{TaskId, TaskMessage},
    ports::{TaskMessageRepository, TaskRepositoryResult},
};

/// Thread-safe in-memory chat log store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskMessageRepository {
    logs: Arc<RwLock<HashMap<TaskId, Vec<TaskMessage>>>>,
}

impl InMemoryTaskMessageRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskMessageRepository for InMemoryTaskMessageRepository {
    async fn append(&self, message: &TaskMessage) -> TaskRepositoryResult<()> {
        let mut logs = self.logs.write().map_err(lock_error)?;
        logs.entry(message.task_id())
            .or_default()
            .push(message.clone());
        Ok(())
    }

    async fn list_for_task(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<TaskMessage>> {
        let logs = self.logs.read().map_err(lock_error)?;
        let mut messages = logs.get(&task_id).cloned().unwrap_or_default();
        messages.sort_by_key(TaskMessage::created_at);
        Ok(messages)
    }
}
