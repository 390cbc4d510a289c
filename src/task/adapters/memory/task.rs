//! In-memory repository for tasks.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::identity::domain::UserId;
use crate::task::{
    domain::{Task, TaskId},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
    creator_index: HashMap<UserId, Vec<TaskId>>,
    assignee_index: HashMap<UserId, Vec<TaskId>>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

pub(super) fn lock_error(err: impl std::fmt::Display) -> TaskRepositoryError {
    TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

/// Removes a task ID from a user-keyed index, cleaning up the entry if empty.
fn remove_from_index(index: &mut HashMap<UserId, Vec<TaskId>>, task_id: TaskId, key: &UserId) {
    if let Some(ids) = index.get_mut(key) {
        ids.retain(|id| *id != task_id);
        if ids.is_empty() {
            index.remove(key);
        }
    }
}

fn index_assignee(state: &mut InMemoryTaskState, task: &Task) {
    if let Some(assignee) = task.assignee() {
        state
            .assignee_index
            .entry(assignee.clone())
            .or_default()
            .push(task.id());
    }
}

fn newest_first(mut tasks: Vec<Task>) -> Vec<Task> {
    tasks.sort_by(|left, right| {
        right
            .created_at()
            .cmp(&left.created_at())
            .then_with(|| right.id().into_inner().cmp(&left.id().into_inner()))
    });
    tasks
}

/// Helper to look up tasks by index key.
fn find_by_index(
    state: &InMemoryTaskState,
    index: &HashMap<UserId, Vec<TaskId>>,
    key: &UserId,
) -> Vec<Task> {
    let tasks = index
        .get(key)
        .map(|ids| {
            ids.iter()
                .filter_map(|id| state.tasks.get(id).cloned())
                .collect()
        })
        .unwrap_or_default();
    newest_first(tasks)
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }

        state
            .creator_index
            .entry(task.creator().clone())
            .or_default()
            .push(task.id());
        index_assignee(&mut state, task);
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<Task> {
        let mut state = self.state.write().map_err(lock_error)?;

        let old_task = state
            .tasks
            .get(&task.id())
            .ok_or(TaskRepositoryError::NotFound(task.id()))?
            .clone();
        if old_task.revision() != task.revision() {
            return Err(TaskRepositoryError::Conflict {
                id: task.id(),
                expected: task.revision(),
            });
        }

        if let Some(old_assignee) = old_task.assignee() {
            remove_from_index(&mut state.assignee_index, task.id(), old_assignee);
        }
        index_assignee(&mut state, task);

        let next = task.clone().into_next_revision();
        state.tasks.insert(next.id(), next.clone());
        Ok(next)
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let removed = state
            .tasks
            .remove(&id)
            .ok_or(TaskRepositoryError::NotFound(id))?;
        remove_from_index(&mut state.creator_index, id, removed.creator());
        if let Some(assignee) = removed.assignee() {
            remove_from_index(&mut state.assignee_index, id, assignee);
        }
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn list(&self) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(newest_first(state.tasks.values().cloned().collect()))
    }

    async fn find_by_creator(&self, creator: &UserId) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(find_by_index(&state, &state.creator_index, creator))
    }

    async fn find_by_assignee(&self, assignee: &UserId) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(find_by_index(&state, &state.assignee_index, assignee))
    }
}
