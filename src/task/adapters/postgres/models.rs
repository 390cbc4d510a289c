//! Diesel row models for task persistence.

use super::schema::{task_messages, tasks};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Task title.
    pub title: String,
    /// Free-text description.
    pub description: String,
    /// Free-text category.
    pub category: String,
    /// Promised payment in lamports.
    pub deposit_lamports: i64,
    /// Lifecycle status.
    pub status: String,
    /// Posting user.
    pub creator_id: String,
    /// Accepting provider.
    pub assignee_id: Option<String>,
    /// Escrow record JSON payload.
    pub escrow: Option<Value>,
    /// Optimistic concurrency revision.
    pub revision: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for task records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Task title.
    pub title: String,
    /// Free-text description.
    pub description: String,
    /// Free-text category.
    pub category: String,
    /// Promised payment in lamports.
    pub deposit_lamports: i64,
    /// Lifecycle status.
    pub status: String,
    /// Posting user.
    pub creator_id: String,
    /// Accepting provider.
    pub assignee_id: Option<String>,
    /// Escrow record JSON payload.
    pub escrow: Option<Value>,
    /// Optimistic concurrency revision.
    pub revision: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Changeset applied on revision-checked updates.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub struct TaskChangeset {
    /// Task title.
    pub title: String,
    /// Free-text description.
    pub description: String,
    /// Free-text category.
    pub category: String,
    /// Lifecycle status.
    pub status: String,
    /// Accepting provider.
    pub assignee_id: Option<String>,
    /// Escrow record JSON payload.
    pub escrow: Option<Value>,
    /// Advanced revision.
    pub revision: i64,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result row for chat messages.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = task_messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskMessageRow {
    /// Message identifier.
    pub id: uuid::Uuid,
    /// Owning task.
    pub task_id: uuid::Uuid,
    /// Sending user.
    pub sender_id: String,
    /// Message text.
    pub body: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
