//! `PostgreSQL` repository implementations for tasks and chat logs.

use super::{
    models::{NewTaskRow, TaskChangeset, TaskMessageRow, TaskRow},
    schema::{task_messages, tasks},
};
use crate::identity::domain::UserId;
use crate::task::{
    domain::{
        MessageId, PersistedMessageData, PersistedTaskData, Task, TaskId, TaskMessage, TaskStatus,
    },
    ports::{TaskMessageRepository, TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use crate::wallet::domain::Lamports;
use async_trait::async_trait;
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed task repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: TaskPgPool,
}

/// `PostgreSQL`-backed chat log repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskMessageRepository {
    pool: TaskPgPool,
}

async fn run_blocking<F, T>(pool: &TaskPgPool, f: F) -> TaskRepositoryResult<T>
where
    F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
    T: Send + 'static,
{
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
        f(&mut connection)
    })
    .await
    .map_err(TaskRepositoryError::persistence)?
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn list_where<F>(&self, filter: F) -> TaskRepositoryResult<Vec<Task>>
    where
        F: FnOnce(tasks::BoxedQuery<'static, diesel::pg::Pg>) -> tasks::BoxedQuery<'static, diesel::pg::Pg>
            + Send
            + 'static,
    {
        run_blocking(&self.pool, move |connection| {
            filter(tasks::table.into_boxed())
                .order((tasks::created_at.desc(), tasks::id.desc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?
                .into_iter()
                .map(row_to_task)
                .collect()
        })
        .await
    }
}

impl PostgresTaskMessageRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let new_row = to_new_row(task)?;

        run_blocking(&self.pool, move |connection| {
            diesel::insert_into(tasks::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TaskRepositoryError::DuplicateTask(task_id)
                    }
                    _ => TaskRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<Task> {
        let next = task.clone().into_next_revision();
        let changeset = to_changeset(&next)?;
        let task_id = task.id();
        let expected = to_db_int(task.revision())?;

        run_blocking(&self.pool, move |connection| {
            let affected = diesel::update(
                tasks::table
                    .filter(tasks::id.eq(task_id.into_inner()))
                    .filter(tasks::revision.eq(expected)),
            )
            .set(&changeset)
            .execute(connection)
            .map_err(TaskRepositoryError::persistence)?;

            if affected == 0 {
                return Err(classify_missed_update(connection, task_id, expected));
            }
            Ok(next)
        })
        .await
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()> {
        run_blocking(&self.pool, move |connection| {
            connection.transaction(|tx| {
                diesel::delete(task_messages::table.filter(task_messages::task_id.eq(id.into_inner())))
                    .execute(tx)?;
                diesel::delete(tasks::table.filter(tasks::id.eq(id.into_inner()))).execute(tx)
            })
            .map_err(TaskRepositoryError::persistence)
            .and_then(|affected| {
                if affected == 0 {
                    Err(TaskRepositoryError::NotFound(id))
                } else {
                    Ok(())
                }
            })
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        run_blocking(&self.pool, move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn list(&self) -> TaskRepositoryResult<Vec<Task>> {
        self.list_where(|query| query).await
    }

    async fn find_by_creator(&self, creator: &UserId) -> TaskRepositoryResult<Vec<Task>> {
        let creator = creator.as_str().to_owned();
        self.list_where(move |query| query.filter(tasks::creator_id.eq(creator)))
            .await
    }

    async fn find_by_assignee(&self, assignee: &UserId) -> TaskRepositoryResult<Vec<Task>> {
        let assignee = assignee.as_str().to_owned();
        self.list_where(move |query| query.filter(tasks::assignee_id.eq(assignee)))
            .await
    }
}

/// Chat log rows for `task_id`, oldest first, insertion order within one
/// timestamp.
pub(super) fn task_log_query(task_id: TaskId) -> task_messages::BoxedQuery<'static, Pg> {
    task_messages::table
        .filter(task_messages::task_id.eq(task_id.into_inner()))
        .order((task_messages::created_at.asc(), task_messages::seq.asc()))
        .into_boxed()
}

#[async_trait]
impl TaskMessageRepository for PostgresTaskMessageRepository {
    async fn append(&self, message: &TaskMessage) -> TaskRepositoryResult<()> {
        let row = to_message_row(message);
        run_blocking(&self.pool, move |connection| {
            diesel::insert_into(task_messages::table)
                .values(&row)
                .execute(connection)
                .map_err(TaskRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn list_for_task(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<TaskMessage>> {
        run_blocking(&self.pool, move |connection| {
            task_log_query(task_id)
                .select(TaskMessageRow::as_select())
                .load::<TaskMessageRow>(connection)
                .map_err(TaskRepositoryError::persistence)?
                .into_iter()
                .map(row_to_message)
                .collect()
        })
        .await
    }
}

fn classify_missed_update(
    connection: &mut PgConnection,
    task_id: TaskId,
    expected: i64,
) -> TaskRepositoryError {
    let exists = diesel::select(diesel::dsl::exists(
        tasks::table.filter(tasks::id.eq(task_id.into_inner())),
    ))
    .get_result::<bool>(connection);
    match exists {
        Ok(true) => TaskRepositoryError::Conflict {
            id: task_id,
            expected: u64::try_from(expected).unwrap_or_default(),
        },
        Ok(false) => TaskRepositoryError::NotFound(task_id),
        Err(err) => TaskRepositoryError::persistence(err),
    }
}

fn to_db_int(value: u64) -> TaskRepositoryResult<i64> {
    i64::try_from(value).map_err(TaskRepositoryError::persistence)
}

pub(super) fn to_new_row(task: &Task) -> TaskRepositoryResult<NewTaskRow> {
    Ok(NewTaskRow {
        id: task.id().into_inner(),
        title: task.title().to_owned(),
        description: task.description().to_owned(),
        category: task.category().to_owned(),
        deposit_lamports: to_db_int(task.deposit().value())?,
        status: task.status().as_str().to_owned(),
        creator_id: task.creator().as_str().to_owned(),
        assignee_id: task.assignee().map(|id| id.as_str().to_owned()),
        escrow: task
            .escrow()
            .map(serde_json::to_value)
            .transpose()
            .map_err(TaskRepositoryError::persistence)?,
        revision: to_db_int(task.revision())?,
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    })
}

fn to_changeset(task: &Task) -> TaskRepositoryResult<TaskChangeset> {
    let row = to_new_row(task)?;
    Ok(TaskChangeset {
        title: row.title,
        description: row.description,
        category: row.category,
        status: row.status,
        assignee_id: row.assignee_id,
        escrow: row.escrow,
        revision: row.revision,
        updated_at: row.updated_at,
    })
}

pub(super) fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let TaskRow {
        id,
        title,
        description,
        category,
        deposit_lamports,
        status,
        creator_id,
        assignee_id,
        escrow,
        revision,
        created_at,
        updated_at,
    } = row;

    let data = PersistedTaskData {
        id: TaskId::from_uuid(id),
        title,
        description,
        category,
        deposit: Lamports::new(
            u64::try_from(deposit_lamports).map_err(TaskRepositoryError::persistence)?,
        ),
        status: TaskStatus::try_from(status.as_str()).map_err(TaskRepositoryError::persistence)?,
        creator: UserId::new(creator_id).map_err(TaskRepositoryError::persistence)?,
        assignee: assignee_id
            .map(UserId::new)
            .transpose()
            .map_err(TaskRepositoryError::persistence)?,
        escrow: escrow
            .map(serde_json::from_value)
            .transpose()
            .map_err(TaskRepositoryError::persistence)?,
        revision: u64::try_from(revision).map_err(TaskRepositoryError::persistence)?,
        created_at,
        updated_at,
    };
    Ok(Task::from_persisted(data))
}

pub(super) fn to_message_row(message: &TaskMessage) -> TaskMessageRow {
    TaskMessageRow {
        id: message.id().into_inner(),
        task_id: message.task_id().into_inner(),
        sender_id: message.sender().as_str().to_owned(),
        body: message.body().to_owned(),
        created_at: message.created_at(),
    }
}

pub(super) fn row_to_message(row: TaskMessageRow) -> TaskRepositoryResult<TaskMessage> {
    Ok(TaskMessage::from_persisted(PersistedMessageData {
        id: MessageId::from_uuid(row.id),
        task_id: TaskId::from_uuid(row.task_id),
        sender: UserId::new(row.sender_id).map_err(TaskRepositoryError::persistence)?,
        body: row.body,
        created_at: row.created_at,
    }))
}
