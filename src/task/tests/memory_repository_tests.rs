//! Contract tests for the in-memory task and chat log repositories.

use crate::identity::domain::UserId;
use crate::task::{
    adapters::memory::{InMemoryTaskMessageRepository, InMemoryTaskRepository},
    domain::{MessageId, PersistedMessageData, Task, TaskDraft, TaskMessage},
    ports::{TaskMessageRepository, TaskRepository, TaskRepositoryError},
};
use crate::wallet::domain::Lamports;
use mockable::{Clock, DefaultClock};
use rstest::{fixture, rstest};

#[fixture]
fn repo() -> InMemoryTaskRepository {
    InMemoryTaskRepository::new()
}

fn uid(value: &str) -> UserId {
    UserId::new(value).expect("valid user id")
}

fn task(title: &str, creator: &str) -> Task {
    Task::new(
        TaskDraft {
            title: title.to_owned(),
            description: String::new(),
            category: String::new(),
            creator: uid(creator),
            deposit: Lamports::new(1),
        },
        &DefaultClock,
    )
    .expect("valid draft")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_advances_revision(repo: InMemoryTaskRepository) {
    let mut stored = task("X", "u1");
    repo.store(&stored).await.expect("store");

    stored.accept(uid("u2"), &DefaultClock).expect("accept");
    let updated = repo.update(&stored).await.expect("update");

    assert_eq!(updated.revision(), 1);
    let found = repo.find_by_id(stored.id()).await.expect("lookup");
    assert_eq!(found, Some(updated));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stale_update_is_a_conflict(repo: InMemoryTaskRepository) {
    let original = task("X", "u1");
    repo.store(&original).await.expect("store");

    let mut first = original.clone();
    first.accept(uid("u2"), &DefaultClock).expect("accept");
    repo.update(&first).await.expect("first writer wins");

    let mut second = original.clone();
    second.accept(uid("u3"), &DefaultClock).expect("accept");
    let result = repo.update(&second).await;

    assert!(matches!(
        result,
        Err(TaskRepositoryError::Conflict { expected: 0, .. })
    ));
    let found = repo
        .find_by_id(original.id())
        .await
        .expect("lookup")
        .expect("task exists");
    assert_eq!(found.assignee(), Some(&uid("u2")));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_store_is_rejected(repo: InMemoryTaskRepository) {
    let stored = task("X", "u1");
    repo.store(&stored).await.expect("store");

    let result = repo.store(&stored).await;

    assert!(matches!(result, Err(TaskRepositoryError::DuplicateTask(id)) if id == stored.id()));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_removes_task_from_every_view(repo: InMemoryTaskRepository) {
    let mut stored = task("X", "u1");
    repo.store(&stored).await.expect("store");
    stored.accept(uid("u2"), &DefaultClock).expect("accept");
    repo.update(&stored).await.expect("update");

    repo.delete(stored.id()).await.expect("delete");

    assert_eq!(repo.find_by_id(stored.id()).await.expect("lookup"), None);
    assert!(repo.find_by_creator(&uid("u1")).await.expect("lookup").is_empty());
    assert!(repo.find_by_assignee(&uid("u2")).await.expect("lookup").is_empty());
    assert!(matches!(
        repo.delete(stored.id()).await,
        Err(TaskRepositoryError::NotFound(_))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn listings_are_newest_first(repo: InMemoryTaskRepository) {
    let older = task("older", "u1");
    tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    let newer = task("newer", "u1");
    let other = task("someone else's", "u9");
    for item in [&older, &newer, &other] {
        repo.store(item).await.expect("store");
    }

    let mine: Vec<_> = repo
        .find_by_creator(&uid("u1"))
        .await
        .expect("lookup")
        .iter()
        .map(|t| t.title().to_owned())
        .collect();
    let everything = repo.list().await.expect("lookup");

    assert_eq!(mine, vec!["newer".to_owned(), "older".to_owned()]);
    assert_eq!(everything.len(), 3);
    assert!(
        everything
            .windows(2)
            .all(|pair| match pair {
                [first, second] => first.created_at() >= second.created_at(),
                _ => true,
            })
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn messages_are_kept_per_task_in_order() {
    let messages = InMemoryTaskMessageRepository::new();
    let first_task = task("X", "u1");
    let second_task = task("Y", "u1");

    let hello = TaskMessage::new(first_task.id(), uid("u1"), "hello", &DefaultClock)
        .expect("message");
    tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    let reply = TaskMessage::new(first_task.id(), uid("u2"), "on it", &DefaultClock)
        .expect("message");
    let elsewhere = TaskMessage::new(second_task.id(), uid("u1"), "other", &DefaultClock)
        .expect("message");
    for message in [&reply, &elsewhere, &hello] {
        messages.append(message).await.expect("append");
    }

    let log = messages
        .list_for_task(first_task.id())
        .await
        .expect("lookup");

    assert_eq!(log, vec![hello, reply]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn same_instant_messages_keep_insertion_order() {
    let messages = InMemoryTaskMessageRepository::new();
    let posted = task("X", "u1");
    let instant = DefaultClock.utc();
    let log_entry = |sender: &str, body: &str| {
        TaskMessage::from_persisted(PersistedMessageData {
            id: MessageId::new(),
            task_id: posted.id(),
            sender: uid(sender),
            body: body.to_owned(),
            created_at: instant,
        })
    };
    let sent = vec![
        log_entry("u1", "first"),
        log_entry("u2", "second"),
        log_entry("u1", "third"),
    ];
    for message in &sent {
        messages.append(message).await.expect("append");
    }

    let log = messages.list_for_task(posted.id()).await.expect("lookup");

    assert_eq!(log, sent);
}
