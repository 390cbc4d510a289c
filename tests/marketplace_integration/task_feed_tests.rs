//! Task races, chat logs, and the live task feed.

use std::sync::Arc;

use super::helpers::{PAYER, RpcApi, build_api, caller};
use kaam_connect::callable::CallableCode;
use kaam_connect::task::domain::TaskStatus;
use serde_json::{Value, json};
use wiremock::MockServer;

async fn post_task(api: &RpcApi, uid: &str, funded: bool) -> eyre::Result<String> {
    let mut payload = json!({ "title": "Queue at the passport office", "deposit": 0.75 });
    if funded {
        payload["fromPubkey"] = json!(PAYER);
    }
    let task = api
        .dispatch("createTask", &caller(uid)?, payload)
        .await
        .map_err(|err| eyre::eyre!("{err}"))?;
    task["id"]
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| eyre::eyre!("task response without id: {task}"))
}

#[tokio::test(flavor = "multi_thread")]
async fn racing_providers_leave_one_assignee_on_the_feed() -> eyre::Result<()> {
    let server = MockServer::start().await;
    let (tasks, built) = build_api(&server.uri())?;
    let shared = Arc::new(built);
    let task_id = post_task(&shared, "amara", true).await?;

    let providers = ["kofi", "esi", "yaw", "abena"];
    let mut handles = Vec::new();
    for provider in providers {
        let api = Arc::clone(&shared);
        let payload = json!({ "taskId": task_id });
        handles.push(tokio::spawn(async move {
            let ctx = caller(provider)?;
            Ok::<_, eyre::Report>((provider, api.dispatch("acceptTask", &ctx, payload).await))
        }));
    }

    let mut winners = Vec::new();
    for handle in handles {
        let (provider, result) = handle.await??;
        match result {
            Ok(_) => winners.push(provider),
            Err(err) => eyre::ensure!(
                err.code() == CallableCode::FailedPrecondition,
                "loser saw {err}"
            ),
        }
    }
    let [winner] = winners.as_slice() else {
        return Err(eyre::eyre!("expected one winner, got {winners:?}"));
    };

    let latest = tasks.hub().latest();
    let task = latest
        .items()
        .first()
        .ok_or_else(|| eyre::eyre!("feed is empty"))?;
    eyre::ensure!(task.status() == TaskStatus::Accepted, "feed shows {}", task.status());
    eyre::ensure!(
        task.assignee().map(|uid| uid.as_str()) == Some(*winner),
        "feed assignee differs from winner"
    );
    eyre::ensure!(latest.sequence() == 3, "expected 3 writes, saw {}", latest.sequence());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn chat_log_keeps_both_participants_in_order() -> eyre::Result<()> {
    let server = MockServer::start().await;
    let (_, api) = build_api(&server.uri())?;
    let task_id = post_task(&api, "amara", false).await?;
    api.dispatch("acceptTask", &caller("kofi")?, json!({ "taskId": task_id }))
        .await
        .map_err(|err| eyre::eyre!("{err}"))?;

    let lines = [
        ("amara", "Documents are in the blue folder"),
        ("kofi", "On my way"),
        ("kofi", "Number 42 in the queue"),
    ];
    for (uid, content) in lines {
        api.dispatch(
            "postMessage",
            &caller(uid)?,
            json!({ "taskId": task_id, "content": content }),
        )
        .await
        .map_err(|err| eyre::eyre!("{err}"))?;
    }

    let log = api
        .dispatch("listMessages", &caller("amara")?, json!({ "taskId": task_id }))
        .await
        .map_err(|err| eyre::eyre!("{err}"))?;
    let entries: Vec<(String, String)> = log
        .as_array()
        .ok_or_else(|| eyre::eyre!("log is not a list: {log}"))?
        .iter()
        .map(|entry| {
            (
                entry["senderId"].as_str().unwrap_or_default().to_owned(),
                entry["content"].as_str().unwrap_or_default().to_owned(),
            )
        })
        .collect();
    let expected: Vec<(String, String)> = lines
        .iter()
        .map(|(uid, content)| ((*uid).to_owned(), (*content).to_owned()))
        .collect();
    eyre::ensure!(entries == expected, "log out of order: {entries:?}");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn blank_message_is_rejected() -> eyre::Result<()> {
    let server = MockServer::start().await;
    let (_, api) = build_api(&server.uri())?;
    let task_id = post_task(&api, "amara", false).await?;

    let result = api
        .dispatch(
            "postMessage",
            &caller("amara")?,
            json!({ "taskId": task_id, "content": "   " }),
        )
        .await;

    eyre::ensure!(
        result.as_ref().err().map(|err| err.code()) == Some(CallableCode::InvalidArgument),
        "expected invalid-argument, got {result:?}"
    );
    let log = api
        .dispatch("listMessages", &caller("amara")?, json!({ "taskId": task_id }))
        .await
        .map_err(|err| eyre::eyre!("{err}"))?;
    eyre::ensure!(log == Value::Array(Vec::new()), "log not empty: {log}");
    Ok(())
}
