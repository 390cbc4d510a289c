//! Then steps for marketplace flow BDD scenarios.

use std::time::Duration;

use super::world::{MarketplaceWorld, run_async};
use kaam_connect::task::domain::TaskStatus;
use rstest_bdd_macros::then;

#[then("the call succeeds")]
fn call_succeeds(world: &MarketplaceWorld) -> Result<(), eyre::Report> {
    match world.last_result.as_ref() {
        Some(Ok(_)) => Ok(()),
        Some(Err(err)) => Err(eyre::eyre!("expected success, got {err}")),
        None => Err(eyre::eyre!("missing call result")),
    }
}

#[then(r#"the call fails with "{code}""#)]
fn call_fails_with(world: &MarketplaceWorld, code: String) -> Result<(), eyre::Report> {
    let result = world
        .last_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing call result"))?;
    match result {
        Err(err) if err.code().as_str() == code => Ok(()),
        Err(err) => Err(eyre::eyre!("expected {code}, got {err}")),
        Ok(value) => Err(eyre::eyre!("expected {code}, call returned {value}")),
    }
}

#[then(r#"the task status is "{status}""#)]
fn task_status_is(world: &MarketplaceWorld, status: String) -> Result<(), eyre::Report> {
    let task = world.current_task()?;
    eyre::ensure!(
        task["status"] == status.as_str(),
        "expected status {status}, found {}",
        task["status"]
    );
    Ok(())
}

#[then(r#"the task is assigned to "{uid}""#)]
fn task_assigned_to(world: &MarketplaceWorld, uid: String) -> Result<(), eyre::Report> {
    let task = world.current_task()?;
    eyre::ensure!(
        task["assignedTo"] == uid.as_str(),
        "expected assignee {uid}, found {}",
        task["assignedTo"]
    );
    Ok(())
}

#[then(r#"the escrow is "{state}" with "{verification}" verification"#)]
fn escrow_is(
    world: &MarketplaceWorld,
    state: String,
    verification: String,
) -> Result<(), eyre::Report> {
    let task = world.current_task()?;
    let escrow = &task["escrow"];
    eyre::ensure!(escrow.is_object(), "task has no escrow: {task}");
    eyre::ensure!(escrow["state"] == state.as_str(), "escrow state: {}", escrow["state"]);
    eyre::ensure!(
        escrow["verification"] == verification.as_str(),
        "escrow verification: {}",
        escrow["verification"]
    );
    eyre::ensure!(
        escrow["releaseTxId"].is_string(),
        "released escrow has no release transaction"
    );
    Ok(())
}

#[then("the task feed published {count:u64} snapshots")]
fn task_feed_published(world: &mut MarketplaceWorld, count: u64) -> Result<(), eyre::Report> {
    let mut last = None;
    for expected in 1..=count {
        let received = run_async(tokio::time::timeout(Duration::from_secs(1), world.feed.recv()))
            .map_err(|_| eyre::eyre!("timed out waiting for snapshot {expected}"))?
            .map_err(|err| eyre::eyre!("feed closed: {err}"))?;
        eyre::ensure!(received.missed == 0, "feed skipped {} snapshots", received.missed);
        eyre::ensure!(
            received.snapshot.sequence() == expected,
            "expected sequence {expected}, got {}",
            received.snapshot.sequence()
        );
        last = Some(received.snapshot);
    }
    let snapshot = last.ok_or_else(|| eyre::eyre!("no snapshots expected"))?;
    let task = snapshot
        .items()
        .first()
        .ok_or_else(|| eyre::eyre!("final snapshot is empty"))?;
    eyre::ensure!(
        task.status() == TaskStatus::Completed,
        "final snapshot shows {}",
        task.status()
    );
    let extra = run_async(tokio::time::timeout(Duration::from_millis(50), world.feed.recv()));
    eyre::ensure!(extra.is_err(), "feed published more than {count} snapshots");
    Ok(())
}

#[then("only the first wallet response carries a passphrase")]
fn only_first_has_passphrase(world: &MarketplaceWorld) -> Result<(), eyre::Report> {
    let [first, second] = world.wallet_responses.as_slice() else {
        return Err(eyre::eyre!(
            "expected two wallet responses, found {}",
            world.wallet_responses.len()
        ));
    };
    eyre::ensure!(first["passphrase"].is_string(), "first response: {first}");
    eyre::ensure!(second.get("passphrase").is_none(), "second response: {second}");
    Ok(())
}

#[then("both wallet responses share one public key")]
fn wallets_share_key(world: &MarketplaceWorld) -> Result<(), eyre::Report> {
    let keys: Vec<_> = world
        .wallet_responses
        .iter()
        .map(|response| response["pubkey"].clone())
        .collect();
    eyre::ensure!(
        keys.windows(2).all(|pair| pair.first() == pair.last()),
        "wallet keys differ: {keys:?}"
    );
    Ok(())
}

#[then("the sign-in response carried a passphrase")]
fn sign_in_carried_passphrase(world: &MarketplaceWorld) -> Result<(), eyre::Report> {
    let response = world
        .sign_in_responses
        .last()
        .ok_or_else(|| eyre::eyre!("no sign-in response recorded"))?;
    eyre::ensure!(response["passphrase"].is_string(), "sign-in response: {response}");
    Ok(())
}

#[then("no wallet response carries a passphrase")]
fn no_wallet_passphrase(world: &MarketplaceWorld) -> Result<(), eyre::Report> {
    eyre::ensure!(!world.wallet_responses.is_empty(), "no wallet responses recorded");
    for response in &world.wallet_responses {
        eyre::ensure!(response.get("passphrase").is_none(), "wallet response: {response}");
    }
    Ok(())
}
