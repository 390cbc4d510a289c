//! When steps for marketplace flow BDD scenarios.

use super::world::{MarketplaceWorld, PAYER, run_async};
use kaam_connect::callable::CallerContext;
use rstest_bdd_macros::when;
use serde_json::{Value, json};

fn record_posted_task(world: &mut MarketplaceWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing createTask result"))?;
    let task = result
        .as_ref()
        .map_err(|err| eyre::eyre!("createTask failed: {err}"))?;
    let id = task["id"]
        .as_str()
        .ok_or_else(|| eyre::eyre!("createTask response has no id: {task}"))?;
    world.task_id = Some(id.to_owned());
    Ok(())
}

#[when(r#""{uid}" posts a task "{title}" worth {amount:f64} SOL funded by the payer wallet"#)]
fn post_funded_task(
    world: &mut MarketplaceWorld,
    uid: String,
    title: String,
    amount: f64,
) -> Result<(), eyre::Report> {
    let payload = json!({
        "title": title,
        "description": "Posted from a scenario",
        "category": "errand",
        "deposit": amount,
        "fromPubkey": PAYER,
    });
    world.call_as(&uid, "createTask", payload)?;
    record_posted_task(world)
}

#[when(r#""{uid}" posts a task "{title}" worth {amount:f64} SOL"#)]
fn post_task(
    world: &mut MarketplaceWorld,
    uid: String,
    title: String,
    amount: f64,
) -> Result<(), eyre::Report> {
    let payload = json!({ "title": title, "deposit": amount });
    world.call_as(&uid, "createTask", payload)?;
    record_posted_task(world)
}

#[when(r#""{uid}" accepts the task"#)]
fn accept_task(world: &mut MarketplaceWorld, uid: String) -> Result<(), eyre::Report> {
    let payload = json!({ "taskId": world.task_id()? });
    world.call_as(&uid, "acceptTask", payload)
}

#[when(r#""{uid}" finalizes the task"#)]
fn finalize_task(world: &mut MarketplaceWorld, uid: String) -> Result<(), eyre::Report> {
    let payload = json!({ "taskId": world.task_id()? });
    world.call_as(&uid, "finalizeTask", payload)
}

#[when(r#""{uid}" generates a wallet"#)]
fn generate_wallet(world: &mut MarketplaceWorld, uid: String) -> Result<(), eyre::Report> {
    world.call_as(&uid, "generateWallet", Value::Null)?;
    let response = world
        .last_result
        .clone()
        .ok_or_else(|| eyre::eyre!("missing generateWallet result"))?
        .map_err(|err| eyre::eyre!("generateWallet failed: {err}"))?;
    world.wallet_responses.push(response);
    Ok(())
}

#[when(r#"an anonymous caller invokes "{procedure}""#)]
fn anonymous_call(world: &mut MarketplaceWorld, procedure: String) {
    let result = run_async(
        world
            .api
            .dispatch(&procedure, &CallerContext::anonymous(), Value::Null),
    );
    world.last_result = Some(result);
}
