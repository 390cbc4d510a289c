//! Given steps for task status transition BDD scenarios.

use super::world::{TaskTransitionWorld, run_async};
use eyre::WrapErr;
use kaam_connect::identity::domain::UserId;
use kaam_connect::task::{domain::TaskStatus, services::CreateTaskRequest};
use kaam_connect::wallet::domain::Lamports;
use rstest_bdd_macros::given;

#[given(r#""{creator}" posted a task "{title}""#)]
fn posted_task(
    world: &mut TaskTransitionWorld,
    creator: String,
    title: String,
) -> Result<(), eyre::Report> {
    let request = CreateTaskRequest::new(title, UserId::new(creator)?, Lamports::new(500_000_000));
    let created = run_async(world.service.create(request)).wrap_err("post task for scenario")?;
    world.last_created_task = Some(created);
    Ok(())
}

#[given(r#"the task has been transitioned to "{target}""#)]
fn task_has_been_transitioned(
    world: &mut TaskTransitionWorld,
    target: String,
) -> Result<(), eyre::Report> {
    let task = world
        .last_created_task
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing created task in scenario world"))?;
    let status = TaskStatus::try_from(target.as_str())?;

    let transitioned = run_async(world.service.transition(task.id(), status))
        .wrap_err("transition task in scenario setup")?;

    world.last_created_task = Some(transitioned);
    Ok(())
}
