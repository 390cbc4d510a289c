//! Then steps for task status transition BDD scenarios.

use super::world::{TaskTransitionWorld, TransitionOutcome, run_async};
use kaam_connect::task::{
    domain::{TaskDomainError, TaskStatus},
    services::TaskLifecycleError,
};
use rstest_bdd_macros::then;

#[then(r#"the task status is "{status}""#)]
fn task_status_is(world: &TaskTransitionWorld, status: String) -> Result<(), eyre::Report> {
    let expected = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    let task_id = world
        .last_created_task
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing created task"))?
        .id();

    let stored = run_async(world.service.find(task_id))?
        .ok_or_else(|| eyre::eyre!("task {task_id} vanished"))?;

    if stored.status() != expected {
        return Err(eyre::eyre!(
            "expected status {}, found {}",
            expected.as_str(),
            stored.status().as_str()
        ));
    }
    Ok(())
}

#[then("the transition fails with an invalid transition error")]
fn transition_fails_with_invalid_transition(
    world: &TaskTransitionWorld,
) -> Result<(), eyre::Report> {
    let outcome = world
        .last_transition
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing transition result"))?;

    if !matches!(
        outcome,
        TransitionOutcome::Applied(Err(TaskLifecycleError::Domain(
            TaskDomainError::InvalidTransition { .. }
        )))
    ) {
        return Err(eyre::eyre!("expected InvalidTransition error, got {outcome:?}"));
    }
    Ok(())
}

#[then("the transition fails with an unknown status error")]
fn transition_fails_with_unknown_status(world: &TaskTransitionWorld) -> Result<(), eyre::Report> {
    let outcome = world
        .last_transition
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing transition result"))?;

    if !matches!(outcome, TransitionOutcome::UnknownStatus(_)) {
        return Err(eyre::eyre!("expected unknown status error, got {outcome:?}"));
    }
    Ok(())
}
