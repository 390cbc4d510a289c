//! When steps for task status transition BDD scenarios.

use super::world::{TaskTransitionWorld, TransitionOutcome, run_async};
use kaam_connect::task::domain::TaskStatus;
use rstest_bdd_macros::when;

#[when(r#"the task is transitioned to "{target}""#)]
fn transition_task(world: &mut TaskTransitionWorld, target: String) -> Result<(), eyre::Report> {
    let task_id = world
        .last_created_task
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing created task in scenario world"))?
        .id();

    let outcome = match TaskStatus::try_from(target.as_str()) {
        Ok(status) => {
            let result = run_async(world.service.transition(task_id, status));
            if let Ok(ref updated) = result {
                world.last_created_task = Some(updated.clone());
            }
            TransitionOutcome::Applied(result)
        }
        Err(err) => TransitionOutcome::UnknownStatus(err),
    };
    world.last_transition = Some(outcome);
    Ok(())
}
