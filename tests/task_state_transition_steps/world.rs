//! Shared world state for task status transition BDD scenarios.

use std::sync::Arc;

use kaam_connect::escrow::{adapters::SimulatedSettlement, services::EscrowService};
use kaam_connect::task::{
    adapters::memory::{InMemoryTaskMessageRepository, InMemoryTaskRepository},
    domain::{ParseTaskStatusError, Task},
    services::{TaskLifecycleError, TaskLifecycleService},
};
use mockable::DefaultClock;
use rstest::fixture;

/// Service type used by the BDD world.
pub type TestTaskService = TaskLifecycleService<
    InMemoryTaskRepository,
    InMemoryTaskMessageRepository,
    SimulatedSettlement,
    DefaultClock,
>;

/// Outcome of a requested transition.
#[derive(Debug)]
pub enum TransitionOutcome {
    /// The status string did not parse.
    UnknownStatus(ParseTaskStatusError),
    /// The service applied or rejected the transition.
    Applied(Result<Task, TaskLifecycleError>),
}

/// Scenario world for task transition behaviour tests.
pub struct TaskTransitionWorld {
    pub service: TestTaskService,
    pub last_created_task: Option<Task>,
    pub last_transition: Option<TransitionOutcome>,
}

impl TaskTransitionWorld {
    /// Creates a world with an empty task store.
    #[must_use]
    pub fn new() -> Self {
        let tasks = Arc::new(InMemoryTaskRepository::new());
        let clock = Arc::new(DefaultClock);
        let escrow = EscrowService::new(
            Arc::clone(&tasks),
            Arc::new(SimulatedSettlement::new()),
            Arc::clone(&clock),
        );
        let service = TaskLifecycleService::new(
            tasks,
            Arc::new(InMemoryTaskMessageRepository::new()),
            escrow,
            clock,
        );

        Self {
            service,
            last_created_task: None,
            last_transition: None,
        }
    }
}

impl Default for TaskTransitionWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TaskTransitionWorld {
    TaskTransitionWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
