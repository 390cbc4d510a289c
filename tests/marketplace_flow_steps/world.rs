//! Shared world state for marketplace flow BDD scenarios.

use std::sync::Arc;

use kaam_connect::callable::{CallableResult, CallerContext, MarketplaceApi};
use kaam_connect::escrow::adapters::SimulatedSettlement;
use kaam_connect::identity::{adapters::memory::InMemoryProfileRepository, domain::UserId};
use kaam_connect::snapshot::SnapshotSubscriber;
use kaam_connect::task::{
    adapters::{
        memory::{InMemoryTaskMessageRepository, InMemoryTaskRepository},
        observed::ObservedTaskRepository,
    },
    domain::Task,
};
use kaam_connect::wallet::adapters::{ed25519::Ed25519KeypairGenerator, memory::InMemoryLedger};
use mockable::DefaultClock;
use rstest::fixture;
use serde_json::Value;

/// Base58 key accepted as a deposit payer.
pub const PAYER: &str = "11111111111111111111111111111111";

/// Callable surface wired to in-memory adapters.
pub type TestApi = MarketplaceApi<
    InMemoryProfileRepository,
    InMemoryLedger,
    Ed25519KeypairGenerator,
    ObservedTaskRepository<InMemoryTaskRepository>,
    InMemoryTaskMessageRepository,
    SimulatedSettlement,
    DefaultClock,
>;

/// Scenario world for marketplace flow behaviour tests.
pub struct MarketplaceWorld {
    pub api: TestApi,
    pub feed: SnapshotSubscriber<Task>,
    pub task_id: Option<String>,
    pub last_result: Option<CallableResult<Value>>,
    pub wallet_responses: Vec<Value>,
    pub sign_in_responses: Vec<Value>,
}

impl MarketplaceWorld {
    /// Creates a world with an empty marketplace.
    #[must_use]
    pub fn new() -> Self {
        let tasks = Arc::new(ObservedTaskRepository::new(InMemoryTaskRepository::new()));
        let feed = tasks.subscribe();
        let api = MarketplaceApi::from_ports(
            Arc::new(InMemoryProfileRepository::new()),
            Arc::new(InMemoryLedger::new()),
            Arc::new(Ed25519KeypairGenerator::new()),
            tasks,
            Arc::new(InMemoryTaskMessageRepository::new()),
            Arc::new(SimulatedSettlement::new()),
            Arc::new(DefaultClock),
        );
        Self {
            api,
            feed,
            task_id: None,
            last_result: None,
            wallet_responses: Vec::new(),
            sign_in_responses: Vec::new(),
        }
    }

    /// Invokes `procedure` as `uid`, recording the outcome.
    pub fn call_as(&mut self, uid: &str, procedure: &str, payload: Value) -> Result<(), eyre::Report> {
        let ctx = CallerContext::authenticated(UserId::new(uid)?);
        let result = run_async(self.api.dispatch(procedure, &ctx, payload));
        self.last_result = Some(result);
        Ok(())
    }

    /// Returns the task id recorded by the posting step.
    pub fn task_id(&self) -> Result<&str, eyre::Report> {
        self.task_id
            .as_deref()
            .ok_or_else(|| eyre::eyre!("missing posted task in scenario world"))
    }

    /// Reads the current task as a wire view.
    pub fn current_task(&self) -> Result<Value, eyre::Report> {
        let task_id = self.task_id()?;
        let ctx = CallerContext::authenticated(UserId::new("observer")?);
        let tasks = run_async(self.api.dispatch("listTasks", &ctx, Value::Null))
            .map_err(|err| eyre::eyre!("listTasks failed: {err}"))?;
        tasks
            .as_array()
            .and_then(|list| list.iter().find(|task| task["id"] == task_id))
            .cloned()
            .ok_or_else(|| eyre::eyre!("task {task_id} not listed"))
    }
}

impl Default for MarketplaceWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> MarketplaceWorld {
    MarketplaceWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
