//! Unit tests for the callable endpoints.


use std::sync::Arc;

use crate::callable::{CallerContext, MarketplaceApi};
use crate::escrow::adapters::SimulatedSettlement;
use crate::identity::{adapters::memory::InMemoryProfileRepository, domain::UserId};
use crate::task::adapters::memory::{InMemoryTaskMessageRepository, InMemoryTaskRepository};
use crate::wallet::adapters::{ed25519::Ed25519KeypairGenerator, memory::InMemoryLedger};
use mockable::DefaultClock;
use rstest::fixture;

pub(super) type TestApi = MarketplaceApi<
    InMemoryProfileRepository,
    InMemoryLedger,
    Ed25519KeypairGenerator,
    InMemoryTaskRepository,
    InMemoryTaskMessageRepository,
    SimulatedSettlement,
    DefaultClock,
>;

pub(super) struct Harness {
    pub(super) ledger: Arc<InMemoryLedger>,
    pub(super) api: TestApi,
}

#[fixture]
pub(super) fn harness() -> Harness {
    let ledger = Arc::new(InMemoryLedger::new());
    let api = MarketplaceApi::from_ports(
        Arc::new(InMemoryProfileRepository::new()),
        Arc::clone(&ledger),
        Arc::new(Ed25519KeypairGenerator::new()),
        Arc::new(InMemoryTaskRepository::new()),
        Arc::new(InMemoryTaskMessageRepository::new()),
        Arc::new(SimulatedSettlement::new()),
        Arc::new(DefaultClock),
    );
    Harness { ledger, api }
}

pub(super) fn caller(uid: &str) -> CallerContext {
    CallerContext::authenticated(UserId::new(uid).expect("valid user id"))
}

pub(super) const PAYER: &str = "11111111111111111111111111111111";
