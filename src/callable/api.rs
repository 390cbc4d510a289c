//! Endpoint implementations and name-based dispatch.

use super::{
    CallableError, CallableResult, CallerContext,
    dto::{
        BalancesView, ConnectWalletPayload, CreateTaskPayload, DepositPayload, DepositView,
        MessageView, PostMessagePayload, ProfileView, ReviewPayload, SettlementView,
        SignInPayload, SignInView, TaskListPayload, TaskRef, TaskView, WalletView,
    },
};
use crate::escrow::{
    ports::EscrowSettlement,
    services::{DepositRequest, EscrowService},
};
use crate::identity::{
    domain::{SignInEvent, UserId, UserRole},
    ports::ProfileRepository,
    services::{IdentityBindingService, SubmitReviewRequest},
};
use crate::task::{
    domain::TaskId,
    ports::{TaskMessageRepository, TaskRepository},
    services::{CreateTaskRequest, TaskLifecycleService},
};
use crate::wallet::{
    domain::Lamports,
    ports::{ChainBalanceSource, KeypairGenerator},
    services::WalletRegistryService,
};
use mockable::Clock;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Named remote procedures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Procedure {
    /// `signIn`
    SignIn,
    /// `generateWallet`
    GenerateWallet,
    /// `connectExternalWallet`
    ConnectExternalWallet,
    /// `fetchBalances`
    FetchBalances,
    /// `depositToEscrow`
    DepositToEscrow,
    /// `transferForTask`
    TransferForTask,
    /// `releaseEscrow`
    ReleaseEscrow,
    /// `createTask`
    CreateTask,
    /// `acceptTask`
    AcceptTask,
    /// `finalizeTask`
    FinalizeTask,
    /// `postMessage`
    PostMessage,
    /// `listMessages`
    ListMessages,
    /// `listTasks`
    ListTasks,
    /// `submitReview`
    SubmitReview,
}

impl Procedure {
    /// Every procedure, in wire-name order of introduction.
    pub const ALL: [Self; 14] = [
        Self::SignIn,
        Self::GenerateWallet,
        Self::ConnectExternalWallet,
        Self::FetchBalances,
        Self::DepositToEscrow,
        Self::TransferForTask,
        Self::ReleaseEscrow,
        Self::CreateTask,
        Self::AcceptTask,
        Self::FinalizeTask,
        Self::PostMessage,
        Self::ListMessages,
        Self::ListTasks,
        Self::SubmitReview,
    ];

    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SignIn => "signIn",
            Self::GenerateWallet => "generateWallet",
            Self::ConnectExternalWallet => "connectExternalWallet",
            Self::FetchBalances => "fetchBalances",
            Self::DepositToEscrow => "depositToEscrow",
            Self::TransferForTask => "transferForTask",
            Self::ReleaseEscrow => "releaseEscrow",
            Self::CreateTask => "createTask",
            Self::AcceptTask => "acceptTask",
            Self::FinalizeTask => "finalizeTask",
            Self::PostMessage => "postMessage",
            Self::ListMessages => "listMessages",
            Self::ListTasks => "listTasks",
            Self::SubmitReview => "submitReview",
        }
    }

    /// Looks up a procedure by wire name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|procedure| procedure.as_str() == name)
    }
}

impl fmt::Display for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Callable surface over the marketplace services.
pub struct MarketplaceApi<P, B, K, R, M, S, C>
where
    P: ProfileRepository,
    B: ChainBalanceSource,
    K: KeypairGenerator,
    R: TaskRepository,
    M: TaskMessageRepository,
    S: EscrowSettlement,
    C: Clock + Send + Sync,
{
    identity: IdentityBindingService<P, B, K, C>,
    wallets: WalletRegistryService<P, B, K, C>,
    tasks: TaskLifecycleService<R, M, S, C>,
}

impl<P, B, K, R, M, S, C> Clone for MarketplaceApi<P, B, K, R, M, S, C>
where
    P: ProfileRepository,
    B: ChainBalanceSource,
    K: KeypairGenerator,
    R: TaskRepository,
    M: TaskMessageRepository,
    S: EscrowSettlement,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            identity: self.identity.clone(),
            wallets: self.wallets.clone(),
            tasks: self.tasks.clone(),
        }
    }
}

impl<P, B, K, R, M, S, C> MarketplaceApi<P, B, K, R, M, S, C>
where
    P: ProfileRepository,
    B: ChainBalanceSource,
    K: KeypairGenerator,
    R: TaskRepository,
    M: TaskMessageRepository,
    S: EscrowSettlement,
    C: Clock + Send + Sync,
{
    /// Creates the callable surface.
    #[must_use]
    pub const fn new(
        identity: IdentityBindingService<P, B, K, C>,
        wallets: WalletRegistryService<P, B, K, C>,
        tasks: TaskLifecycleService<R, M, S, C>,
    ) -> Self {
        Self {
            identity,
            wallets,
            tasks,
        }
    }

    /// Wires the services over one set of ports.
    ///
    /// Identity binding and the wallet registry share `profiles`; the task
    /// lifecycle and escrow share `tasks`.
    #[must_use]
    pub fn from_ports(
        profiles: Arc<P>,
        chain: Arc<B>,
        keygen: Arc<K>,
        tasks: Arc<R>,
        messages: Arc<M>,
        settlement: Arc<S>,
        clock: Arc<C>,
    ) -> Self {
        let wallets = WalletRegistryService::new(
            Arc::clone(&profiles),
            chain,
            keygen,
            Arc::clone(&clock),
        );
        let identity = IdentityBindingService::new(profiles, wallets.clone(), Arc::clone(&clock));
        let escrow = EscrowService::new(Arc::clone(&tasks), settlement, Arc::clone(&clock));
        let lifecycle = TaskLifecycleService::new(tasks, messages, escrow, clock);
        Self::new(identity, wallets, lifecycle)
    }

    /// Invokes the procedure called `name` with a JSON payload.
    ///
    /// The caller is authenticated before the payload is read.
    ///
    /// # Errors
    ///
    /// Returns `not-found` for an unknown name, `unauthenticated` without a
    /// caller, `invalid-argument` for a malformed payload, and otherwise the
    /// endpoint's own error.
    pub async fn dispatch(
        &self,
        name: &str,
        ctx: &CallerContext,
        payload: Value,
    ) -> CallableResult<Value> {
        let procedure = Procedure::from_name(name)
            .ok_or_else(|| CallableError::not_found(format!("unknown procedure: {name}")))?;
        ctx.require_uid()?;
        debug!(%procedure, "dispatching callable");

        match procedure {
            Procedure::SignIn => to_json(&self.sign_in(ctx, parse_or_default(payload)?).await?),
            Procedure::GenerateWallet => to_json(&self.generate_wallet(ctx).await?),
            Procedure::ConnectExternalWallet => {
                to_json(&self.connect_external_wallet(ctx, &parse(payload)?).await?)
            }
            Procedure::FetchBalances => to_json(&self.fetch_balances(ctx).await?),
            Procedure::DepositToEscrow => {
                to_json(&self.deposit_to_escrow(ctx, parse(payload)?).await?)
            }
            Procedure::TransferForTask => {
                to_json(&self.transfer_for_task(ctx, &parse(payload)?).await?)
            }
            Procedure::ReleaseEscrow => to_json(&self.release_escrow(ctx, &parse(payload)?).await?),
            Procedure::CreateTask => to_json(&self.create_task(ctx, parse(payload)?).await?),
            Procedure::AcceptTask => to_json(&self.accept_task(ctx, &parse(payload)?).await?),
            Procedure::FinalizeTask => to_json(&self.finalize_task(ctx, &parse(payload)?).await?),
            Procedure::PostMessage => to_json(&self.post_message(ctx, &parse(payload)?).await?),
            Procedure::ListMessages => to_json(&self.list_messages(ctx, &parse(payload)?).await?),
            Procedure::ListTasks => to_json(&self.list_tasks(ctx, &parse_or_default(payload)?).await?),
            Procedure::SubmitReview => to_json(&self.submit_review(ctx, parse(payload)?).await?),
        }
    }

    /// `signIn`: binds the caller's identity, creating the profile and
    /// native wallet on first sign-in.
    ///
    /// # Errors
    ///
    /// Returns `unauthenticated`, `invalid-argument` for an unknown role, or
    /// the identity binding error.
    pub async fn sign_in(
        &self,
        ctx: &CallerContext,
        payload: SignInPayload,
    ) -> CallableResult<SignInView> {
        let uid = ctx.require_uid()?;
        let role = match payload.role.as_deref() {
            Some(raw) => UserRole::try_from(raw)
                .map_err(|err| CallableError::invalid_argument(err.to_string()))?,
            None => UserRole::default(),
        };
        let mut event = SignInEvent::new(uid.clone());
        if let Some(name) = payload.display_name {
            event = event.with_display_name(name);
        }
        if let Some(email) = payload.email {
            event = event.with_email(email);
        }

        let outcome = self.identity.on_sign_in_as(&event, role).await?;
        Ok(SignInView {
            profile: ProfileView::from(&outcome.profile),
            created: outcome.created,
            passphrase: outcome
                .recovery_phrase
                .map(|phrase| phrase.reveal().to_owned()),
        })
    }

    /// `generateWallet`: returns the caller's native wallet, generating one
    /// when absent. A caller without a profile is bound first.
    ///
    /// The passphrase is present only on the call that generated the
    /// wallet.
    ///
    /// # Errors
    ///
    /// Returns `unauthenticated` or the wallet registry error.
    pub async fn generate_wallet(&self, ctx: &CallerContext) -> CallableResult<WalletView> {
        let uid = ctx.require_uid()?;
        if self.identity.find(uid).await?.is_none() {
            let outcome = self.identity.on_sign_in(&SignInEvent::new(uid.clone())).await?;
            if let Some(wallet) = outcome.profile.native_wallet() {
                let mut view = WalletView::from(wallet);
                view.passphrase = outcome
                    .recovery_phrase
                    .map(|phrase| phrase.reveal().to_owned());
                return Ok(view);
            }
        }
        let outcome = self.wallets.generate_native_wallet(uid).await?;
        Ok(WalletView::from(&outcome.wallet))
    }

    /// `connectExternalWallet`: appends a user-supplied key.
    ///
    /// # Errors
    ///
    /// Returns `unauthenticated`, `invalid-argument` for an empty key, or
    /// `not-found` without a profile.
    pub async fn connect_external_wallet(
        &self,
        ctx: &CallerContext,
        payload: &ConnectWalletPayload,
    ) -> CallableResult<WalletView> {
        let uid = ctx.require_uid()?;
        let wallet = self
            .wallets
            .connect_external_wallet(uid, &payload.pubkey)
            .await?;
        Ok(WalletView::from(&wallet))
    }

    /// `fetchBalances`: refreshes every wallet balance from the chain.
    ///
    /// # Errors
    ///
    /// Returns `unauthenticated`, or `not-found` without a profile.
    pub async fn fetch_balances(&self, ctx: &CallerContext) -> CallableResult<BalancesView> {
        let uid = ctx.require_uid()?;
        let balances = self.wallets.fetch_balances(uid).await?;
        Ok(BalancesView::from(&balances))
    }

    /// `depositToEscrow`: records a funded escrow on a task.
    ///
    /// # Errors
    ///
    /// Returns `unauthenticated`, `invalid-argument` for a bad id, key, or
    /// amount, `not-found` for a missing task, or `failed-precondition`
    /// when the task already has an escrow.
    pub async fn deposit_to_escrow(
        &self,
        ctx: &CallerContext,
        payload: DepositPayload,
    ) -> CallableResult<DepositView> {
        let uid = ctx.require_uid()?;
        let task_id = parse_task_id(&payload.task_id)?;
        let request = DepositRequest::new(uid.clone(), task_id, payload.from_pubkey, payload.amount_sol);
        let outcome = self.tasks.escrow().deposit_to_escrow(request).await?;
        Ok(DepositView {
            success: true,
            tx_id: outcome.receipt.tx_id.as_str().to_owned(),
            new_balance: outcome.new_balance.as_sol(),
            verification: outcome.receipt.verification.as_str().to_owned(),
        })
    }

    /// `transferForTask`: releases the escrow and completes the task.
    ///
    /// # Errors
    ///
    /// Returns `unauthenticated`, `not-found` for a missing task, or
    /// `failed-precondition` without a funded escrow or when the task
    /// cannot complete.
    pub async fn transfer_for_task(
        &self,
        ctx: &CallerContext,
        payload: &TaskRef,
    ) -> CallableResult<SettlementView> {
        ctx.require_uid()?;
        let task_id = parse_task_id(&payload.task_id)?;
        let outcome = self.tasks.escrow().transfer_for_task(task_id).await?;
        Ok(SettlementView::from(&outcome.receipt))
    }

    /// `releaseEscrow`: releases the escrow without changing task status.
    ///
    /// # Errors
    ///
    /// Returns `unauthenticated`, `not-found` for a missing task, or
    /// `failed-precondition` without a funded escrow.
    pub async fn release_escrow(
        &self,
        ctx: &CallerContext,
        payload: &TaskRef,
    ) -> CallableResult<SettlementView> {
        ctx.require_uid()?;
        let task_id = parse_task_id(&payload.task_id)?;
        let outcome = self.tasks.escrow().release_escrow(task_id).await?;
        Ok(SettlementView::from(&outcome.receipt))
    }

    /// `createTask`: posts a task as the caller, escrowing the deposit when
    /// `fromPubkey` is given.
    ///
    /// # Errors
    ///
    /// Returns `unauthenticated`, `invalid-argument` for a blank title or a
    /// bad deposit, or the deposit error after the task was removed.
    pub async fn create_task(
        &self,
        ctx: &CallerContext,
        payload: CreateTaskPayload,
    ) -> CallableResult<TaskView> {
        let uid = ctx.require_uid()?;
        let deposit = Lamports::from_sol(payload.deposit)?;
        let request = CreateTaskRequest::new(payload.title, uid.clone(), deposit)
            .with_description(payload.description)
            .with_category(payload.category);
        let task = match payload.from_pubkey {
            Some(from_pubkey) => {
                self.tasks
                    .create_and_deposit(request, &from_pubkey, payload.deposit)
                    .await?
                    .task
            }
            None => self.tasks.create(request).await?,
        };
        Ok(TaskView::from(&task))
    }

    /// `acceptTask`: assigns an open task to the caller.
    ///
    /// # Errors
    ///
    /// Returns `unauthenticated`, `not-found`, or `failed-precondition`
    /// when the task is not open or the caller created it.
    pub async fn accept_task(
        &self,
        ctx: &CallerContext,
        payload: &TaskRef,
    ) -> CallableResult<TaskView> {
        let uid = ctx.require_uid()?;
        let task_id = parse_task_id(&payload.task_id)?;
        let task = self.tasks.accept(task_id, uid).await?;
        Ok(TaskView::from(&task))
    }

    /// `finalizeTask`: marks an accepted task done and settles its escrow.
    ///
    /// # Errors
    ///
    /// Returns `unauthenticated`, `not-found`, or `failed-precondition`
    /// when the task is not accepted or the caller is not a participant.
    pub async fn finalize_task(
        &self,
        ctx: &CallerContext,
        payload: &TaskRef,
    ) -> CallableResult<TaskView> {
        let uid = ctx.require_uid()?;
        let task_id = parse_task_id(&payload.task_id)?;
        let task = self.tasks.finalize(task_id, uid).await?;
        Ok(TaskView::from(&task))
    }

    /// `postMessage`: appends to a task's chat log.
    ///
    /// # Errors
    ///
    /// Returns `unauthenticated`, `invalid-argument` for a blank message,
    /// or `not-found`.
    pub async fn post_message(
        &self,
        ctx: &CallerContext,
        payload: &PostMessagePayload,
    ) -> CallableResult<MessageView> {
        let uid = ctx.require_uid()?;
        let task_id = parse_task_id(&payload.task_id)?;
        let message = self.tasks.post_message(task_id, uid, &payload.content).await?;
        Ok(MessageView::from(&message))
    }

    /// `listMessages`: returns a task's chat log, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `unauthenticated` or `not-found`.
    pub async fn list_messages(
        &self,
        ctx: &CallerContext,
        payload: &TaskRef,
    ) -> CallableResult<Vec<MessageView>> {
        ctx.require_uid()?;
        let task_id = parse_task_id(&payload.task_id)?;
        let messages = self.tasks.messages(task_id).await?;
        Ok(messages.iter().map(MessageView::from).collect())
    }

    /// `listTasks`: returns tasks newest first, optionally only those the
    /// caller posted or accepted.
    ///
    /// # Errors
    ///
    /// Returns `unauthenticated`, or `invalid-argument` for an unknown view.
    pub async fn list_tasks(
        &self,
        ctx: &CallerContext,
        payload: &TaskListPayload,
    ) -> CallableResult<Vec<TaskView>> {
        let uid = ctx.require_uid()?;
        let tasks = match payload.view.as_deref().unwrap_or("all") {
            "all" => self.tasks.list().await?,
            "posted" => self.tasks.list_by_creator(uid).await?,
            "accepted" => self.tasks.list_by_assignee(uid).await?,
            other => {
                return Err(CallableError::invalid_argument(format!(
                    "unknown task view: {other}"
                )));
            }
        };
        Ok(tasks.iter().map(TaskView::from).collect())
    }

    /// `submitReview`: records the caller's review of another user.
    ///
    /// # Errors
    ///
    /// Returns `unauthenticated`, `invalid-argument` for an empty user id,
    /// `failed-precondition` for a self-review, or `not-found`.
    pub async fn submit_review(
        &self,
        ctx: &CallerContext,
        payload: ReviewPayload,
    ) -> CallableResult<ProfileView> {
        let uid = ctx.require_uid()?;
        let subject = UserId::new(payload.user_id)?;
        let mut request = SubmitReviewRequest::new(subject, uid.clone(), payload.positive)
            .with_images(payload.images);
        if let Some(comment) = payload.comment {
            request = request.with_comment(comment);
        }
        let profile = self.identity.record_review(request).await?;
        Ok(ProfileView::from(&profile))
    }
}

fn parse_task_id(raw: &str) -> CallableResult<TaskId> {
    Uuid::parse_str(raw.trim())
        .map(TaskId::from_uuid)
        .map_err(|err| CallableError::invalid_argument(format!("invalid task id '{raw}': {err}")))
}

fn parse<T: DeserializeOwned>(payload: Value) -> CallableResult<T> {
    serde_json::from_value(payload)
        .map_err(|err| CallableError::invalid_argument(format!("malformed payload: {err}")))
}

fn parse_or_default<T: DeserializeOwned + Default>(payload: Value) -> CallableResult<T> {
    if payload.is_null() {
        Ok(T::default())
    } else {
        parse(payload)
    }
}

fn to_json<T: Serialize>(value: &T) -> CallableResult<Value> {
    serde_json::to_value(value)
        .map_err(|err| CallableError::internal(format!("failed to encode result: {err}")))
}
