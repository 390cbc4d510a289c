//! Wire payloads for callable endpoints.
//!
//! Field names are camelCase. SOL amounts travel as floating-point SOL,
//! task ids as UUID strings, and timestamps as RFC 3339.

use crate::escrow::domain::{EscrowRecord, SettlementReceipt};
use crate::identity::domain::Profile;
use crate::task::domain::{Task, TaskMessage};
use crate::wallet::{domain::Lamports, domain::Wallet, services::WalletBalances};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Payload naming a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRef {
    /// Task identifier.
    pub task_id: String,
}

/// `connectExternalWallet` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectWalletPayload {
    /// Base58 public key to connect.
    pub pubkey: String,
}

/// `depositToEscrow` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositPayload {
    /// Task to fund.
    pub task_id: String,
    /// Paying wallet.
    pub from_pubkey: String,
    /// Amount in SOL.
    #[serde(rename = "amountSOL")]
    pub amount_sol: f64,
}

/// `createTask` payload.
///
/// When `fromPubkey` is present the deposit is escrowed immediately, and a
/// failed deposit leaves no task behind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskPayload {
    /// Task title.
    pub title: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Free-text category.
    #[serde(default)]
    pub category: String,
    /// Promised payment in SOL.
    pub deposit: f64,
    /// Wallet to escrow the deposit from.
    #[serde(default)]
    pub from_pubkey: Option<String>,
}

/// `postMessage` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMessagePayload {
    /// Task whose chat log receives the message.
    pub task_id: String,
    /// Message text.
    pub content: String,
}

/// `submitReview` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPayload {
    /// Reviewed user.
    pub user_id: String,
    /// Thumbs up or down.
    pub positive: bool,
    /// Optional comment.
    #[serde(default)]
    pub comment: Option<String>,
    /// Optional image references.
    #[serde(default)]
    pub images: Vec<String>,
}

/// `signIn` payload. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInPayload {
    /// Provider display name.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Provider email.
    #[serde(default)]
    pub email: Option<String>,
    /// Role to use if the profile is created now.
    #[serde(default)]
    pub role: Option<String>,
}

/// A wallet as shown to its owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletView {
    /// Base58 public key.
    pub pubkey: String,
    /// Recovery phrase, present only right after generation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passphrase: Option<String>,
    /// Balance in SOL.
    pub balance: f64,
    /// `true` for the custodial native wallet.
    pub is_native: bool,
}

impl From<&Wallet> for WalletView {
    fn from(wallet: &Wallet) -> Self {
        Self {
            pubkey: wallet.address().as_str().to_owned(),
            passphrase: wallet
                .recovery_phrase()
                .map(|phrase| phrase.reveal().to_owned()),
            balance: wallet.balance().unwrap_or(Lamports::ZERO).as_sol(),
            is_native: wallet.is_native(),
        }
    }
}

/// `fetchBalances` result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalancesView {
    /// Native wallet, or `null`.
    pub native_wallet: Option<WalletView>,
    /// External wallets.
    pub external_wallets: Vec<WalletView>,
}

impl From<&WalletBalances> for BalancesView {
    fn from(balances: &WalletBalances) -> Self {
        Self {
            native_wallet: balances.native_wallet.as_ref().map(WalletView::from),
            external_wallets: balances.external_wallets.iter().map(WalletView::from).collect(),
        }
    }
}

/// `depositToEscrow` result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositView {
    /// Always `true`; failures are errors.
    pub success: bool,
    /// Deposit transaction id.
    pub tx_id: String,
    /// Payer balance after the deposit. Always zero.
    pub new_balance: f64,
    /// `simulated`, `confirmed`, or `unverified`.
    pub verification: String,
}

/// `transferForTask` and `releaseEscrow` result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementView {
    /// Always `true`; failures are errors.
    pub success: bool,
    /// Release transaction id.
    pub tx_id: String,
    /// `simulated`, `confirmed`, or `unverified`.
    pub verification: String,
}

impl From<&SettlementReceipt> for SettlementView {
    fn from(receipt: &SettlementReceipt) -> Self {
        Self {
            success: true,
            tx_id: receipt.tx_id.as_str().to_owned(),
            verification: receipt.verification.as_str().to_owned(),
        }
    }
}

/// Escrow record as embedded in [`TaskView`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EscrowView {
    /// Deposit transaction id.
    pub tx_id: String,
    /// Paying wallet.
    pub from: String,
    /// Depositing user.
    pub to: String,
    /// Escrowed amount in SOL.
    pub amount: f64,
    /// `funded` or `released`.
    pub state: String,
    /// `simulated`, `confirmed`, or `unverified`.
    pub verification: String,
    /// Release transaction id.
    pub release_tx_id: Option<String>,
    /// Why settlement failed, for unverified releases.
    pub failure_note: Option<String>,
}

impl From<&EscrowRecord> for EscrowView {
    fn from(escrow: &EscrowRecord) -> Self {
        Self {
            tx_id: escrow.tx_id().as_str().to_owned(),
            from: escrow.from().as_str().to_owned(),
            to: escrow.to().as_str().to_owned(),
            amount: escrow.amount().as_sol(),
            state: escrow.state().as_str().to_owned(),
            verification: escrow.verification().as_str().to_owned(),
            release_tx_id: escrow.release_tx_id().map(|tx| tx.as_str().to_owned()),
            failure_note: escrow.failure_note().map(str::to_owned),
        }
    }
}

/// A task as returned by task endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    /// Task identifier.
    pub id: String,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Category.
    pub category: String,
    /// Promised payment in SOL.
    pub deposit: f64,
    /// Lifecycle status.
    pub status: String,
    /// Posting user.
    pub creator_id: String,
    /// Accepting provider.
    pub assigned_to: Option<String>,
    /// Escrow record, if funded.
    pub escrow: Option<EscrowView>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl From<&Task> for TaskView {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id().to_string(),
            title: task.title().to_owned(),
            description: task.description().to_owned(),
            category: task.category().to_owned(),
            deposit: task.deposit().as_sol(),
            status: task.status().as_str().to_owned(),
            creator_id: task.creator().as_str().to_owned(),
            assigned_to: task.assignee().map(|user| user.as_str().to_owned()),
            escrow: task.escrow().map(EscrowView::from),
            created_at: task.created_at(),
            updated_at: task.updated_at(),
        }
    }
}

/// A chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    /// Message identifier.
    pub id: String,
    /// Task the message belongs to.
    pub task_id: String,
    /// Sending user.
    pub sender_id: String,
    /// Message text.
    pub content: String,
    /// Send time.
    pub created_at: DateTime<Utc>,
}

impl From<&TaskMessage> for MessageView {
    fn from(message: &TaskMessage) -> Self {
        Self {
            id: message.id().to_string(),
            task_id: message.task_id().to_string(),
            sender_id: message.sender().as_str().to_owned(),
            content: message.body().to_owned(),
            created_at: message.created_at(),
        }
    }
}

/// Reputation summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReputationView {
    /// Share of positive reviews in basis points.
    pub score_bps: u16,
    /// Number of reviews.
    pub review_count: u32,
    /// Reputation band.
    pub tier: String,
}

/// A profile as shown to its owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    /// Identity-provider user id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Email.
    pub email: String,
    /// `diaspora` or `local`.
    pub role: String,
    /// Verification status.
    pub verification: String,
    /// Native wallet.
    pub native_wallet: Option<WalletView>,
    /// External wallets.
    pub external_wallets: Vec<WalletView>,
    /// Reputation summary.
    pub reputation: ReputationView,
}

impl From<&Profile> for ProfileView {
    fn from(profile: &Profile) -> Self {
        let reputation = profile.reputation();
        Self {
            id: profile.id().as_str().to_owned(),
            name: profile.display_name().to_owned(),
            email: profile.email().to_owned(),
            role: profile.role().as_str().to_owned(),
            verification: profile.verification().as_str().to_owned(),
            native_wallet: profile.native_wallet().map(WalletView::from),
            external_wallets: profile.external_wallets().iter().map(WalletView::from).collect(),
            reputation: ReputationView {
                score_bps: reputation.score_bps(),
                review_count: reputation.review_count(),
                tier: reputation.tier().as_str().to_owned(),
            },
        }
    }
}

/// `signIn` result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInView {
    /// The bound profile.
    pub profile: ProfileView,
    /// `true` when this call created the profile.
    pub created: bool,
    /// Recovery phrase of a native wallet generated by this call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passphrase: Option<String>,
}

/// `listTasks` payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListPayload {
    /// `all` (default), `posted`, or `accepted`.
    #[serde(default)]
    pub view: Option<String>,
}
