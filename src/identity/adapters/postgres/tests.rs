//! Row conversion tests for the profile `PostgreSQL` adapter.

use super::models::ProfileRow;
use super::repository::{row_to_profile, to_new_row};
use crate::identity::{
    domain::{Profile, Review, SignInEvent, UserId},
    ports::ProfileRepositoryError,
};
use crate::wallet::domain::{Lamports, RecoveryPhrase, Wallet, WalletAddress};
use eyre::ensure;
use mockable::DefaultClock;
use rstest::rstest;

fn row_from(profile: &Profile) -> eyre::Result<ProfileRow> {
    let new_row = to_new_row(profile)?;
    Ok(ProfileRow {
        id: new_row.id,
        display_name: new_row.display_name,
        email: new_row.email,
        role: new_row.role,
        verification: new_row.verification,
        native_wallet: new_row.native_wallet,
        external_wallets: new_row.external_wallets,
        reviews: new_row.reviews,
        revision: new_row.revision,
        created_at: new_row.created_at,
        updated_at: new_row.updated_at,
    })
}

#[rstest]
fn stored_profile_never_contains_recovery_phrase() -> eyre::Result<()> {
    let clock = DefaultClock;
    let mut profile = Profile::new_for_sign_in(
        &SignInEvent::new(UserId::new("u1")?).with_email("amara@example.com"),
        &clock,
    );
    let wallet = Wallet::native(
        WalletAddress::new("11111111111111111111111111111111")?,
        RecoveryPhrase::new("super-secret")?,
    );
    profile.attach_native_wallet(wallet, &clock)?;
    profile.add_external_wallet(
        Wallet::external(WalletAddress::new("not-base58-0OIl")?).with_balance(Lamports::new(5)),
        &clock,
    )?;
    profile.record_review(Review::new(UserId::new("u2")?, true, &clock), &clock)?;

    let row = row_from(&profile)?;
    ensure!(!row.native_wallet.as_ref().is_some_and(|v| v.to_string().contains("super-secret")));

    let restored = row_to_profile(row)?;
    ensure!(restored == profile, "restored {restored:?} differs from {profile:?}");
    ensure!(restored.reputation().review_count() == 1);
    Ok(())
}

#[rstest]
fn unknown_role_is_a_persistence_error() -> eyre::Result<()> {
    let profile = Profile::new_for_sign_in(&SignInEvent::new(UserId::new("u1")?), &DefaultClock);
    let mut row = row_from(&profile)?;
    row.role = "admin".to_owned();

    let result = row_to_profile(row);

    ensure!(matches!(result, Err(ProfileRepositoryError::Persistence(_))));
    Ok(())
}
