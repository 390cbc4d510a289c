//! Unit tests for identity domain types.

use crate::identity::domain::{
    IdentityDomainError, MAX_USER_ID_CHARS, Profile, Reputation, ReputationTier, Review,
    SignInEvent, UserId, UserRole, VerificationStatus,
};
use crate::wallet::domain::{Lamports, RecoveryPhrase, Wallet, WalletAddress};
use mockable::DefaultClock;
use rstest::rstest;

fn uid(value: &str) -> UserId {
    UserId::new(value).expect("valid user id")
}

fn reviews(positive: usize, negative: usize) -> Vec<Review> {
    let author = uid("reviewer");
    std::iter::repeat_n(true, positive)
        .chain(std::iter::repeat_n(false, negative))
        .map(|positive| Review::new(author.clone(), positive, &DefaultClock))
        .collect()
}

#[rstest]
#[case("")]
#[case("   ")]
fn blank_user_id_is_rejected(#[case] raw: &str) {
    assert_eq!(UserId::new(raw), Err(IdentityDomainError::EmptyUserId));
}

#[rstest]
fn user_id_length_matches_storage_limit() {
    let longest = "u".repeat(MAX_USER_ID_CHARS);

    assert!(UserId::new(longest.as_str()).is_ok());
    assert_eq!(
        UserId::new(format!("{longest}u")),
        Err(IdentityDomainError::UserIdTooLong {
            max: MAX_USER_ID_CHARS
        })
    );
}

#[rstest]
#[case(Some("Amara O."), Some("amara@example.com"), "Amara O.")]
#[case(None, Some("amara@example.com"), "amara")]
#[case(Some("  "), Some("kofi@example.com"), "kofi")]
#[case(None, None, "")]
fn display_name_falls_back_to_email_local_part(
    #[case] name: Option<&str>,
    #[case] email: Option<&str>,
    #[case] expected: &str,
) {
    let mut event = SignInEvent::new(uid("u1"));
    if let Some(name) = name {
        event = event.with_display_name(name);
    }
    if let Some(email) = email {
        event = event.with_email(email);
    }
    assert_eq!(event.resolved_display_name(), expected);
}

#[rstest]
fn new_profile_uses_defaults() {
    let profile = Profile::new_for_sign_in(
        &SignInEvent::new(uid("u1")).with_email("amara@example.com"),
        &DefaultClock,
    );

    assert_eq!(profile.role(), UserRole::Local);
    assert_eq!(profile.verification(), VerificationStatus::Pending);
    assert_eq!(profile.email(), "amara@example.com");
    assert!(profile.native_wallet().is_none());
    assert_eq!(profile.reputation().tier(), ReputationTier::Unrated);
    assert_eq!(profile.revision(), 0);
}

#[rstest]
#[case("Diaspora", UserRole::Diaspora)]
#[case(" local ", UserRole::Local)]
fn role_parses_case_insensitively(#[case] raw: &str, #[case] expected: UserRole) {
    assert_eq!(UserRole::try_from(raw), Ok(expected));
}

#[rstest]
fn unknown_verification_status_is_rejected() {
    assert!(VerificationStatus::try_from("approved").is_err());
}

#[rstest]
#[case(0, 0, 0, ReputationTier::Unrated)]
#[case(7, 3, 7_000, ReputationTier::Trusted)]
#[case(3, 7, 3_000, ReputationTier::Poor)]
#[case(1, 1, 5_000, ReputationTier::Neutral)]
#[case(2, 1, 6_666, ReputationTier::Neutral)]
#[case(4, 0, 10_000, ReputationTier::Trusted)]
fn reputation_is_share_of_positive_reviews(
    #[case] positive: usize,
    #[case] negative: usize,
    #[case] score_bps: u16,
    #[case] tier: ReputationTier,
) {
    let reputation = Reputation::from_reviews(&reviews(positive, negative));
    assert_eq!(reputation.score_bps(), score_bps);
    assert_eq!(reputation.tier(), tier);
}

#[rstest]
fn second_native_wallet_is_rejected() {
    let clock = DefaultClock;
    let mut profile = Profile::new_for_sign_in(&SignInEvent::new(uid("u1")), &clock);
    let wallet = || {
        Wallet::native(
            WalletAddress::new("11111111111111111111111111111111").expect("address"),
            RecoveryPhrase::new("phrase").expect("phrase"),
        )
    };

    profile
        .attach_native_wallet(wallet(), &clock)
        .expect("first attach");
    let result = profile.attach_native_wallet(wallet(), &clock);

    assert!(matches!(
        result,
        Err(IdentityDomainError::NativeWalletAlreadyAttached(_))
    ));
    assert!(
        profile
            .native_wallet()
            .is_some_and(|w| w.recovery_phrase().is_none())
    );
}

#[rstest]
fn external_wallet_cannot_be_attached_as_native() {
    let clock = DefaultClock;
    let mut profile = Profile::new_for_sign_in(&SignInEvent::new(uid("u1")), &clock);
    let external = Wallet::external(WalletAddress::new("abc").expect("address"));

    assert!(matches!(
        profile.attach_native_wallet(external, &clock),
        Err(IdentityDomainError::WalletKindMismatch(_))
    ));
}

#[rstest]
fn apply_balances_updates_matching_wallets_only() {
    let clock = DefaultClock;
    let mut profile = Profile::new_for_sign_in(&SignInEvent::new(uid("u1")), &clock);
    let known = WalletAddress::new("known").expect("address");
    let other = WalletAddress::new("other").expect("address");
    profile
        .add_external_wallet(Wallet::external(known.clone()), &clock)
        .expect("add");
    profile
        .add_external_wallet(
            Wallet::external(other).with_balance(Lamports::new(3)),
            &clock,
        )
        .expect("add");

    profile.apply_balances(&[(known, Lamports::new(11))], &clock);

    let balances: Vec<_> = profile
        .external_wallets()
        .iter()
        .map(Wallet::balance)
        .collect();
    assert_eq!(balances, vec![Some(Lamports::new(11)), Some(Lamports::new(3))]);
}

#[rstest]
fn self_review_is_rejected() {
    let clock = DefaultClock;
    let mut profile = Profile::new_for_sign_in(&SignInEvent::new(uid("u1")), &clock);

    let result = profile.record_review(Review::new(uid("u1"), true, &clock), &clock);

    assert!(matches!(result, Err(IdentityDomainError::SelfReview(_))));
    assert!(profile.reviews().is_empty());
}
