//! `PostgreSQL` repository implementation for profile storage.

use super::{
    models::{NewProfileRow, ProfileChangeset, ProfileRow},
    schema::profiles,
};
use crate::identity::{
    domain::{PersistedProfileData, Profile, UserId, UserRole, VerificationStatus},
    ports::{ProfileRepository, ProfileRepositoryError, ProfileRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by profile adapters.
pub type ProfilePgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed profile repository.
#[derive(Debug, Clone)]
pub struct PostgresProfileRepository {
    pool: ProfilePgPool,
}

impl PostgresProfileRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: ProfilePgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> ProfileRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> ProfileRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(ProfileRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(ProfileRepositoryError::persistence)?
    }
}

#[async_trait]
impl ProfileRepository for PostgresProfileRepository {
    async fn create(&self, profile: &Profile) -> ProfileRepositoryResult<()> {
        let user_id = profile.id().clone();
        let new_row = to_new_row(profile)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(profiles::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        ProfileRepositoryError::DuplicateProfile(user_id.clone())
                    }
                    _ => ProfileRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find(&self, id: &UserId) -> ProfileRepositoryResult<Option<Profile>> {
        let lookup = id.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = profiles::table
                .filter(profiles::id.eq(lookup))
                .select(ProfileRow::as_select())
                .first::<ProfileRow>(connection)
                .optional()
                .map_err(ProfileRepositoryError::persistence)?;
            row.map(row_to_profile).transpose()
        })
        .await
    }

    async fn update(&self, profile: &Profile) -> ProfileRepositoryResult<Profile> {
        let next = profile.clone().into_next_revision();
        let changeset = to_changeset(&next)?;
        let user_id = profile.id().clone();
        let expected = to_db_revision(profile.revision())?;

        self.run_blocking(move |connection| {
            let affected = diesel::update(
                profiles::table
                    .filter(profiles::id.eq(user_id.as_str()))
                    .filter(profiles::revision.eq(expected)),
            )
            .set(&changeset)
            .execute(connection)
            .map_err(ProfileRepositoryError::persistence)?;

            if affected == 0 {
                return Err(classify_missed_update(connection, user_id, expected));
            }
            Ok(next)
        })
        .await
    }
}

fn classify_missed_update(
    connection: &mut PgConnection,
    user_id: UserId,
    expected: i64,
) -> ProfileRepositoryError {
    let exists = diesel::select(diesel::dsl::exists(
        profiles::table.filter(profiles::id.eq(user_id.as_str())),
    ))
    .get_result::<bool>(connection);
    match exists {
        Ok(true) => ProfileRepositoryError::Conflict {
            id: user_id,
            expected: u64::try_from(expected).unwrap_or_default(),
        },
        Ok(false) => ProfileRepositoryError::NotFound(user_id),
        Err(err) => ProfileRepositoryError::persistence(err),
    }
}

fn to_db_revision(revision: u64) -> ProfileRepositoryResult<i64> {
    i64::try_from(revision).map_err(ProfileRepositoryError::persistence)
}

pub(super) fn to_new_row(profile: &Profile) -> ProfileRepositoryResult<NewProfileRow> {
    Ok(NewProfileRow {
        id: profile.id().as_str().to_owned(),
        display_name: profile.display_name().to_owned(),
        email: profile.email().to_owned(),
        role: profile.role().as_str().to_owned(),
        verification: profile.verification().as_str().to_owned(),
        native_wallet: profile
            .native_wallet()
            .map(serde_json::to_value)
            .transpose()
            .map_err(ProfileRepositoryError::persistence)?,
        external_wallets: serde_json::to_value(profile.external_wallets())
            .map_err(ProfileRepositoryError::persistence)?,
        reviews: serde_json::to_value(profile.reviews())
            .map_err(ProfileRepositoryError::persistence)?,
        revision: to_db_revision(profile.revision())?,
        created_at: profile.created_at(),
        updated_at: profile.updated_at(),
    })
}

fn to_changeset(profile: &Profile) -> ProfileRepositoryResult<ProfileChangeset> {
    let row = to_new_row(profile)?;
    Ok(ProfileChangeset {
        display_name: row.display_name,
        email: row.email,
        role: row.role,
        verification: row.verification,
        native_wallet: row.native_wallet,
        external_wallets: row.external_wallets,
        reviews: row.reviews,
        revision: row.revision,
        updated_at: row.updated_at,
    })
}

pub(super) fn row_to_profile(row: ProfileRow) -> ProfileRepositoryResult<Profile> {
    let ProfileRow {
        id,
        display_name,
        email,
        role,
        verification,
        native_wallet,
        external_wallets,
        reviews,
        revision,
        created_at,
        updated_at,
    } = row;

    let data = PersistedProfileData {
        id: UserId::new(id).map_err(ProfileRepositoryError::persistence)?,
        display_name,
        email,
        role: UserRole::try_from(role.as_str()).map_err(ProfileRepositoryError::persistence)?,
        verification: VerificationStatus::try_from(verification.as_str())
            .map_err(ProfileRepositoryError::persistence)?,
        native_wallet: native_wallet
            .map(serde_json::from_value)
            .transpose()
            .map_err(ProfileRepositoryError::persistence)?,
        external_wallets: serde_json::from_value(external_wallets)
            .map_err(ProfileRepositoryError::persistence)?,
        reviews: serde_json::from_value(reviews).map_err(ProfileRepositoryError::persistence)?,
        revision: u64::try_from(revision).map_err(ProfileRepositoryError::persistence)?,
        created_at,
        updated_at,
    };
    Ok(Profile::from_persisted(data))
}
