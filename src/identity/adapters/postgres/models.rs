//! Diesel row models for profile persistence.

use super::schema::profiles;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for profile records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProfileRow {
    /// Identity-provider user id.
    pub id: String,
    /// Display name.
    pub display_name: String,
    /// Email address.
    pub email: String,
    /// Marketplace role.
    pub role: String,
    /// Verification status.
    pub verification: String,
    /// Native wallet JSON payload.
    pub native_wallet: Option<Value>,
    /// External wallets JSON array.
    pub external_wallets: Value,
    /// Reviews JSON array.
    pub reviews: Value,
    /// Optimistic concurrency revision.
    pub revision: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for profile records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = profiles)]
pub struct NewProfileRow {
    /// Identity-provider user id.
    pub id: String,
    /// Display name.
    pub display_name: String,
    /// Email address.
    pub email: String,
    /// Marketplace role.
    pub role: String,
    /// Verification status.
    pub verification: String,
    /// Native wallet JSON payload.
    pub native_wallet: Option<Value>,
    /// External wallets JSON array.
    pub external_wallets: Value,
    /// Reviews JSON array.
    pub reviews: Value,
    /// Optimistic concurrency revision.
    pub revision: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Changeset applied on revision-checked updates.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = profiles)]
#[diesel(treat_none_as_null = true)]
pub struct ProfileChangeset {
    /// Display name.
    pub display_name: String,
    /// Email address.
    pub email: String,
    /// Marketplace role.
    pub role: String,
    /// Verification status.
    pub verification: String,
    /// Native wallet JSON payload.
    pub native_wallet: Option<Value>,
    /// External wallets JSON array.
    pub external_wallets: Value,
    /// Reviews JSON array.
    pub reviews: Value,
    /// Advanced revision.
    pub revision: i64,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
