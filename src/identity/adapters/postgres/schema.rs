//! Diesel schema for profile persistence.

diesel::table! {
    /// User profiles keyed by identity-provider id.
    profiles (id) {
        /// Identity-provider user id.
        #[max_length = 128]
        id -> Varchar,
        /// Display name.
        #[max_length = 255]
        display_name -> Text,
        /// Email address.
        #[max_length = 255]
        email -> Text,
        /// Marketplace role.
        #[max_length = 20]
        role -> Varchar,
        /// Verification status.
        #[max_length = 20]
        verification -> Varchar,
        /// Native wallet document, without recovery material.
        native_wallet -> Nullable<Jsonb>,
        /// External wallet documents.
        external_wallets -> Jsonb,
        /// Received reviews.
        reviews -> Jsonb,
        /// Optimistic concurrency revision.
        revision -> Int8,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
