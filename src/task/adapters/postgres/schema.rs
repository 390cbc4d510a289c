//! Diesel schema for task and chat log persistence.

diesel::table! {
    /// Marketplace tasks.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Task title.
        #[max_length = 255]
        title -> Varchar,
        /// Free-text description.
        description -> Text,
        /// Free-text category.
        #[max_length = 100]
        category -> Text,
        /// Promised payment in lamports.
        deposit_lamports -> Int8,
        /// Lifecycle status.
        #[max_length = 20]
        status -> Varchar,
        /// Posting user.
        #[max_length = 128]
        creator_id -> Varchar,
        /// Accepting provider.
        #[max_length = 128]
        assignee_id -> Nullable<Varchar>,
        /// Escrow record document.
        escrow -> Nullable<Jsonb>,
        /// Optimistic concurrency revision.
        revision -> Int8,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Task chat messages.
    task_messages (id) {
        /// Message identifier.
        id -> Uuid,
        /// Owning task.
        task_id -> Uuid,
        /// Sending user.
        #[max_length = 128]
        sender_id -> Varchar,
        /// Message text.
        body -> Text,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Insertion order, breaking timestamp ties.
        seq -> Int8,
    }
}

diesel::joinable!(task_messages -> tasks (task_id));
diesel::allow_tables_to_appear_in_same_query!(tasks, task_messages);
