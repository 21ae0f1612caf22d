//! Diesel schema for integration persistence.

diesel::table! {
    /// Administration integration records.
    integrations (id) {
        /// Store identifier.
        id -> Int8,
        /// Global uid.
        #[max_length = 128]
        uid -> Varchar,
        /// Integration type name.
        #[max_length = 64]
        name -> Varchar,
        /// Section name.
        #[max_length = 64]
        section -> Varchar,
        /// Settings object.
        settings -> Jsonb,
        /// Config object.
        config -> Jsonb,
        /// Status string.
        #[max_length = 256]
        status -> Varchar,
        /// Background task reference.
        #[max_length = 256]
        task_id -> Nullable<Varchar>,
        /// Administration default flag.
        is_default -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Tenant-owned integration records.
    project_integrations (id) {
        /// Store identifier.
        id -> Int8,
        /// Owning tenant.
        project_id -> Int8,
        /// Global uid.
        #[max_length = 128]
        uid -> Varchar,
        /// Integration type name.
        #[max_length = 64]
        name -> Varchar,
        /// Section name.
        #[max_length = 64]
        section -> Varchar,
        /// Settings object.
        settings -> Jsonb,
        /// Config object.
        config -> Jsonb,
        /// Status string.
        #[max_length = 256]
        status -> Varchar,
        /// Background task reference.
        #[max_length = 256]
        task_id -> Nullable<Varchar>,
        /// Unused for tenant records; tenant defaults live in pointers.
        is_default -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Per-tenant default pointers.
    integration_defaults (id) {
        /// Pointer identifier.
        id -> Int8,
        /// Tenant holding the pointer.
        project_id -> Int8,
        /// Integration type name.
        #[max_length = 64]
        name -> Varchar,
        /// Target record id.
        integration_id -> Int8,
        /// Owning tenant of the target, `NULL` for administration targets.
        target_project_id -> Nullable<Int8>,
        /// Section name.
        #[max_length = 64]
        section -> Varchar,
        /// Active flag covered by the partial unique index.
        is_default -> Bool,
    }
}

diesel::table! {
    /// Every uid ever issued, kept after deletion.
    integration_uids (uid) {
        /// Issued uid.
        #[max_length = 128]
        uid -> Varchar,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    integrations,
    project_integrations,
    integration_defaults,
    integration_uids,
);
