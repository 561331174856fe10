// ABOUTME: Application constants for tenant naming, protected tenants and saga step names
// ABOUTME: Centralizes the labels written to the provisioning audit log
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FreeFlow Contributors

/// Tenant name rules
pub mod tenant_names {
    /// Accepted tenant names: 3-30 lowercase letters or digits
    pub const PATTERN: &str = r"^[a-z0-9]{3,30}$";

    /// Reserved system tenants that can never be removed
    pub const PROTECTED: &[&str] = &["freeflow", "system"];

    /// Display name prefix written into the identity realm
    pub const DISPLAY_PREFIX: &str = "FreeFlow";
}

/// Step labels recorded by the provisioning saga
pub mod provisioning_steps {
    /// Run start marker
    pub const INITIALIZE: &str = "initialize";
    /// Identity realm
    pub const KEYCLOAK: &str = "keycloak";
    /// Relational database
    pub const POSTGRES: &str = "postgres";
    /// Document database
    pub const MONGO: &str = "mongo";
    /// Vector collection
    pub const QDRANT: &str = "qdrant";
    /// Relational schema migrations
    pub const MIGRATIONS: &str = "migrations";
    /// File storage directory
    pub const STORAGE: &str = "storage";
    /// Run end marker (success or failure)
    pub const FINALIZE: &str = "finalize";
    /// Suffix appended to a step name for its compensating action
    pub const ROLLBACK_SUFFIX: &str = ":rollback";
}

/// Step labels recorded by the removal saga
pub mod removal_steps {
    /// Soft removal
    pub const SOFT: &str = "remove:soft";
    /// Disable the identity realm
    pub const KEYCLOAK_DISABLE: &str = "keycloak:disable";
    /// Delete the identity realm
    pub const KEYCLOAK_DELETE: &str = "keycloak:delete";
    /// Drop the relational database
    pub const POSTGRES_DROP: &str = "postgres:drop";
    /// Drop the document database
    pub const MONGO_DROP: &str = "mongo:drop";
    /// Drop the vector collection
    pub const QDRANT_DROP: &str = "qdrant:drop";
    /// Remove the storage directory
    pub const STORAGE_REMOVE: &str = "storage:remove";
    /// Hard removal completed
    pub const FINALIZE: &str = "remove:finalize";
    /// Hard removal aborted
    pub const FAILED: &str = "remove:failed";
}

/// Configuration defaults
pub mod defaults {
    /// Vector dimensionality
    pub const QDRANT_VECTOR_SIZE: u32 = 1536;
    /// Keycloak admin client
    pub const KEYCLOAK_ADMIN_CLIENT_ID: &str = "admin-cli";
    /// Realm the admin token is requested from
    pub const KEYCLOAK_ADMIN_REALM: &str = "master";
    /// Realm template location relative to the working directory
    pub const KEYCLOAK_REALM_TEMPLATE_PATH: &str =
        "infra/compose/keycloak/realms/freeflow-realm.json";
    /// Tenant storage root relative to the working directory
    pub const TENANT_STORAGE_ROOT: &str = "storage/tenants";
    /// Tenant schema migrations relative to the working directory
    pub const TENANT_MIGRATIONS_DIR: &str = "tenant_migrations";
    /// Attempts per provisioning step
    pub const RETRY_ATTEMPTS: u32 = 3;
    /// Delay between attempts
    pub const RETRY_DELAY_MS: u64 = 1500;
    /// Timeout applied by network drivers to each call
    pub const DRIVER_TIMEOUT_SECS: u64 = 30;
    /// Seconds shaved off an admin token's lifetime before it is refreshed
    pub const TOKEN_EXPIRY_SKEW_SECS: u64 = 30;
    /// Collection created to materialize a new document database
    pub const MONGO_HEALTHCHECK_COLLECTION: &str = "healthcheck";
}
