// ABOUTME: Resource driver contracts for the backing systems a tenant owns resources in
// ABOUTME: Idempotent ensure/drop per resource kind plus identifier sanitizing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FreeFlow Contributors

//! # Resource drivers
//!
//! One driver per backing system. Every operation is idempotent: `ensure`
//! returns without change when the resource exists, `drop_resource` treats
//! absence as success. Drivers own no persistent state; the registry records
//! what they created.

use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::{AppError, AppResult};

/// Identity realms over the Keycloak admin REST API
pub mod keycloak;
/// Tenant schema migrations
pub mod migrations;
/// Document databases
pub mod mongo;
/// Relational databases
pub mod postgres;
/// Vector collections over the Qdrant REST API
pub mod qdrant;
/// Tenant file storage directories
pub mod storage;

pub use keycloak::{KeycloakDriver, KeycloakDriverConfig};
pub use mongo::MongoDriver;
pub use postgres::PostgresDriver;
pub use qdrant::QdrantDriver;
pub use storage::StorageDriver;

/// Idempotent create/drop of one kind of tenant resource
#[async_trait]
pub trait ResourceDriver: Send + Sync {
    /// Human-readable backing system name used in logs and errors
    fn kind(&self) -> &'static str;

    /// Create the resource if it does not exist
    async fn ensure(&self, name: &str) -> AppResult<()>;

    /// Remove the resource; absence is not an error
    async fn drop_resource(&self, name: &str) -> AppResult<()>;
}

/// Identity realms can additionally be disabled without deleting them
#[async_trait]
pub trait IdentityDriver: ResourceDriver {
    /// Create the realm if absent, shown to users as `display_name`
    async fn ensure_realm(&self, name: &str, display_name: &str) -> AppResult<()>;

    /// Revoke access to the realm while keeping its data
    async fn disable(&self, name: &str) -> AppResult<()>;
}

/// Relational databases additionally receive the tenant schema
#[async_trait]
pub trait RelationalDriver: ResourceDriver {
    /// Apply pending schema migrations and baseline seed data
    ///
    /// Safe on an empty or an already-migrated database.
    async fn run_migrations(&self, tenant_database_url: &str) -> AppResult<()>;
}

/// The driver set a saga works against
#[derive(Clone)]
pub struct ResourceDrivers {
    /// Identity realm
    pub identity: Arc<dyn IdentityDriver>,
    /// Relational database
    pub relational: Arc<dyn RelationalDriver>,
    /// Document database
    pub document: Arc<dyn ResourceDriver>,
    /// Vector collection
    pub vector: Arc<dyn ResourceDriver>,
    /// File storage directory
    pub storage: Arc<dyn ResourceDriver>,
}

/// Strip characters that could escape a quoted identifier in an admin statement
///
/// Removes quotes, backslashes, semicolons and control characters.
///
/// # Errors
///
/// Returns `InvalidInput` when nothing is left after sanitizing
pub fn sanitize_identifier(value: &str) -> AppResult<String> {
    let safe: String = value
        .chars()
        .filter(|c| !matches!(c, '"' | '\'' | '`' | '\\' | ';') && !c.is_control())
        .collect();

    if safe.trim().is_empty() {
        return Err(AppError::invalid_input(format!(
            "Identifier '{}' is empty after sanitizing",
            value.escape_default()
        )));
    }
    Ok(safe)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_ordinary_names() {
        assert_eq!(sanitize_identifier("freeflow_acme").unwrap(), "freeflow_acme");
    }

    #[test]
    fn strips_injection_characters() {
        assert_eq!(
            sanitize_identifier("acme\"; DROP DATABASE x; --").unwrap(),
            "acme DROP DATABASE x --"
        );
        assert_eq!(sanitize_identifier("a'b`c\\d\n").unwrap(), "abcd");
    }

    #[test]
    fn rejects_names_that_vanish() {
        assert!(sanitize_identifier("\"\"").is_err());
        assert!(sanitize_identifier("").is_err());
    }
}
