// ABOUTME: Embedded SQLite tenant registry with compile-time migrations
// ABOUTME: Owns tenants, their resource connections and the append-only provisioning log
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FreeFlow Contributors

/// Per-tenant resource connection rows
pub mod connections;
/// Database error types
pub mod errors;
/// Append-only provisioning log
pub mod provision_logs;
/// Focused repository traits consumed by the sagas
pub mod repositories;
/// Tenant records
pub mod tenants;

pub use errors::{DatabaseError, DatabaseResult};
pub use repositories::{TenantRepository, TenantRepositoryImpl};

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use tracing::info;

use crate::database_plugins::DatabaseProvider;
use crate::errors::{AppError, AppResult};
use crate::models::{
    ConnectionDetails, NewProvisionLog, NewTenant, ProvisionLogEntry, ResourceKind,
    TenantConnection, TenantId, TenantRecord, TenantStatus,
};

const MAX_CONNECTIONS: u32 = 5;

/// `SQLite` registry connection pool
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Create a new database connection (internal implementation)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Database URL is invalid or malformed
    /// - Database connection fails
    /// - Migration process fails
    async fn new_impl(database_url: &str) -> AppResult<Self> {
        // Create the database file if it doesn't exist
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::config(format!("Invalid SQLite URL: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true);

        // Every connection to an in-memory database sees a different database
        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(MAX_CONNECTIONS)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to connect to database: {e}")))?;

        let db = Self { pool };

        db.migrate_impl()
            .await
            .map_err(|e| AppError::database(format!("Database migration failed: {e}")))?;

        Ok(db)
    }

    /// Create a new database connection (public API)
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is malformed, the connection fails or migrations fail
    pub async fn new(database_url: &str) -> AppResult<Self> {
        Self::new_impl(database_url).await
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Run all database migrations (public API)
    ///
    /// # Errors
    ///
    /// Returns an error if any migration fails
    pub async fn migrate(&self) -> AppResult<()> {
        self.migrate_impl().await
    }

    async fn migrate_impl(&self) -> AppResult<()> {
        info!("Running registry migrations...");

        // Migrations are embedded at compile time
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Migration failed: {e}")))?;

        info!("Registry migrations completed successfully");
        Ok(())
    }
}

#[async_trait]
impl DatabaseProvider for Database {
    async fn new(database_url: &str) -> AppResult<Self> {
        Self::new_impl(database_url).await
    }

    async fn migrate(&self) -> AppResult<()> {
        self.migrate_impl().await
    }

    async fn create_tenant(&self, tenant: &NewTenant) -> AppResult<TenantRecord> {
        Ok(self.create_tenant_impl(tenant).await?)
    }

    async fn get_tenant_by_id(&self, id: TenantId) -> AppResult<Option<TenantRecord>> {
        Ok(self.get_tenant_by_id_impl(id).await?)
    }

    async fn get_tenant_by_name(&self, name: &str) -> AppResult<Option<TenantRecord>> {
        Ok(self.get_tenant_by_name_impl(name).await?)
    }

    async fn list_tenants_by_name_prefix(&self, prefix: &str) -> AppResult<Vec<TenantRecord>> {
        Ok(self.list_tenants_by_name_prefix_impl(prefix).await?)
    }

    async fn update_tenant_status(
        &self,
        id: TenantId,
        status: TenantStatus,
    ) -> AppResult<TenantRecord> {
        Ok(self.update_tenant_status_impl(id, status).await?)
    }

    async fn delete_tenant(&self, id: TenantId) -> AppResult<Option<TenantRecord>> {
        Ok(self.delete_tenant_impl(id).await?)
    }

    async fn upsert_tenant_connection(
        &self,
        tenant_id: TenantId,
        service: ResourceKind,
        details: &ConnectionDetails,
    ) -> AppResult<TenantConnection> {
        Ok(self
            .upsert_tenant_connection_impl(tenant_id, service, details)
            .await?)
    }

    async fn list_tenant_connections(&self, tenant_id: TenantId) -> AppResult<Vec<TenantConnection>> {
        Ok(self.list_tenant_connections_impl(tenant_id).await?)
    }

    async fn append_provision_log(&self, entry: &NewProvisionLog) -> AppResult<ProvisionLogEntry> {
        Ok(self.append_provision_log_impl(entry).await?)
    }

    async fn list_provision_logs(&self, tenant_id: TenantId) -> AppResult<Vec<ProvisionLogEntry>> {
        Ok(self.list_provision_logs_impl(tenant_id).await?)
    }
}
