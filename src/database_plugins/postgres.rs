// ABOUTME: PostgreSQL tenant registry for production deployments
// ABOUTME: Connection pooling with retry, idempotent schema creation and registry queries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FreeFlow Contributors
//! `PostgreSQL` registry implementation
//!
//! This module provides `PostgreSQL` support for production deployments,
//! implementing the same interface as the `SQLite` version.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{Pool, Postgres, Row};
use tokio::time::sleep;
use tracing::{info, warn};
use uuid::Uuid;

use super::shared::{
    parse_log_status, parse_resource_kind, parse_tenant_status, prefix_pattern,
    CONNECTION_COLUMNS, LOG_COLUMNS, TENANT_COLUMNS,
};
use super::DatabaseProvider;
use crate::database::{DatabaseError, DatabaseResult};
use crate::errors::{AppError, AppResult};
use crate::models::{
    ConnectionDetails, NewProvisionLog, NewTenant, ProvisionLogEntry, ResourceKind,
    TenantConnection, TenantId, TenantRecord, TenantResourceNames, TenantStatus,
};

const MAX_CONNECTIONS: u32 = 10;
const MIN_CONNECTIONS: u32 = 1;
const ACQUIRE_TIMEOUT_SECS: u64 = 30;
const CONNECTION_RETRIES: u32 = 5;
const INITIAL_RETRY_DELAY_MS: u64 = 500;
const MAX_RETRY_DELAY_MS: u64 = 8_000;

/// `PostgreSQL` registry
#[derive(Clone)]
pub struct PostgresDatabase {
    pool: Pool<Postgres>,
}

impl PostgresDatabase {
    /// Close the database connection pool
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Connect, retrying transient failures, then create the schema
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema creation fails
    pub async fn new(database_url: &str) -> AppResult<Self> {
        info!(
            "PostgreSQL pool config: max_connections={MAX_CONNECTIONS}, min_connections={MIN_CONNECTIONS}, timeout={ACQUIRE_TIMEOUT_SECS}s, retries={CONNECTION_RETRIES}"
        );

        let pool = Self::connect_with_retry(database_url).await?;
        let db = Self { pool };
        db.migrate_impl().await?;
        Ok(db)
    }

    /// Connect to `PostgreSQL` with exponential backoff retry on failure
    async fn connect_with_retry(database_url: &str) -> AppResult<Pool<Postgres>> {
        let pool_options = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .min_connections(MIN_CONNECTIONS)
            .acquire_timeout(Duration::from_secs(ACQUIRE_TIMEOUT_SECS))
            .idle_timeout(Some(Duration::from_secs(300)))
            .max_lifetime(Some(Duration::from_secs(600)))
            .test_before_acquire(true);

        let mut last_error = None;
        let mut delay_ms = INITIAL_RETRY_DELAY_MS;

        for attempt in 0..=CONNECTION_RETRIES {
            match pool_options.clone().connect(database_url).await {
                Ok(pool) => {
                    if attempt > 0 {
                        info!("PostgreSQL connection established after {} retries", attempt);
                    }
                    return Ok(pool);
                }
                Err(e) => {
                    if attempt < CONNECTION_RETRIES {
                        warn!(
                            "PostgreSQL connection attempt {}/{} failed, retrying in {}ms: {}",
                            attempt + 1,
                            CONNECTION_RETRIES + 1,
                            delay_ms,
                            e.as_database_error()
                                .map_or("connection error", |de| de.message())
                        );
                        sleep(Duration::from_millis(delay_ms)).await;
                        delay_ms = (delay_ms * 2).min(MAX_RETRY_DELAY_MS);
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(AppError::database(format!(
            "Failed to connect to PostgreSQL after {} attempts: {}",
            CONNECTION_RETRIES + 1,
            last_error.map_or_else(|| "unknown error".to_owned(), |e| e.to_string())
        )))
    }

    async fn migrate_impl(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS tenants (
                id UUID PRIMARY KEY,
                name VARCHAR(30) NOT NULL UNIQUE,
                realm_name VARCHAR(255) NOT NULL,
                postgres_db VARCHAR(255) NOT NULL,
                mongo_db VARCHAR(255) NOT NULL,
                qdrant_collection VARCHAR(255) NOT NULL,
                status VARCHAR(20) NOT NULL DEFAULT 'provisioning'
                    CHECK (status IN ('provisioning', 'active', 'suspended', 'deleting', 'deleted')),
                created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create tenants table: {e}")))?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS tenant_connections (
                id UUID PRIMARY KEY,
                tenant_id UUID NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
                service VARCHAR(20) NOT NULL CHECK (service IN ('keycloak', 'postgres', 'mongodb', 'qdrant')),
                db_name VARCHAR(255) NOT NULL,
                host VARCHAR(255),
                port INTEGER,
                username VARCHAR(255),
                secret_ref VARCHAR(500),
                options JSONB,
                created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
                UNIQUE (tenant_id, service)
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::database(format!("Failed to create tenant_connections table: {e}"))
        })?;

        // No foreign key: the audit trail outlives hard-deleted tenants
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS tenant_provision_logs (
                seq BIGSERIAL PRIMARY KEY,
                id UUID NOT NULL UNIQUE,
                tenant_id UUID NOT NULL,
                step VARCHAR(100) NOT NULL,
                status VARCHAR(20) NOT NULL CHECK (status IN ('started', 'succeeded', 'failed')),
                message TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::database(format!("Failed to create tenant_provision_logs table: {e}"))
        })?;

        for statement in [
            "CREATE INDEX IF NOT EXISTS idx_tenants_status ON tenants(status)",
            "CREATE INDEX IF NOT EXISTS idx_tenant_provision_logs_tenant ON tenant_provision_logs(tenant_id, seq)",
        ] {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to create index: {e}")))?;
        }

        Ok(())
    }

    fn row_to_tenant(row: &PgRow) -> DatabaseResult<TenantRecord> {
        let id: Uuid = row.try_get("id")?;
        let status: String = row.try_get("status")?;

        Ok(TenantRecord {
            id: TenantId::from_uuid(id),
            name: row.try_get("name")?,
            names: TenantResourceNames {
                realm_name: row.try_get("realm_name")?,
                postgres_db: row.try_get("postgres_db")?,
                mongo_db: row.try_get("mongo_db")?,
                qdrant_collection: row.try_get("qdrant_collection")?,
            },
            status: parse_tenant_status(&status)?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn row_to_connection(row: &PgRow) -> DatabaseResult<TenantConnection> {
        let tenant_id: Uuid = row.try_get("tenant_id")?;
        let service: String = row.try_get("service")?;
        let port: Option<i32> = row.try_get("port")?;

        Ok(TenantConnection {
            id: row.try_get("id")?,
            tenant_id: TenantId::from_uuid(tenant_id),
            service: parse_resource_kind(&service)?,
            details: ConnectionDetails {
                db_name: row.try_get("db_name")?,
                host: row.try_get("host")?,
                port: super::shared::port_from_db(port.map(i64::from))?,
                username: row.try_get("username")?,
                secret_ref: row.try_get("secret_ref")?,
                options: row.try_get::<Option<Value>, _>("options")?,
            },
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn row_to_log_entry(row: &PgRow) -> DatabaseResult<ProvisionLogEntry> {
        let tenant_id: Uuid = row.try_get("tenant_id")?;
        let status: String = row.try_get("status")?;

        Ok(ProvisionLogEntry {
            id: row.try_get("id")?,
            tenant_id: TenantId::from_uuid(tenant_id),
            step: row.try_get("step")?,
            status: parse_log_status(&status)?,
            message: row.try_get("message")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn tenant_not_found(id: TenantId) -> DatabaseError {
        DatabaseError::NotFound {
            entity: "Tenant",
            id: id.to_string(),
        }
    }
}

#[async_trait]
impl DatabaseProvider for PostgresDatabase {
    async fn new(database_url: &str) -> AppResult<Self> {
        Self::new(database_url).await
    }

    async fn migrate(&self) -> AppResult<()> {
        self.migrate_impl().await
    }

    async fn create_tenant(&self, tenant: &NewTenant) -> AppResult<TenantRecord> {
        let query = format!(
            r"
            INSERT INTO tenants (id, name, realm_name, postgres_db, mongo_db, qdrant_collection, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            ON CONFLICT (name) DO UPDATE SET
                realm_name = EXCLUDED.realm_name,
                postgres_db = EXCLUDED.postgres_db,
                mongo_db = EXCLUDED.mongo_db,
                qdrant_collection = EXCLUDED.qdrant_collection,
                updated_at = EXCLUDED.updated_at
            RETURNING {TENANT_COLUMNS}
            "
        );

        let row = sqlx::query(&query)
            .bind(Uuid::new_v4())
            .bind(&tenant.name)
            .bind(&tenant.names.realm_name)
            .bind(&tenant.names.postgres_db)
            .bind(&tenant.names.mongo_db)
            .bind(&tenant.names.qdrant_collection)
            .bind(TenantStatus::Provisioning.as_str())
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to upsert tenant {}: {e}", tenant.name)))?;

        Ok(Self::row_to_tenant(&row)?)
    }

    async fn get_tenant_by_id(&self, id: TenantId) -> AppResult<Option<TenantRecord>> {
        let query = format!("SELECT {TENANT_COLUMNS} FROM tenants WHERE id = $1");
        let row = sqlx::query(&query)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(Self::row_to_tenant).transpose()?)
    }

    async fn get_tenant_by_name(&self, name: &str) -> AppResult<Option<TenantRecord>> {
        let query = format!("SELECT {TENANT_COLUMNS} FROM tenants WHERE name = $1");
        let row = sqlx::query(&query)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(Self::row_to_tenant).transpose()?)
    }

    async fn list_tenants_by_name_prefix(&self, prefix: &str) -> AppResult<Vec<TenantRecord>> {
        let query = format!(
            r"SELECT {TENANT_COLUMNS} FROM tenants WHERE name LIKE $1 ESCAPE '\' ORDER BY name"
        );
        let rows = sqlx::query(&query)
            .bind(prefix_pattern(prefix))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(Self::row_to_tenant)
            .collect::<DatabaseResult<Vec<_>>>()?)
    }

    async fn update_tenant_status(
        &self,
        id: TenantId,
        status: TenantStatus,
    ) -> AppResult<TenantRecord> {
        let query = format!(
            "UPDATE tenants SET status = $1, updated_at = $2 WHERE id = $3 RETURNING {TENANT_COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(status.as_str())
            .bind(Utc::now())
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        let row = row.ok_or_else(|| Self::tenant_not_found(id))?;
        Ok(Self::row_to_tenant(&row)?)
    }

    async fn delete_tenant(&self, id: TenantId) -> AppResult<Option<TenantRecord>> {
        let query = format!("DELETE FROM tenants WHERE id = $1 RETURNING {TENANT_COLUMNS}");
        let row = sqlx::query(&query)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(Self::row_to_tenant).transpose()?)
    }

    async fn upsert_tenant_connection(
        &self,
        tenant_id: TenantId,
        service: ResourceKind,
        details: &ConnectionDetails,
    ) -> AppResult<TenantConnection> {
        let query = format!(
            r"
            INSERT INTO tenant_connections (id, tenant_id, service, db_name, host, port, username, secret_ref, options, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
            ON CONFLICT (tenant_id, service) DO UPDATE SET
                db_name = EXCLUDED.db_name,
                host = EXCLUDED.host,
                port = EXCLUDED.port,
                username = EXCLUDED.username,
                secret_ref = EXCLUDED.secret_ref,
                options = EXCLUDED.options,
                updated_at = EXCLUDED.updated_at
            RETURNING {CONNECTION_COLUMNS}
            "
        );

        let row = sqlx::query(&query)
            .bind(Uuid::new_v4())
            .bind(tenant_id.as_uuid())
            .bind(service.as_str())
            .bind(&details.db_name)
            .bind(&details.host)
            .bind(details.port.map(i32::from))
            .bind(&details.username)
            .bind(&details.secret_ref)
            .bind(&details.options)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::database(format!(
                    "Failed to upsert {service} connection for tenant {tenant_id}: {e}"
                ))
            })?;

        Ok(Self::row_to_connection(&row)?)
    }

    async fn list_tenant_connections(&self, tenant_id: TenantId) -> AppResult<Vec<TenantConnection>> {
        let query = format!(
            "SELECT {CONNECTION_COLUMNS} FROM tenant_connections WHERE tenant_id = $1 ORDER BY service"
        );
        let rows = sqlx::query(&query)
            .bind(tenant_id.as_uuid())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(Self::row_to_connection)
            .collect::<DatabaseResult<Vec<_>>>()?)
    }

    async fn append_provision_log(&self, entry: &NewProvisionLog) -> AppResult<ProvisionLogEntry> {
        let query = format!(
            r"
            INSERT INTO tenant_provision_logs (id, tenant_id, step, status, message, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {LOG_COLUMNS}
            "
        );
        let row = sqlx::query(&query)
            .bind(Uuid::new_v4())
            .bind(entry.tenant_id.as_uuid())
            .bind(&entry.step)
            .bind(entry.status.as_str())
            .bind(&entry.message)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;

        Ok(Self::row_to_log_entry(&row)?)
    }

    async fn list_provision_logs(&self, tenant_id: TenantId) -> AppResult<Vec<ProvisionLogEntry>> {
        let query = format!(
            "SELECT {LOG_COLUMNS} FROM tenant_provision_logs WHERE tenant_id = $1 ORDER BY seq"
        );
        let rows = sqlx::query(&query)
            .bind(tenant_id.as_uuid())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(Self::row_to_log_entry)
            .collect::<DatabaseResult<Vec<_>>>()?)
    }
}
