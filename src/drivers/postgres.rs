// ABOUTME: PostgreSQL driver creating and dropping one database per tenant
// ABOUTME: Uses a short-lived admin connection and sanitized, double-quoted identifiers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FreeFlow Contributors

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgConnection;
use sqlx::{Connection, Executor};
use tokio::time::timeout;
use tracing::{debug, info};

use super::migrations::run_tenant_migrations;
use super::{sanitize_identifier, RelationalDriver, ResourceDriver};
use crate::errors::{AppError, AppResult};

const SERVICE: &str = "PostgreSQL";

/// Sanitized database name with the admin statements that act on it
///
/// Existence checks, `CREATE` and `DROP` must all use the same name or a
/// name changed by sanitizing is never found and created twice.
#[derive(Debug)]
struct DatabaseStatements {
    name: String,
    create: String,
    drop: String,
}

impl DatabaseStatements {
    fn for_name(name: &str) -> AppResult<Self> {
        let name = sanitize_identifier(name)?;
        Ok(Self {
            create: format!(r#"CREATE DATABASE "{name}""#),
            drop: format!(r#"DROP DATABASE IF EXISTS "{name}""#),
            name,
        })
    }
}

/// Relational database driver
pub struct PostgresDriver {
    admin_url: String,
    migrations_dir: PathBuf,
    timeout: Duration,
}

impl PostgresDriver {
    /// Create a driver for the server reached by `admin_url`
    #[must_use]
    pub const fn new(admin_url: String, migrations_dir: PathBuf, timeout: Duration) -> Self {
        Self {
            admin_url,
            migrations_dir,
            timeout,
        }
    }

    async fn connect(&self) -> AppResult<PgConnection> {
        timeout(self.timeout, PgConnection::connect(&self.admin_url))
            .await
            .map_err(|_| {
                AppError::external_service(
                    SERVICE,
                    format!("connection timed out after {}s", self.timeout.as_secs()),
                )
            })?
            .map_err(|e| AppError::external_service(SERVICE, e))
    }

    async fn database_exists(conn: &mut PgConnection, name: &str) -> AppResult<bool> {
        let found: Option<i32> = sqlx::query_scalar("SELECT 1 FROM pg_database WHERE datname = $1")
            .bind(name)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| AppError::external_service(SERVICE, e))?;
        Ok(found.is_some())
    }

    async fn execute_admin(&self, conn: &mut PgConnection, statement: &str) -> AppResult<()> {
        // CREATE/DROP DATABASE cannot run as prepared statements inside a transaction
        timeout(self.timeout, conn.execute(sqlx::raw_sql(statement)))
            .await
            .map_err(|_| AppError::external_service(SERVICE, "statement timed out"))?
            .map_err(|e| AppError::external_service(SERVICE, e))?;
        Ok(())
    }
}

#[async_trait]
impl ResourceDriver for PostgresDriver {
    fn kind(&self) -> &'static str {
        SERVICE
    }

    async fn ensure(&self, name: &str) -> AppResult<()> {
        let statements = DatabaseStatements::for_name(name)?;
        let mut conn = self.connect().await?;

        let result: AppResult<()> = async {
            if Self::database_exists(&mut conn, &statements.name).await? {
                debug!(database = %statements.name, "Database already exists");
                return Ok(());
            }
            self.execute_admin(&mut conn, &statements.create).await?;
            info!(database = %statements.name, "Database created");
            Ok(())
        }
        .await;

        // Close failures are irrelevant once the statement outcome is known
        let _ = conn.close().await;
        result
    }

    async fn drop_resource(&self, name: &str) -> AppResult<()> {
        let statements = DatabaseStatements::for_name(name)?;
        let mut conn = self.connect().await?;

        let result = self.execute_admin(&mut conn, &statements.drop).await;
        let _ = conn.close().await;

        if result.is_ok() {
            info!(database = %statements.name, "Database dropped");
        }
        result
    }
}

#[async_trait]
impl RelationalDriver for PostgresDriver {
    async fn run_migrations(&self, tenant_database_url: &str) -> AppResult<()> {
        run_tenant_migrations(tenant_database_url, &self.migrations_dir, self.timeout).await
    }
}
