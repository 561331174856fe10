// ABOUTME: Forward-only schema migrations applied to a freshly created tenant database
// ABOUTME: Runtime sqlx migrator over the tenant migrations directory
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FreeFlow Contributors

use std::path::Path;
use std::time::Duration;

use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::config::environment::redact_url;
use crate::errors::{AppError, AppResult};

/// Apply every pending migration in `migrations_dir` to the tenant database
///
/// Already-applied migrations are skipped, so re-running after a partial
/// provisioning is safe. Migrations are never reverted.
///
/// # Errors
///
/// Returns an error if the directory cannot be read, the database cannot be
/// reached, or a migration fails
pub async fn run_tenant_migrations(
    tenant_database_url: &str,
    migrations_dir: &Path,
    timeout: Duration,
) -> AppResult<()> {
    let migrator = Migrator::new(migrations_dir.to_path_buf())
        .await
        .map_err(|e| {
            AppError::config(format!(
                "Cannot load tenant migrations from {}: {e}",
                migrations_dir.display()
            ))
        })?;

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(timeout)
        .connect(tenant_database_url)
        .await
        .map_err(|e| AppError::external_service("PostgreSQL", e))?;

    info!(
        database = %redact_url(tenant_database_url),
        migrations = migrator.iter().count(),
        "Applying tenant migrations"
    );
    let result = migrator
        .run(&pool)
        .await
        .map_err(|e| AppError::external_service("PostgreSQL", format!("migration failed: {e}")));
    pool.close().await;
    result
}
