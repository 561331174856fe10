// ABOUTME: SQLite append-only provisioning log
// ABOUTME: Entries are inserted in order and never updated or deleted
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FreeFlow Contributors

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::{Database, DatabaseResult};
use crate::database_plugins::shared::{parse_log_status, LOG_COLUMNS};
use crate::models::{NewProvisionLog, ProvisionLogEntry, TenantId};

impl Database {
    /// Append one log entry
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn append_provision_log_impl(
        &self,
        entry: &NewProvisionLog,
    ) -> DatabaseResult<ProvisionLogEntry> {
        let query = format!(
            r"
            INSERT INTO tenant_provision_logs (id, tenant_id, step, status, message, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING {LOG_COLUMNS}
            "
        );
        let row = sqlx::query(&query)
            .bind(Uuid::new_v4().to_string())
            .bind(entry.tenant_id.to_string())
            .bind(&entry.step)
            .bind(entry.status.as_str())
            .bind(&entry.message)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;

        Self::row_to_log_entry(&row)
    }

    /// Every entry written for a tenant, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_provision_logs_impl(
        &self,
        tenant_id: TenantId,
    ) -> DatabaseResult<Vec<ProvisionLogEntry>> {
        let query = format!(
            "SELECT {LOG_COLUMNS} FROM tenant_provision_logs WHERE tenant_id = ? ORDER BY seq"
        );
        let rows = sqlx::query(&query)
            .bind(tenant_id.to_string())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::row_to_log_entry).collect()
    }

    fn row_to_log_entry(row: &SqliteRow) -> DatabaseResult<ProvisionLogEntry> {
        let id: String = row.try_get("id")?;
        let tenant_id: String = row.try_get("tenant_id")?;
        let status: String = row.try_get("status")?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;

        Ok(ProvisionLogEntry {
            id: Uuid::parse_str(&id)?,
            tenant_id: tenant_id.parse()?,
            step: row.try_get("step")?,
            status: parse_log_status(&status)?,
            message: row.try_get("message")?,
            created_at,
        })
    }
}
