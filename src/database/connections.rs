// ABOUTME: SQLite storage of per-tenant resource connection coordinates
// ABOUTME: One row per (tenant, resource kind), upserted during provisioning
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FreeFlow Contributors

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::{Database, DatabaseError, DatabaseResult};
use crate::database_plugins::shared::{parse_resource_kind, port_from_db, CONNECTION_COLUMNS};
use crate::models::{ConnectionDetails, ResourceKind, TenantConnection, TenantId};

impl Database {
    /// Insert or replace the coordinates of one tenant resource
    ///
    /// # Errors
    ///
    /// Returns an error if the options cannot be serialized or the query fails
    pub async fn upsert_tenant_connection_impl(
        &self,
        tenant_id: TenantId,
        service: ResourceKind,
        details: &ConnectionDetails,
    ) -> DatabaseResult<TenantConnection> {
        let options = details
            .options
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| DatabaseError::InvalidData {
                column: "options",
                value: e.to_string(),
            })?;
        let now = Utc::now();

        let query = format!(
            r"
            INSERT INTO tenant_connections (id, tenant_id, service, db_name, host, port, username, secret_ref, options, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(tenant_id, service) DO UPDATE SET
                db_name = excluded.db_name,
                host = excluded.host,
                port = excluded.port,
                username = excluded.username,
                secret_ref = excluded.secret_ref,
                options = excluded.options,
                updated_at = excluded.updated_at
            RETURNING {CONNECTION_COLUMNS}
            "
        );

        let row = sqlx::query(&query)
            .bind(Uuid::new_v4().to_string())
            .bind(tenant_id.to_string())
            .bind(service.as_str())
            .bind(&details.db_name)
            .bind(&details.host)
            .bind(details.port.map(i64::from))
            .bind(&details.username)
            .bind(&details.secret_ref)
            .bind(options)
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DatabaseError::QueryError {
                context: format!("Failed to upsert {service} connection for tenant {tenant_id}: {e}"),
            })?;

        Self::row_to_connection(&row)
    }

    /// List a tenant's connection rows
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_tenant_connections_impl(
        &self,
        tenant_id: TenantId,
    ) -> DatabaseResult<Vec<TenantConnection>> {
        let query = format!(
            "SELECT {CONNECTION_COLUMNS} FROM tenant_connections WHERE tenant_id = ? ORDER BY service"
        );
        let rows = sqlx::query(&query)
            .bind(tenant_id.to_string())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::row_to_connection).collect()
    }

    fn row_to_connection(row: &SqliteRow) -> DatabaseResult<TenantConnection> {
        let id: String = row.try_get("id")?;
        let tenant_id: String = row.try_get("tenant_id")?;
        let service: String = row.try_get("service")?;
        let options: Option<String> = row.try_get("options")?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;
        let updated_at: DateTime<Utc> = row.try_get("updated_at")?;

        let options = options
            .map(|raw| serde_json::from_str::<Value>(&raw))
            .transpose()
            .map_err(|e| DatabaseError::InvalidData {
                column: "options",
                value: e.to_string(),
            })?;

        Ok(TenantConnection {
            id: Uuid::parse_str(&id)?,
            tenant_id: tenant_id.parse()?,
            service: parse_resource_kind(&service)?,
            details: ConnectionDetails {
                db_name: row.try_get("db_name")?,
                host: row.try_get("host")?,
                port: port_from_db(row.try_get("port")?)?,
                username: row.try_get("username")?,
                secret_ref: row.try_get("secret_ref")?,
                options,
            },
            created_at,
            updated_at,
        })
    }
}
