// ABOUTME: SQLite tenant record operations for the registry
// ABOUTME: Idempotent create keyed by name, lookups, prefix listing, status updates and delete
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FreeFlow Contributors

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::{Database, DatabaseError, DatabaseResult};
use crate::database_plugins::shared::{parse_tenant_status, TENANT_COLUMNS};
use crate::models::{NewTenant, TenantId, TenantRecord, TenantResourceNames, TenantStatus};

impl Database {
    /// Insert a tenant, or refresh the derived names of the existing tenant with that name
    ///
    /// New rows start in `provisioning`; an existing row keeps its id and status.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn create_tenant_impl(&self, tenant: &NewTenant) -> DatabaseResult<TenantRecord> {
        let now = Utc::now();
        let query = format!(
            r"
            INSERT INTO tenants (id, name, realm_name, postgres_db, mongo_db, qdrant_collection, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(name) DO UPDATE SET
                realm_name = excluded.realm_name,
                postgres_db = excluded.postgres_db,
                mongo_db = excluded.mongo_db,
                qdrant_collection = excluded.qdrant_collection,
                updated_at = excluded.updated_at
            RETURNING {TENANT_COLUMNS}
            "
        );

        let row = sqlx::query(&query)
            .bind(Uuid::new_v4().to_string())
            .bind(&tenant.name)
            .bind(&tenant.names.realm_name)
            .bind(&tenant.names.postgres_db)
            .bind(&tenant.names.mongo_db)
            .bind(&tenant.names.qdrant_collection)
            .bind(TenantStatus::Provisioning.as_str())
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DatabaseError::QueryError {
                context: format!("Failed to upsert tenant {}: {e}", tenant.name),
            })?;

        Self::row_to_tenant(&row)
    }

    /// Look up a tenant by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_tenant_by_id_impl(&self, id: TenantId) -> DatabaseResult<Option<TenantRecord>> {
        let query = format!("SELECT {TENANT_COLUMNS} FROM tenants WHERE id = ?");
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_tenant).transpose()
    }

    /// Look up a tenant by its unique name
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_tenant_by_name_impl(&self, name: &str) -> DatabaseResult<Option<TenantRecord>> {
        let query = format!("SELECT {TENANT_COLUMNS} FROM tenants WHERE name = ?");
        let row = sqlx::query(&query)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_tenant).transpose()
    }

    /// List tenants whose name starts with `prefix`, ordered by name
    ///
    /// Matching is case-sensitive like the `PostgreSQL` backend. `SQLite`'s
    /// `LIKE` folds ASCII case, so the prefix is compared byte for byte.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_tenants_by_name_prefix_impl(
        &self,
        prefix: &str,
    ) -> DatabaseResult<Vec<TenantRecord>> {
        let query = format!(
            r"SELECT {TENANT_COLUMNS} FROM tenants
              WHERE substr(name, 1, length(?1)) = ?1
              ORDER BY name"
        );
        let rows = sqlx::query(&query)
            .bind(prefix)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::row_to_tenant).collect()
    }

    /// Set a tenant's status and return the updated record
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no tenant has this id
    pub async fn update_tenant_status_impl(
        &self,
        id: TenantId,
        status: TenantStatus,
    ) -> DatabaseResult<TenantRecord> {
        let query = format!(
            "UPDATE tenants SET status = ?, updated_at = ? WHERE id = ? RETURNING {TENANT_COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(status.as_str())
            .bind(Utc::now())
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map_or_else(
            || {
                Err(DatabaseError::NotFound {
                    entity: "Tenant",
                    id: id.to_string(),
                })
            },
            Self::row_to_tenant,
        )
    }

    /// Delete a tenant (connections cascade), returning the deleted record
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn delete_tenant_impl(&self, id: TenantId) -> DatabaseResult<Option<TenantRecord>> {
        let query = format!("DELETE FROM tenants WHERE id = ? RETURNING {TENANT_COLUMNS}");
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_tenant).transpose()
    }

    fn row_to_tenant(row: &SqliteRow) -> DatabaseResult<TenantRecord> {
        let id: String = row.try_get("id")?;
        let status: String = row.try_get("status")?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;
        let updated_at: DateTime<Utc> = row.try_get("updated_at")?;

        Ok(TenantRecord {
            id: id.parse()?,
            name: row.try_get("name")?,
            names: TenantResourceNames {
                realm_name: row.try_get("realm_name")?,
                postgres_db: row.try_get("postgres_db")?,
                mongo_db: row.try_get("mongo_db")?,
                qdrant_collection: row.try_get("qdrant_collection")?,
            },
            status: parse_tenant_status(&status)?,
            created_at,
            updated_at,
        })
    }
}
