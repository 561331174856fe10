// ABOUTME: Tenant registry repository implementation
// ABOUTME: Adapts the backend-selecting Database to the TenantRepository contract
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FreeFlow Contributors

use async_trait::async_trait;

use super::TenantRepository;
use crate::database::DatabaseError;
use crate::database_plugins::factory::Database;
use crate::database_plugins::DatabaseProvider;
use crate::models::{
    ConnectionDetails, NewProvisionLog, NewTenant, ProvisionLogEntry, ResourceKind,
    TenantConnection, TenantId, TenantRecord, TenantStatus,
};

/// SQLite/PostgreSQL implementation of `TenantRepository`
#[derive(Clone)]
pub struct TenantRepositoryImpl {
    db: Database,
}

impl TenantRepositoryImpl {
    /// Create a new `TenantRepository` with the given database connection
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    /// Underlying registry handle
    #[must_use]
    pub const fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl TenantRepository for TenantRepositoryImpl {
    async fn find_by_name(&self, name: &str) -> Result<Option<TenantRecord>, DatabaseError> {
        Ok(self.db.get_tenant_by_name(name).await?)
    }

    async fn find_by_id(&self, id: TenantId) -> Result<Option<TenantRecord>, DatabaseError> {
        Ok(self.db.get_tenant_by_id(id).await?)
    }

    async fn list_by_name_prefix(&self, prefix: &str) -> Result<Vec<TenantRecord>, DatabaseError> {
        Ok(self.db.list_tenants_by_name_prefix(prefix).await?)
    }

    async fn list_all(&self) -> Result<Vec<TenantRecord>, DatabaseError> {
        Ok(self.db.list_tenants_by_name_prefix("").await?)
    }

    async fn create(&self, tenant: &NewTenant) -> Result<TenantRecord, DatabaseError> {
        Ok(self.db.create_tenant(tenant).await?)
    }

    async fn update_status(
        &self,
        id: TenantId,
        status: TenantStatus,
    ) -> Result<TenantRecord, DatabaseError> {
        Ok(self.db.update_tenant_status(id, status).await?)
    }

    async fn delete_by_id(&self, id: TenantId) -> Result<Option<TenantRecord>, DatabaseError> {
        Ok(self.db.delete_tenant(id).await?)
    }

    async fn append_log(&self, entry: NewProvisionLog) -> Result<ProvisionLogEntry, DatabaseError> {
        Ok(self.db.append_provision_log(&entry).await?)
    }

    async fn upsert_connection(
        &self,
        tenant_id: TenantId,
        service: ResourceKind,
        details: &ConnectionDetails,
    ) -> Result<TenantConnection, DatabaseError> {
        Ok(self
            .db
            .upsert_tenant_connection(tenant_id, service, details)
            .await?)
    }

    async fn list_connections(
        &self,
        tenant_id: TenantId,
    ) -> Result<Vec<TenantConnection>, DatabaseError> {
        Ok(self.db.list_tenant_connections(tenant_id).await?)
    }

    async fn list_logs(&self, tenant_id: TenantId) -> Result<Vec<ProvisionLogEntry>, DatabaseError> {
        Ok(self.db.list_provision_logs(tenant_id).await?)
    }
}
