// ABOUTME: Repository trait definitions for the tenant registry
// ABOUTME: Narrow, object-safe contract the provisioning and removal sagas depend on
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FreeFlow Contributors

use async_trait::async_trait;

use crate::database::DatabaseError;
use crate::models::{
    ConnectionDetails, NewProvisionLog, NewTenant, ProvisionLogEntry, ResourceKind,
    TenantConnection, TenantId, TenantRecord, TenantStatus,
};

/// Tenant registry repository implementation
pub mod tenant_repository;

pub use tenant_repository::TenantRepositoryImpl;

/// Durable source of truth for tenants, their connections and the provisioning log
#[async_trait]
pub trait TenantRepository: Send + Sync {
    /// Find a tenant by unique name
    async fn find_by_name(&self, name: &str) -> Result<Option<TenantRecord>, DatabaseError>;

    /// Find a tenant by id
    async fn find_by_id(&self, id: TenantId) -> Result<Option<TenantRecord>, DatabaseError>;

    /// Tenants whose name starts with `prefix`
    async fn list_by_name_prefix(&self, prefix: &str) -> Result<Vec<TenantRecord>, DatabaseError>;

    /// Every tenant, ordered by name
    async fn list_all(&self) -> Result<Vec<TenantRecord>, DatabaseError>;

    /// Idempotent upsert keyed by name; a second call returns the first tenant's id
    async fn create(&self, tenant: &NewTenant) -> Result<TenantRecord, DatabaseError>;

    /// Transition a tenant's lifecycle status
    async fn update_status(
        &self,
        id: TenantId,
        status: TenantStatus,
    ) -> Result<TenantRecord, DatabaseError>;

    /// Destroy the tenant record (connections cascade); `None` if absent
    async fn delete_by_id(&self, id: TenantId) -> Result<Option<TenantRecord>, DatabaseError>;

    /// Append an audit entry
    async fn append_log(&self, entry: NewProvisionLog) -> Result<ProvisionLogEntry, DatabaseError>;

    /// Record the coordinates of one tenant resource
    async fn upsert_connection(
        &self,
        tenant_id: TenantId,
        service: ResourceKind,
        details: &ConnectionDetails,
    ) -> Result<TenantConnection, DatabaseError>;

    /// Connection rows of a tenant
    async fn list_connections(
        &self,
        tenant_id: TenantId,
    ) -> Result<Vec<TenantConnection>, DatabaseError>;

    /// Audit entries of a tenant, oldest first
    async fn list_logs(&self, tenant_id: TenantId) -> Result<Vec<ProvisionLogEntry>, DatabaseError>;
}
