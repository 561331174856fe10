// ABOUTME: Registry abstraction layer for the tenant orchestrator
// ABOUTME: Plugin architecture for registry support with SQLite and PostgreSQL backends
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FreeFlow Contributors

use async_trait::async_trait;

use crate::errors::AppResult;
use crate::models::{
    ConnectionDetails, NewProvisionLog, NewTenant, ProvisionLogEntry, ResourceKind,
    TenantConnection, TenantId, TenantRecord, TenantStatus,
};

/// Registry factory selecting the backend from the URL scheme
pub mod factory;

/// PostgreSQL registry implementation
pub mod postgres;

/// Shared registry logic (enum parsing, column lists, pattern escaping)
pub mod shared;

/// Core registry abstraction trait
///
/// All registry implementations must implement this trait to provide
/// a consistent interface for the repositories.
#[async_trait]
pub trait DatabaseProvider: Send + Sync + Clone {
    /// Connect and bring the schema up to date
    async fn new(database_url: &str) -> AppResult<Self>
    where
        Self: Sized;

    /// Run registry migrations to set up schema
    async fn migrate(&self) -> AppResult<()>;

    // ================================
    // Tenants
    // ================================

    /// Idempotent create keyed by name; an existing tenant keeps its id
    async fn create_tenant(&self, tenant: &NewTenant) -> AppResult<TenantRecord>;

    /// Look up a tenant by id
    async fn get_tenant_by_id(&self, id: TenantId) -> AppResult<Option<TenantRecord>>;

    /// Look up a tenant by unique name
    async fn get_tenant_by_name(&self, name: &str) -> AppResult<Option<TenantRecord>>;

    /// Tenants whose name starts with `prefix` (empty prefix lists all)
    async fn list_tenants_by_name_prefix(&self, prefix: &str) -> AppResult<Vec<TenantRecord>>;

    /// Transition a tenant's lifecycle status
    async fn update_tenant_status(
        &self,
        id: TenantId,
        status: TenantStatus,
    ) -> AppResult<TenantRecord>;

    /// Destroy a tenant record and its connections
    async fn delete_tenant(&self, id: TenantId) -> AppResult<Option<TenantRecord>>;

    // ================================
    // Connections
    // ================================

    /// Record the coordinates of one tenant resource
    async fn upsert_tenant_connection(
        &self,
        tenant_id: TenantId,
        service: ResourceKind,
        details: &ConnectionDetails,
    ) -> AppResult<TenantConnection>;

    /// Connection rows of a tenant
    async fn list_tenant_connections(&self, tenant_id: TenantId) -> AppResult<Vec<TenantConnection>>;

    // ================================
    // Provisioning log
    // ================================

    /// Append an audit entry
    async fn append_provision_log(&self, entry: &NewProvisionLog) -> AppResult<ProvisionLogEntry>;

    /// Audit entries of a tenant, oldest first
    async fn list_provision_logs(&self, tenant_id: TenantId) -> AppResult<Vec<ProvisionLogEntry>>;
}
