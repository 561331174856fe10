// ABOUTME: Read-only registry inspection commands for the tenant CLI
// ABOUTME: Shows one tenant with connections and audit log, or lists tenants by prefix
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FreeFlow Contributors

use freeflow_tenants::context::ProvisioningContext;
use freeflow_tenants::errors::{AppError, AppResult};
use freeflow_tenants::models::TenantId;

use crate::helpers::display::{display_connections, display_logs, display_tenant, display_tenant_table};

/// Show the tenant named or identified by `tenant`
pub async fn show(context: &ProvisioningContext, tenant: &str) -> AppResult<()> {
    let registry = &context.registry;

    let record = match tenant.parse::<TenantId>() {
        Ok(id) => registry.find_by_id(id).await?,
        Err(_) => registry.find_by_name(tenant).await?,
    }
    .ok_or_else(|| AppError::not_found("Tenant", tenant))?;

    display_tenant(&record);
    display_connections(&registry.list_connections(record.id).await?);
    display_logs(&registry.list_logs(record.id).await?);
    Ok(())
}

/// List tenants, optionally by name prefix
pub async fn list(context: &ProvisioningContext, prefix: Option<&str>) -> AppResult<()> {
    let tenants = match prefix {
        Some(prefix) => context.registry.list_by_name_prefix(prefix).await?,
        None => context.registry.list_all().await?,
    };

    if tenants.is_empty() {
        println!("No tenants found.");
        return Ok(());
    }
    display_tenant_table(&tenants);
    Ok(())
}
