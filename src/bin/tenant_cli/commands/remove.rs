// ABOUTME: Remove command for the tenant CLI
// ABOUTME: Soft-suspends or hard-deletes one tenant by id
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FreeFlow Contributors

use freeflow_tenants::context::ProvisioningContext;
use freeflow_tenants::errors::AppResult;
use freeflow_tenants::models::TenantId;
use freeflow_tenants::tenant::RemovalMode;

/// Remove tenant `tenant_id`
pub async fn run(
    context: &ProvisioningContext,
    tenant_id: TenantId,
    mode: RemovalMode,
    force: bool,
) -> AppResult<()> {
    println!("Removing tenant {tenant_id} ({mode})...");

    let tenant = context.remover().remove(tenant_id, mode, force).await?;

    match mode {
        RemovalMode::Soft => println!(
            "Success Tenant '{}' suspended; realm {} disabled, data kept.",
            tenant.name, tenant.names.realm_name
        ),
        RemovalMode::Hard => println!(
            "Success Tenant '{}' and all of its resources were deleted.",
            tenant.name
        ),
    }
    Ok(())
}
