// ABOUTME: Provision command for the tenant CLI
// ABOUTME: Runs the provisioning saga and prints the resulting tenant and its database URL
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FreeFlow Contributors

use freeflow_tenants::context::ProvisioningContext;
use freeflow_tenants::errors::AppResult;
use freeflow_tenants::logging::redact_url;

use crate::helpers::display::display_tenant;

/// Provision tenant `name`
pub async fn run(context: &ProvisioningContext, name: &str) -> AppResult<()> {
    println!("Provisioning tenant '{name}'...");

    let outcome = match context.provisioner().provision(name).await {
        Ok(outcome) => outcome,
        Err(error) => {
            if !error.is_validation() {
                println!("Provisioning log: freeflow-tenants show {name}");
            }
            return Err(error);
        }
    };

    display_tenant(&outcome.tenant);
    println!(
        "  Database URL: {}",
        redact_url(&outcome.relational_database_url)
    );
    println!("\nSuccess Tenant '{}' is active.", outcome.tenant.name);
    Ok(())
}
