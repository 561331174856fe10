// ABOUTME: Cleanup command for the tenant CLI
// ABOUTME: Hard-removes tenants by name prefix and reports removed, skipped and failed tenants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FreeFlow Contributors

use freeflow_tenants::context::ProvisioningContext;
use freeflow_tenants::errors::{AppError, AppResult, ErrorCode};

/// Hard-remove tenants named `prefix*`
pub async fn run(context: &ProvisioningContext, prefix: &str, include_active: bool) -> AppResult<()> {
    let report = context.remover().cleanup(prefix, include_active).await?;

    if report.targeted() == 0 {
        println!("No tenants matched cleanup criteria.");
    } else {
        println!(
            "Removed {} of {} tenant(s) with prefix '{prefix}'.",
            report.removed.len(),
            report.targeted()
        );
        for tenant in &report.removed {
            println!("  - {} ({})", tenant.name, tenant.id);
        }
        for failure in &report.failed {
            println!(
                "  x {} ({}): {}",
                failure.tenant.name, failure.tenant.id, failure.error
            );
        }
    }

    if !report.skipped.is_empty() {
        println!(
            "Skipped {} tenant(s) that are active or protected{}.",
            report.skipped.len(),
            if include_active { "" } else { " (use --include-active to include active ones)" }
        );
    }

    if !report.is_clean() {
        return Err(AppError::new(
            ErrorCode::StepFailed,
            format!("{} tenant(s) could not be removed", report.failed.len()),
        ));
    }

    println!("Cleanup complete.");
    Ok(())
}
