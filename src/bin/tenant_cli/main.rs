// ABOUTME: Command-line front door for tenant provisioning, removal, cleanup and inspection
// ABOUTME: Parses arguments with clap, wires the service context and prints human-readable progress
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FreeFlow Contributors

//! # `FreeFlow` Tenant CLI
//!
//! ## Usage
//!
//! ```bash
//! # Provision a tenant
//! freeflow-tenants provision acme
//!
//! # Suspend a tenant, or tear it down completely
//! freeflow-tenants remove <tenant-id>
//! freeflow-tenants remove <tenant-id> --mode hard --force
//!
//! # Hard-remove every non-active tenant whose name starts with "e2e"
//! freeflow-tenants cleanup --prefix e2e
//!
//! # Inspect the registry
//! freeflow-tenants list --prefix e2e
//! freeflow-tenants show acme
//! ```
//!
//! Configuration is read from the environment; see `ProvisioningConfig`.

mod commands;
mod helpers;

use clap::{Parser, Subcommand};
use tracing::debug;

use freeflow_tenants::config::ProvisioningConfig;
use freeflow_tenants::context::ProvisioningContext;
use freeflow_tenants::logging::{self, LogFormat};
use freeflow_tenants::models::TenantId;
use freeflow_tenants::tenant::RemovalMode;

#[derive(Parser)]
#[command(
    name = "freeflow-tenants",
    about = "FreeFlow tenant lifecycle tool",
    long_about = "Provision, remove and inspect FreeFlow tenants across Keycloak, PostgreSQL, MongoDB and Qdrant",
    version
)]
struct Cli {
    /// Enable verbose logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create every resource of a tenant (safe to re-run for the same name)
    Provision {
        /// Tenant name: 3-30 lowercase letters or digits
        name: String,
    },

    /// Suspend (soft) or permanently delete (hard) a tenant
    Remove {
        /// Tenant id
        tenant_id: TenantId,

        /// Removal mode
        #[arg(long, default_value_t = RemovalMode::Soft)]
        mode: RemovalMode,

        /// Confirm a hard removal
        #[arg(long)]
        force: bool,
    },

    /// Hard-remove tenants whose name starts with a prefix
    Cleanup {
        /// Tenant name prefix
        #[arg(long)]
        prefix: String,

        /// Also remove active tenants
        #[arg(long)]
        include_active: bool,
    },

    /// Show a tenant with its connections and provisioning log
    Show {
        /// Tenant name or id
        tenant: String,
    },

    /// List tenants
    List {
        /// Only tenants whose name starts with this prefix
        #[arg(long)]
        prefix: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    logging::init(log_level, LogFormat::from_env())?;

    let config = ProvisioningConfig::from_env()?;
    debug!(config = ?config, "Configuration loaded");
    let context = ProvisioningContext::from_config(config).await?;

    match cli.command {
        Command::Provision { name } => commands::provision::run(&context, &name).await?,
        Command::Remove {
            tenant_id,
            mode,
            force,
        } => commands::remove::run(&context, tenant_id, mode, force).await?,
        Command::Cleanup {
            prefix,
            include_active,
        } => commands::cleanup::run(&context, &prefix, include_active).await?,
        Command::Show { tenant } => commands::inspect::show(&context, &tenant).await?,
        Command::List { prefix } => commands::inspect::list(&context, prefix.as_deref()).await?,
    }

    Ok(())
}
