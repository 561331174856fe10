// ABOUTME: Console rendering of tenants, connections and provisioning log entries
// ABOUTME: Plain println! output aligned for terminals
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FreeFlow Contributors

use freeflow_tenants::models::{ProvisionLogEntry, TenantConnection, TenantRecord};

const TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S UTC";

pub fn display_tenant(tenant: &TenantRecord) {
    println!("\nTenant {}", tenant.name);
    println!("  Id:                {}", tenant.id);
    println!("  Status:            {}", tenant.status);
    println!("  Realm:             {}", tenant.names.realm_name);
    println!("  Postgres database: {}", tenant.names.postgres_db);
    println!("  Mongo database:    {}", tenant.names.mongo_db);
    println!("  Qdrant collection: {}", tenant.names.qdrant_collection);
    println!("  Created:           {}", tenant.created_at.format(TIMESTAMP));
    println!("  Updated:           {}", tenant.updated_at.format(TIMESTAMP));
}

pub fn display_connections(connections: &[TenantConnection]) {
    println!("\nConnections");
    if connections.is_empty() {
        println!("  (none)");
        return;
    }
    for connection in connections {
        let details = &connection.details;
        let host = details.host.as_deref().unwrap_or("-");
        let port = details
            .port
            .map_or_else(|| "-".to_owned(), |port| port.to_string());
        let user = details.username.as_deref().unwrap_or("-");
        println!(
            "  {:<9} {} on {host}:{port} as {user}",
            connection.service.as_str(),
            details.db_name
        );
        if let Some(options) = &details.options {
            println!("            options {options}");
        }
    }
}

pub fn display_logs(entries: &[ProvisionLogEntry]) {
    println!("\nProvisioning log");
    if entries.is_empty() {
        println!("  (empty)");
        return;
    }
    for entry in entries {
        let message = entry.message.as_deref().unwrap_or("");
        println!(
            "  {}  {:<22} {:<9} {message}",
            entry.created_at.format(TIMESTAMP),
            entry.step,
            entry.status.as_str()
        );
    }
}

pub fn display_tenant_table(tenants: &[TenantRecord]) {
    println!("{:<32} {:<12} {:<36} CREATED", "NAME", "STATUS", "ID");
    for tenant in tenants {
        println!(
            "{:<32} {:<12} {:<36} {}",
            tenant.name,
            tenant.status.as_str(),
            tenant.id.to_string(),
            tenant.created_at.format(TIMESTAMP)
        );
    }
    println!("\n{} tenant(s)", tenants.len());
}
