// ABOUTME: Backend-independent helpers shared by the SQLite and PostgreSQL registries
// ABOUTME: Enum column parsing, port conversion and LIKE prefix escaping
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FreeFlow Contributors

use crate::database::{DatabaseError, DatabaseResult};
use crate::models::{LogStatus, ResourceKind, TenantStatus};

/// Column list selected for tenant rows, shared by every tenant query
pub const TENANT_COLUMNS: &str =
    "id, name, realm_name, postgres_db, mongo_db, qdrant_collection, status, created_at, updated_at";

/// Column list selected for connection rows
pub const CONNECTION_COLUMNS: &str =
    "id, tenant_id, service, db_name, host, port, username, secret_ref, options, created_at, updated_at";

/// Column list selected for provisioning log rows
pub const LOG_COLUMNS: &str = "id, tenant_id, step, status, message, created_at";

/// Build a `LIKE` pattern matching names that start with `prefix`
///
/// Wildcards in the prefix are escaped with `\`; queries must declare `ESCAPE '\'`.
#[must_use]
pub fn prefix_pattern(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Parse a stored tenant status
///
/// # Errors
///
/// Returns `InvalidData` for values outside the lifecycle
pub fn parse_tenant_status(value: &str) -> DatabaseResult<TenantStatus> {
    TenantStatus::parse_str(value).ok_or_else(|| DatabaseError::InvalidData {
        column: "status",
        value: value.to_owned(),
    })
}

/// Parse a stored log status
///
/// # Errors
///
/// Returns `InvalidData` for unknown values
pub fn parse_log_status(value: &str) -> DatabaseResult<LogStatus> {
    LogStatus::parse_str(value).ok_or_else(|| DatabaseError::InvalidData {
        column: "status",
        value: value.to_owned(),
    })
}

/// Parse a stored resource kind
///
/// # Errors
///
/// Returns `InvalidData` for unknown values
pub fn parse_resource_kind(value: &str) -> DatabaseResult<ResourceKind> {
    ResourceKind::parse_str(value).ok_or_else(|| DatabaseError::InvalidData {
        column: "service",
        value: value.to_owned(),
    })
}

/// Convert a stored port back to `u16`
///
/// # Errors
///
/// Returns `InvalidData` when the stored value is out of range
pub fn port_from_db(value: Option<i64>) -> DatabaseResult<Option<u16>> {
    value
        .map(|port| {
            u16::try_from(port).map_err(|_| DatabaseError::InvalidData {
                column: "port",
                value: port.to_string(),
            })
        })
        .transpose()
}
