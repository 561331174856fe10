// ABOUTME: Model module root re-exporting tenant, connection and provisioning log types
// ABOUTME: Canonical DTO definitions consumed by the registry backends and the sagas
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FreeFlow Contributors

/// Tenant resource connection coordinates
pub mod connection;
/// Append-only provisioning audit log entries
pub mod provision_log;
/// Tenant identity, lifecycle status and derived resource names
pub mod tenant;

pub use connection::{ConnectionDetails, ResourceKind, TenantConnection};
pub use provision_log::{LogStatus, NewProvisionLog, ProvisionLogEntry};
pub use tenant::{NewTenant, TenantId, TenantRecord, TenantResourceNames, TenantStatus};
