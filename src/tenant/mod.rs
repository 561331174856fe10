// ABOUTME: Tenant lifecycle orchestration: name rules, the saga step runner and both sagas
// ABOUTME: Provisioning creates a tenant's resources, removal suspends or tears them down
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FreeFlow Contributors

//! # Tenant lifecycle
//!
//! Both sagas are an ordered list of [`saga::SagaStep`] records executed by a
//! [`saga::SagaRunner`]. Every step transition lands in the provisioning log,
//! which is the durable record of which step failed and why.
//!
//! Status moves `provisioning -> active` only after every provisioning step
//! succeeded. Any failure parks the tenant in `suspended`; the error is always
//! re-raised to the caller after state has been recorded.

/// Tenant name validation and protected names
pub mod naming;
/// Provisioning saga
pub mod provisioning;
/// Removal saga and cleanup by prefix
pub mod removal;
/// Generic ordered step runner with logging, retry and rollback
pub mod saga;

pub use naming::{is_protected, validate_tenant_name};
pub use provisioning::{ProvisioningOutcome, TenantProvisioner};
pub use removal::{CleanupFailure, CleanupReport, RemovalMode, TenantRemover};
pub use saga::{RollbackReport, SagaRunner, SagaStep, StepFailure};
