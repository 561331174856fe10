// ABOUTME: Configuration module root for the tenant orchestrator
// ABOUTME: Environment-only configuration loading and validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FreeFlow Contributors

/// Environment-driven provisioning configuration
pub mod environment;

pub use environment::{ProvisioningConfig, VectorDistance};
