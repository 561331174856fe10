// ABOUTME: Main library entry point for the FreeFlow tenant lifecycle orchestrator
// ABOUTME: Provisioning and removal sagas across identity, relational, document and vector stores
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FreeFlow Contributors

// Crate-level attributes:
// - deny(unsafe_code): zero-tolerance unsafe policy
#![deny(unsafe_code)]

//! # `FreeFlow` Tenants
//!
//! Every tenant owns isolated resources in four backing systems: a Keycloak
//! realm, a `PostgreSQL` database, a `MongoDB` database and a Qdrant collection,
//! plus a storage directory. This crate creates and destroys them.
//!
//! ## Architecture
//!
//! - **Drivers**: idempotent `ensure` / `drop_resource` per backing system
//! - **Registry**: tenants, their connection coordinates and an append-only
//!   provisioning log, on `SQLite` or `PostgreSQL`
//! - **Sagas**: ordered steps with per-step retry, audit logging and optional
//!   rollback; see [`tenant`]
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use freeflow_tenants::config::ProvisioningConfig;
//! use freeflow_tenants::context::ProvisioningContext;
//! use freeflow_tenants::errors::AppResult;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = ProvisioningConfig::from_env()?;
//!     let context = ProvisioningContext::from_config(config).await?;
//!
//!     let outcome = context.provisioner().provision("acme").await?;
//!     println!("Tenant {} is {}", outcome.tenant.name, outcome.tenant.status);
//!     Ok(())
//! }
//! ```

/// Environment-driven configuration
pub mod config;

/// Application constants and step labels
pub mod constants;

/// Registry and driver wiring
pub mod context;

/// Tenant registry on `SQLite` plus the repository contract
pub mod database;

/// Registry backends with runtime selection
pub mod database_plugins;

/// Idempotent resource drivers per backing system
pub mod drivers;

/// Unified error handling with standard error codes
pub mod errors;

/// Structured logging setup
pub mod logging;

/// Provisioning and removal sagas
pub mod tenant;

/// Retry and connection URL helpers
pub mod utils;

/// Tenant, connection and provisioning log models
pub use freeflow_core::models;
