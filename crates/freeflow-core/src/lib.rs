// ABOUTME: Core model crate for the FreeFlow tenant orchestrator
// ABOUTME: Tenant, connection and provisioning-log DTOs shared by the registry and the sagas
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FreeFlow Contributors

//! # `FreeFlow` Core
//!
//! Plain data types describing tenants and their registry records. This crate
//! carries no I/O so that every layer (registry backends, drivers, sagas, CLI)
//! can share one canonical definition.

/// Tenant, connection and provisioning log models
pub mod models;
