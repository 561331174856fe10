// ABOUTME: Utility module root for shared helpers
// ABOUTME: Retry wrapper for saga steps and connection URL manipulation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FreeFlow Contributors

/// Bounded retry with delay for idempotent operations
pub mod retry;
/// Connection string parsing and rewriting
pub mod url;
