// ABOUTME: Subcommand implementations for the tenant CLI
// ABOUTME: Each command drives one saga or registry query and prints the outcome
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FreeFlow Contributors

pub mod cleanup;
pub mod inspect;
pub mod provision;
pub mod remove;
