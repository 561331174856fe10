// ABOUTME: Helper modules for the tenant CLI
// ABOUTME: Console rendering of registry records
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FreeFlow Contributors

pub mod display;
