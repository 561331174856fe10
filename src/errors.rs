// ABOUTME: Unified error handling with standard error codes for the tenant orchestrator
// ABOUTME: AppError carries an ErrorCode, a human message and an optional underlying source
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FreeFlow Contributors

//! # Error handling
//!
//! Every fallible operation in the crate returns [`AppResult`]. The [`ErrorCode`]
//! classifies failures so callers (CLI, HTTP layer) can translate them without
//! string matching:
//!
//! - validation failures (`InvalidInput`, `PermissionDenied`) are fatal and never retried
//! - `ResourceNotFound` is fatal and distinct from step failures
//! - driver failures surface as `ExternalServiceError` and become `StepFailed`
//!   once the retry bound is exhausted

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

/// Result alias used throughout the crate
pub type AppResult<T> = Result<T, AppError>;

/// Boxed underlying error kept as the `source` of an [`AppError`]
type BoxedSource = Box<dyn StdError + Send + Sync + 'static>;

/// Standard error codes
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Malformed input (tenant name, missing force flag, bad identifier)
    InvalidInput,
    /// Operation forbidden regardless of flags (protected tenant)
    PermissionDenied,
    /// Referenced tenant or record does not exist
    ResourceNotFound,
    /// Configuration missing or malformed
    ConfigError,
    /// Registry failure
    DatabaseError,
    /// Backing system call failed
    ExternalServiceError,
    /// A saga step failed after exhausting its retries
    StepFailed,
    /// Unexpected internal failure
    InternalError,
}

impl ErrorCode {
    /// Stable machine-readable name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::PermissionDenied => "permission_denied",
            Self::ResourceNotFound => "resource_not_found",
            Self::ConfigError => "config_error",
            Self::DatabaseError => "database_error",
            Self::ExternalServiceError => "external_service_error",
            Self::StepFailed => "step_failed",
            Self::InternalError => "internal_error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application error
#[derive(Debug, Error)]
#[error("{message}")]
pub struct AppError {
    /// Classification
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    #[source]
    source: Option<BoxedSource>,
}

impl AppError {
    /// Create an error with a code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Attach the underlying error
    #[must_use]
    pub fn with_source(mut self, source: impl Into<BoxedSource>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Malformed input
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Forbidden operation
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PermissionDenied, message)
    }

    /// Missing resource, e.g. `not_found("Tenant", id)`
    pub fn not_found(entity: impl fmt::Display, id: impl fmt::Display) -> Self {
        Self::new(ErrorCode::ResourceNotFound, format!("{entity} not found: {id}"))
    }

    /// Configuration problem
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// Registry problem
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// Backing system failure, e.g. `external_service("Qdrant", "HTTP 500")`
    pub fn external_service(service: &str, message: impl fmt::Display) -> Self {
        Self::new(ErrorCode::ExternalServiceError, format!("{service}: {message}"))
    }

    /// Saga step failure after `attempts` attempts; keeps the last error as source
    pub fn step_failed(label: &str, attempts: u32, last: Self) -> Self {
        let noun = if attempts == 1 { "attempt" } else { "attempts" };
        Self::new(
            ErrorCode::StepFailed,
            format!("Failed {label} after {attempts} {noun}: {last}"),
        )
        .with_source(last)
    }

    /// Unexpected internal failure
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Whether the error is a fatal validation error (never retried, never logged)
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self.code, ErrorCode::InvalidInput | ErrorCode::PermissionDenied)
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::internal(format!("I/O error: {error}")).with_source(error)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        Self::database(error.to_string()).with_source(error)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::internal(format!("JSON error: {error}")).with_source(error)
    }
}
