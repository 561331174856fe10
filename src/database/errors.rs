// ABOUTME: Registry-layer error type returned by repository traits
// ABOUTME: Converts sqlx and uuid failures and maps into the application error
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FreeFlow Contributors

use thiserror::Error;

use crate::errors::{AppError, ErrorCode};

/// Result alias for registry operations
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Registry failure
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Referenced row does not exist
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind
        entity: &'static str,
        /// Lookup key
        id: String,
    },

    /// Query failed to execute
    #[error("Database query failed: {context}")]
    QueryError {
        /// What was being attempted plus the driver message
        context: String,
    },

    /// Stored value could not be mapped back to a model
    #[error("Invalid value in column {column}: {value}")]
    InvalidData {
        /// Column name
        column: &'static str,
        /// Offending value
        value: String,
    },

    /// Connection could not be established
    #[error("Database connection failed: {0}")]
    ConnectionError(String),

    /// Schema migration failed
    #[error("Database migration failed: {0}")]
    MigrationError(String),

    /// Error raised by a provider that already speaks the application error type
    #[error(transparent)]
    Provider(#[from] AppError),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                Self::ConnectionError(error.to_string())
            }
            sqlx::Error::Migrate(e) => Self::MigrationError(e.to_string()),
            other => Self::QueryError {
                context: other.to_string(),
            },
        }
    }
}

impl From<uuid::Error> for DatabaseError {
    fn from(error: uuid::Error) -> Self {
        Self::InvalidData {
            column: "id",
            value: error.to_string(),
        }
    }
}

impl From<DatabaseError> for AppError {
    fn from(error: DatabaseError) -> Self {
        let code = match error {
            DatabaseError::Provider(inner) => return inner,
            DatabaseError::NotFound { .. } => ErrorCode::ResourceNotFound,
            _ => ErrorCode::DatabaseError,
        };
        Self::new(code, error.to_string()).with_source(error)
    }
}
