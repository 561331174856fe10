// ABOUTME: Append-only provisioning audit log DTOs
// ABOUTME: One entry per saga step transition, never updated or deleted
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FreeFlow Contributors

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::TenantId;

/// Outcome recorded for a step transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStatus {
    /// Step began
    Started,
    /// Step completed
    Succeeded,
    /// Step failed (message carries the error)
    Failed,
}

impl LogStatus {
    /// Storage representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }

    /// Parse the storage representation
    #[must_use]
    pub fn parse_str(value: &str) -> Option<Self> {
        match value {
            "started" => Some(Self::Started),
            "succeeded" => Some(Self::Succeeded),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for LogStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input for appending a log entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProvisionLog {
    /// Tenant the saga runs for
    pub tenant_id: TenantId,
    /// Step name (`initialize`, `postgres`, `keycloak:rollback`, ...)
    pub step: String,
    /// Transition
    pub status: LogStatus,
    /// Optional detail, typically the error message
    pub message: Option<String>,
}

impl NewProvisionLog {
    /// Entry without a message
    #[must_use]
    pub fn new(tenant_id: TenantId, step: impl Into<String>, status: LogStatus) -> Self {
        Self {
            tenant_id,
            step: step.into(),
            status,
            message: None,
        }
    }

    /// Attach a message
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Stored log row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionLogEntry {
    /// Row id
    pub id: Uuid,
    /// Tenant the entry belongs to (may outlive the tenant record)
    pub tenant_id: TenantId,
    /// Step name
    pub step: String,
    /// Transition
    pub status: LogStatus,
    /// Optional detail
    pub message: Option<String>,
    /// When the entry was written
    pub created_at: DateTime<Utc>,
}
