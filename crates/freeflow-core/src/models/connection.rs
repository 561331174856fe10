// ABOUTME: Tenant resource connection coordinates recorded per (tenant, resource kind)
// ABOUTME: ResourceKind enum plus ConnectionDetails input and TenantConnection row DTOs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FreeFlow Contributors

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::TenantId;

/// Backing system a tenant owns an isolated resource in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// Identity realm
    Keycloak,
    /// Relational database
    Postgres,
    /// Document database
    Mongodb,
    /// Vector collection
    Qdrant,
}

impl ResourceKind {
    /// Storage representation (`service` column)
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Keycloak => "keycloak",
            Self::Postgres => "postgres",
            Self::Mongodb => "mongodb",
            Self::Qdrant => "qdrant",
        }
    }

    /// Parse the storage representation
    #[must_use]
    pub fn parse_str(value: &str) -> Option<Self> {
        match value {
            "keycloak" => Some(Self::Keycloak),
            "postgres" => Some(Self::Postgres),
            "mongodb" => Some(Self::Mongodb),
            "qdrant" => Some(Self::Qdrant),
            _ => None,
        }
    }

    /// Port assumed when a connection URL does not carry one
    #[must_use]
    pub const fn default_port(&self) -> u16 {
        match self {
            Self::Keycloak => 8080,
            Self::Postgres => 5432,
            Self::Mongodb => 27017,
            Self::Qdrant => 6333,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Concrete coordinates assigned to one tenant resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionDetails {
    /// Database, collection or realm name
    pub db_name: String,
    /// Host name, if known
    pub host: Option<String>,
    /// Port, if known
    pub port: Option<u16>,
    /// User name, if any
    pub username: Option<String>,
    /// Reference to an external secret, never the secret itself
    pub secret_ref: Option<String>,
    /// Opaque kind-specific options (vector size, distance metric, ...)
    pub options: Option<Value>,
}

/// Stored connection row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantConnection {
    /// Row id
    pub id: Uuid,
    /// Owning tenant
    pub tenant_id: TenantId,
    /// Resource kind
    pub service: ResourceKind,
    /// Coordinates
    #[serde(flatten)]
    pub details: ConnectionDetails,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}
