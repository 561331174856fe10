// ABOUTME: Tenant identity, lifecycle status and deterministic resource naming
// ABOUTME: TenantId newtype, TenantStatus state machine values and TenantRecord DTO
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FreeFlow Contributors

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix shared by every resource name derived from a tenant name
pub const RESOURCE_PREFIX: &str = "freeflow";

/// Stable surrogate key of a tenant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(Uuid);

impl TenantId {
    /// Generate a fresh random tenant id
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Underlying UUID value
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for TenantId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TenantId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

impl From<Uuid> for TenantId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// Lifecycle stage of a tenant
///
/// `provisioning -> active`, any failure or soft removal `-> suspended`,
/// hard removal `-> deleting` and finally the record is destroyed. `deleted`
/// is kept for registries that archive instead of destroying rows.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenantStatus {
    /// Provisioning saga in progress
    Provisioning,
    /// Every provisioning step succeeded
    Active,
    /// Access revoked: provisioning failed, soft removal, or failed hard removal
    Suspended,
    /// Hard removal in progress
    Deleting,
    /// Fully torn down
    Deleted,
}

impl TenantStatus {
    /// All statuses in lifecycle order
    pub const ALL: [Self; 5] = [
        Self::Provisioning,
        Self::Active,
        Self::Suspended,
        Self::Deleting,
        Self::Deleted,
    ];

    /// Storage representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Provisioning => "provisioning",
            Self::Active => "active",
            Self::Suspended => "suspended",
            Self::Deleting => "deleting",
            Self::Deleted => "deleted",
        }
    }

    /// Parse the storage representation
    #[must_use]
    pub fn parse_str(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == value)
    }
}

impl fmt::Display for TenantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Names of the external resources owned by one tenant
///
/// Pure function of the tenant name; never edited independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantResourceNames {
    /// Identity realm (`freeflow-<name>`)
    pub realm_name: String,
    /// Relational database (`freeflow_<name>`)
    pub postgres_db: String,
    /// Document database (`freeflow_<name>`)
    pub mongo_db: String,
    /// Vector collection (`freeflow_<name>_vectors`)
    pub qdrant_collection: String,
}

impl TenantResourceNames {
    /// Derive every resource name from the tenant name
    #[must_use]
    pub fn derive(tenant_name: &str) -> Self {
        let base = format!("{RESOURCE_PREFIX}_{tenant_name}");
        Self {
            realm_name: format!("{RESOURCE_PREFIX}-{tenant_name}"),
            postgres_db: base.clone(),
            mongo_db: base.clone(),
            qdrant_collection: format!("{base}_vectors"),
        }
    }
}

/// Input for the registry's idempotent create
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTenant {
    /// Human-chosen unique key
    pub name: String,
    /// Derived resource names
    pub names: TenantResourceNames,
}

impl NewTenant {
    /// Build the create input for a tenant name, deriving its resource names
    #[must_use]
    pub fn for_name(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            names: TenantResourceNames::derive(name),
        }
    }
}

/// One registry row per tenant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantRecord {
    /// Surrogate key
    pub id: TenantId,
    /// Unique human-chosen key, immutable once created
    pub name: String,
    /// Derived resource names
    #[serde(flatten)]
    pub names: TenantResourceNames,
    /// Lifecycle stage
    pub status: TenantStatus,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_resource_names_from_tenant_name() {
        let names = TenantResourceNames::derive("acme");
        assert_eq!(names.realm_name, "freeflow-acme");
        assert_eq!(names.postgres_db, "freeflow_acme");
        assert_eq!(names.mongo_db, "freeflow_acme");
        assert_eq!(names.qdrant_collection, "freeflow_acme_vectors");
    }

    #[test]
    fn status_round_trips_through_storage_form() {
        for status in TenantStatus::ALL {
            assert_eq!(TenantStatus::parse_str(status.as_str()), Some(status));
        }
        assert_eq!(TenantStatus::parse_str("archived"), None);
    }

    #[test]
    fn tenant_id_parses_with_surrounding_whitespace() {
        let id = TenantId::new();
        let parsed: TenantId = format!(" {id} ").parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<TenantId>().is_err());
    }
}
