// ABOUTME: Removal saga suspending (soft) or tearing down (hard) a tenant's resources
// ABOUTME: Includes the protected-tenant guard, the force requirement and cleanup by name prefix
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FreeFlow Contributors

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::naming::is_protected;
use super::saga::{SagaRunner, SagaStep};
use crate::constants::removal_steps::{
    FAILED, FINALIZE, KEYCLOAK_DELETE, KEYCLOAK_DISABLE, MONGO_DROP, POSTGRES_DROP, QDRANT_DROP,
    SOFT, STORAGE_REMOVE,
};
use crate::database::TenantRepository;
use crate::drivers::ResourceDrivers;
use crate::errors::{AppError, AppResult};
use crate::models::{LogStatus, TenantId, TenantRecord, TenantStatus};

/// How far a removal goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemovalMode {
    /// Suspend the tenant and disable its realm; data is kept
    #[default]
    Soft,
    /// Destroy every resource and the registry record
    Hard,
}

impl RemovalMode {
    /// Wire representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Soft => "soft",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for RemovalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RemovalMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "soft" => Ok(Self::Soft),
            "hard" => Ok(Self::Hard),
            other => Err(AppError::invalid_input(format!(
                "Unknown removal mode '{other}' (expected soft or hard)"
            ))),
        }
    }
}

/// A tenant cleanup could not remove
#[derive(Debug)]
pub struct CleanupFailure {
    /// Tenant as it was listed
    pub tenant: TenantRecord,
    /// Why its hard removal failed
    pub error: AppError,
}

/// Result of a cleanup by prefix
#[derive(Debug, Default)]
pub struct CleanupReport {
    /// Hard-removed tenants (pre-deletion snapshots)
    pub removed: Vec<TenantRecord>,
    /// Matching tenants left alone: active ones without `include_active`, and protected ones
    pub skipped: Vec<TenantRecord>,
    /// Tenants whose removal failed; they remain registered as `suspended`
    pub failed: Vec<CleanupFailure>,
}

impl CleanupReport {
    /// Whether every targeted tenant was removed
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    /// Number of tenants removal was attempted for
    #[must_use]
    pub fn targeted(&self) -> usize {
        self.removed.len() + self.failed.len()
    }
}

/// Runs the removal saga
pub struct TenantRemover {
    registry: Arc<dyn TenantRepository>,
    drivers: ResourceDrivers,
}

impl TenantRemover {
    /// Create a remover over a registry and a driver set
    #[must_use]
    pub fn new(registry: Arc<dyn TenantRepository>, drivers: ResourceDrivers) -> Self {
        Self { registry, drivers }
    }

    /// Remove tenant `tenant_id`
    ///
    /// Soft mode returns the suspended record, hard mode the record as it was
    /// before deletion.
    ///
    /// # Errors
    ///
    /// - `ResourceNotFound` for an unknown id
    /// - `PermissionDenied` for a protected tenant, whatever `force` says
    /// - `InvalidInput` for hard mode without `force`, before any change
    /// - the failing step's error once the tenant has been set back to `suspended`
    #[tracing::instrument(skip(self))]
    pub async fn remove(
        &self,
        tenant_id: TenantId,
        mode: RemovalMode,
        force: bool,
    ) -> AppResult<TenantRecord> {
        let tenant = self
            .registry
            .find_by_id(tenant_id)
            .await?
            .ok_or_else(|| AppError::not_found("Tenant", tenant_id))?;

        if is_protected(&tenant.name) {
            return Err(AppError::permission_denied(
                "Protected tenant cannot be removed.",
            ));
        }

        match mode {
            RemovalMode::Soft => self.suspend(tenant).await,
            RemovalMode::Hard if !force => Err(AppError::invalid_input(
                "force=true is required for hard delete.",
            )),
            RemovalMode::Hard => self.tear_down(tenant).await,
        }
    }

    async fn suspend(&self, tenant: TenantRecord) -> AppResult<TenantRecord> {
        let runner = SagaRunner::new(self.registry.as_ref(), tenant.id);
        runner
            .log(SOFT, LogStatus::Started, Some("Soft delete requested."))
            .await?;

        let result: AppResult<TenantRecord> = async {
            let suspended = self
                .registry
                .update_status(tenant.id, TenantStatus::Suspended)
                .await?;
            self.drivers.identity.disable(&tenant.names.realm_name).await?;
            runner.log(SOFT, LogStatus::Succeeded, None).await?;
            Ok(suspended)
        }
        .await;

        match &result {
            Ok(_) => info!(tenant_name = %tenant.name, "Tenant suspended"),
            Err(error) => {
                warn!(tenant_name = %tenant.name, error = %error, "Soft removal failed");
                runner.log_failure(SOFT, error).await;
            }
        }
        result
    }

    async fn tear_down(&self, tenant: TenantRecord) -> AppResult<TenantRecord> {
        self.registry
            .update_status(tenant.id, TenantStatus::Deleting)
            .await?;

        // Teardown steps are best-effort and run once; re-invoking is safe
        let runner = SagaRunner::new(self.registry.as_ref(), tenant.id);
        let steps = self.teardown_steps(&tenant);

        let result: AppResult<()> = async {
            runner.run(&steps).await.map_err(|failure| failure.error)?;
            runner
                .log(FINALIZE, LogStatus::Succeeded, Some("Hard delete completed."))
                .await?;
            self.registry.delete_by_id(tenant.id).await?;
            Ok(())
        }
        .await;

        match result {
            Ok(()) => {
                info!(tenant_name = %tenant.name, "Tenant deleted");
                Ok(tenant)
            }
            Err(failure) => {
                error!(tenant_name = %tenant.name, error = %failure, "Hard removal failed");
                if let Err(status_error) = self
                    .registry
                    .update_status(tenant.id, TenantStatus::Suspended)
                    .await
                {
                    error!(error = %status_error, "Failed to suspend tenant");
                }
                runner.log_failure(FAILED, &failure).await;
                Err(failure)
            }
        }
    }

    fn teardown_steps(&self, tenant: &TenantRecord) -> Vec<SagaStep> {
        let names = &tenant.names;
        let drivers = &self.drivers;

        let identity = Arc::clone(&drivers.identity);
        let realm = names.realm_name.clone();
        let disable = SagaStep::new(KEYCLOAK_DISABLE, move || {
            let identity = Arc::clone(&identity);
            let realm = realm.clone();
            async move { identity.disable(&realm).await }
        });

        vec![
            disable,
            SagaStep::drop_resource(KEYCLOAK_DELETE, &drivers.identity, &names.realm_name),
            SagaStep::drop_resource(POSTGRES_DROP, &drivers.relational, &names.postgres_db),
            SagaStep::drop_resource(MONGO_DROP, &drivers.document, &names.mongo_db),
            SagaStep::drop_resource(QDRANT_DROP, &drivers.vector, &names.qdrant_collection),
            SagaStep::drop_resource(STORAGE_REMOVE, &drivers.storage, &tenant.name),
        ]
    }

    /// Hard-remove every tenant whose name starts with `prefix`
    ///
    /// Active tenants are skipped unless `include_active`; protected tenants
    /// are always skipped. A failed removal does not stop the others.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an empty prefix, or a registry error if
    /// tenants cannot be listed
    #[tracing::instrument(skip(self))]
    pub async fn cleanup(&self, prefix: &str, include_active: bool) -> AppResult<CleanupReport> {
        if prefix.is_empty() {
            return Err(AppError::invalid_input("Cleanup prefix must not be empty."));
        }

        let tenants = self.registry.list_by_name_prefix(prefix).await?;
        let mut report = CleanupReport::default();

        for tenant in tenants {
            if is_protected(&tenant.name)
                || (tenant.status == TenantStatus::Active && !include_active)
            {
                report.skipped.push(tenant);
                continue;
            }

            info!(tenant_name = %tenant.name, tenant_id = %tenant.id, "Removing tenant");
            match self.remove(tenant.id, RemovalMode::Hard, true).await {
                Ok(removed) => report.removed.push(removed),
                Err(error) => {
                    warn!(tenant_name = %tenant.name, error = %error, "Cleanup removal failed");
                    report.failed.push(CleanupFailure { tenant, error });
                }
            }
        }

        Ok(report)
    }
}
