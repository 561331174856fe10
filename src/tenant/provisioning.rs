// ABOUTME: Provisioning saga creating a tenant's realm, databases, collection and storage
// ABOUTME: Registry upsert, connection records, retried ordered steps, suspension and optional rollback
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FreeFlow Contributors

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use tracing::{error, info, warn};

use super::naming::validate_tenant_name;
use super::saga::{SagaRunner, SagaStep, StepFailure};
use crate::config::ProvisioningConfig;
use crate::constants::provisioning_steps::{
    FINALIZE, INITIALIZE, KEYCLOAK, MIGRATIONS, MONGO, POSTGRES, QDRANT, STORAGE,
};
use crate::constants::tenant_names::DISPLAY_PREFIX;
use crate::database::TenantRepository;
use crate::drivers::ResourceDrivers;
use crate::errors::{AppError, AppResult};
use crate::models::{
    ConnectionDetails, LogStatus, NewTenant, ResourceKind, TenantId, TenantRecord,
    TenantResourceNames, TenantStatus,
};
use crate::utils::url::{connection_details_from_url, tenant_database_url};

const CONNECTIONS: &str = "connections";

/// A fully provisioned tenant
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisioningOutcome {
    /// Registry record, now `active`
    pub tenant: TenantRecord,
    /// Connection string of the tenant's relational database
    pub relational_database_url: String,
}

/// Runs the provisioning saga
pub struct TenantProvisioner {
    registry: Arc<dyn TenantRepository>,
    drivers: ResourceDrivers,
    config: ProvisioningConfig,
}

impl TenantProvisioner {
    /// Create a provisioner over a registry and a driver set
    #[must_use]
    pub fn new(
        registry: Arc<dyn TenantRepository>,
        drivers: ResourceDrivers,
        config: ProvisioningConfig,
    ) -> Self {
        Self {
            registry,
            drivers,
            config,
        }
    }

    /// Provision tenant `name`, or resume a previous attempt for the same name
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for a malformed name, before anything is written
    /// - `ConfigError` when an admin URL cannot be parsed, before anything is written
    /// - the failing step's error once the tenant has been suspended (and
    ///   rolled back when enabled)
    #[tracing::instrument(skip(self))]
    pub async fn provision(&self, name: &str) -> AppResult<ProvisioningOutcome> {
        validate_tenant_name(name)?;

        let new_tenant = NewTenant::for_name(name);
        let relational_database_url =
            tenant_database_url(&self.config.postgres_admin_url, &new_tenant.names.postgres_db)?;
        let connections = self.connection_plan(&new_tenant.names)?;

        let mut tenant = self.registry.create(&new_tenant).await?;
        if tenant.status != TenantStatus::Provisioning {
            tenant = self
                .registry
                .update_status(tenant.id, TenantStatus::Provisioning)
                .await?;
        }
        info!(tenant_id = %tenant.id, "Starting tenant provisioning");

        let runner = SagaRunner::new(self.registry.as_ref(), tenant.id)
            .with_retry(self.config.retry_policy());
        let steps = self.build_steps(&tenant, &relational_database_url);

        let result: Result<TenantRecord, StepFailure> = async {
            runner
                .log(INITIALIZE, LogStatus::Started, Some("Starting tenant provisioning."))
                .await
                .map_err(|error| StepFailure {
                    step: INITIALIZE,
                    ran: 0,
                    error,
                })?;
            self.record_connections(tenant.id, &connections)
                .await
                .map_err(|error| StepFailure {
                    step: CONNECTIONS,
                    ran: 0,
                    error,
                })?;

            runner.run(&steps).await?;

            self.finalize(&runner, tenant.id)
                .await
                .map_err(|error| StepFailure {
                    step: FINALIZE,
                    ran: steps.len(),
                    error,
                })
        }
        .await;

        match result {
            Ok(tenant) => {
                info!(tenant_id = %tenant.id, "Tenant provisioning completed");
                Ok(ProvisioningOutcome {
                    tenant,
                    relational_database_url,
                })
            }
            Err(failure) => Err(self.fail(&runner, tenant.id, &steps, failure).await),
        }
    }

    async fn finalize(&self, runner: &SagaRunner<'_>, tenant_id: TenantId) -> AppResult<TenantRecord> {
        self.registry
            .update_status(tenant_id, TenantStatus::Active)
            .await?;
        runner
            .log(FINALIZE, LogStatus::Succeeded, Some("Tenant provisioning completed."))
            .await?;
        self.registry
            .find_by_id(tenant_id)
            .await?
            .ok_or_else(|| AppError::not_found("Tenant", tenant_id))
    }

    async fn fail(
        &self,
        runner: &SagaRunner<'_>,
        tenant_id: TenantId,
        steps: &[SagaStep],
        failure: StepFailure,
    ) -> AppError {
        error!(
            tenant_id = %tenant_id,
            step = failure.step,
            error = %failure.error,
            "Tenant provisioning failed"
        );

        if let Err(status_error) = self
            .registry
            .update_status(tenant_id, TenantStatus::Suspended)
            .await
        {
            error!(tenant_id = %tenant_id, error = %status_error, "Failed to suspend tenant");
        }
        runner.log_failure(FINALIZE, &failure.error).await;

        if self.config.rollback_on_failure {
            let report = runner.rollback(steps, failure.ran).await;
            if report.failed.is_empty() {
                info!(tenant_id = %tenant_id, rolled_back = ?report.attempted, "Rollback completed");
            } else {
                warn!(
                    tenant_id = %tenant_id,
                    rolled_back = ?report.attempted,
                    failed = ?report.failed,
                    "Rollback incomplete"
                );
            }
        }

        failure.error
    }

    /// Coordinates recorded for each resource kind, derived from the admin URLs
    fn connection_plan(
        &self,
        names: &TenantResourceNames,
    ) -> AppResult<Vec<(ResourceKind, ConnectionDetails)>> {
        let config = &self.config;

        let mut qdrant = connection_details_from_url(
            ResourceKind::Qdrant,
            &config.qdrant_url,
            &names.qdrant_collection,
        )?;
        qdrant.username = None;
        qdrant.options = Some(json!({
            "vectorSize": config.qdrant_vector_size,
            "distance": config.qdrant_distance,
        }));

        Ok(vec![
            (
                ResourceKind::Keycloak,
                connection_details_from_url(
                    ResourceKind::Keycloak,
                    &config.keycloak_base_url,
                    &names.realm_name,
                )?,
            ),
            (
                ResourceKind::Postgres,
                connection_details_from_url(
                    ResourceKind::Postgres,
                    &config.postgres_admin_url,
                    &names.postgres_db,
                )?,
            ),
            (
                ResourceKind::Mongodb,
                connection_details_from_url(
                    ResourceKind::Mongodb,
                    &config.mongo_admin_uri,
                    &names.mongo_db,
                )?,
            ),
            (ResourceKind::Qdrant, qdrant),
        ])
    }

    async fn record_connections(
        &self,
        tenant_id: TenantId,
        connections: &[(ResourceKind, ConnectionDetails)],
    ) -> AppResult<()> {
        for (kind, details) in connections {
            self.registry
                .upsert_connection(tenant_id, *kind, details)
                .await?;
        }
        Ok(())
    }

    fn build_steps(&self, tenant: &TenantRecord, relational_database_url: &str) -> Vec<SagaStep> {
        let names = &tenant.names;
        let drivers = &self.drivers;

        let identity = Arc::clone(&drivers.identity);
        let realm = names.realm_name.clone();
        let display_name = format!("{DISPLAY_PREFIX} {}", tenant.name);
        let keycloak = SagaStep::new(KEYCLOAK, move || {
            let identity = Arc::clone(&identity);
            let realm = realm.clone();
            let display_name = display_name.clone();
            async move { identity.ensure_realm(&realm, &display_name).await }
        })
        .with_rollback({
            let identity = Arc::clone(&drivers.identity);
            let realm = names.realm_name.clone();
            move || {
                let identity = Arc::clone(&identity);
                let realm = realm.clone();
                async move { identity.drop_resource(&realm).await }
            }
        });

        let relational = Arc::clone(&drivers.relational);
        let url = relational_database_url.to_owned();
        let migrations = SagaStep::new(MIGRATIONS, move || {
            let relational = Arc::clone(&relational);
            let url = url.clone();
            async move { relational.run_migrations(&url).await }
        });

        vec![
            keycloak,
            SagaStep::ensure_resource(POSTGRES, &drivers.relational, &names.postgres_db),
            SagaStep::ensure_resource(MONGO, &drivers.document, &names.mongo_db),
            SagaStep::ensure_resource(QDRANT, &drivers.vector, &names.qdrant_collection),
            migrations,
            SagaStep::ensure_resource(STORAGE, &drivers.storage, &tenant.name),
        ]
    }
}
