// ABOUTME: Service context wiring the registry and the real resource drivers from configuration
// ABOUTME: Hands out provisioners and removers sharing one registry handle and driver set
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FreeFlow Contributors

use std::sync::Arc;

use tracing::info;

use crate::config::ProvisioningConfig;
use crate::database::{TenantRepository, TenantRepositoryImpl};
use crate::database_plugins::factory::Database;
use crate::drivers::{
    KeycloakDriver, KeycloakDriverConfig, MongoDriver, PostgresDriver, QdrantDriver,
    ResourceDrivers, StorageDriver,
};
use crate::errors::AppResult;
use crate::tenant::{TenantProvisioner, TenantRemover};

/// Dependencies shared by both sagas
#[derive(Clone)]
pub struct ProvisioningContext {
    /// Tenant registry
    pub registry: Arc<dyn TenantRepository>,
    /// Resource drivers
    pub drivers: ResourceDrivers,
    /// Loaded configuration
    pub config: ProvisioningConfig,
}

impl ProvisioningContext {
    /// Assemble a context from already-built parts
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

    /// Connect to the registry and build the real drivers
    ///
    /// # Errors
    ///
    /// Returns an error if the registry cannot be reached or migrated, or a
    /// driver cannot be constructed
    pub async fn from_config(config: ProvisioningConfig) -> AppResult<Self> {
        let database = Database::new(&config.master_database_url).await?;
        info!(backend = database.backend_info(), "Tenant registry ready");

        let registry: Arc<dyn TenantRepository> = Arc::new(TenantRepositoryImpl::new(database));
        let drivers = build_drivers(&config)?;
        Ok(Self::new(registry, drivers, config))
    }

    /// Provisioning saga over this context
    #[must_use]
    pub fn provisioner(&self) -> TenantProvisioner {
        TenantProvisioner::new(
            Arc::clone(&self.registry),
            self.drivers.clone(),
            self.config.clone(),
        )
    }

    /// Removal saga over this context
    #[must_use]
    pub fn remover(&self) -> TenantRemover {
        TenantRemover::new(Arc::clone(&self.registry), self.drivers.clone())
    }
}

/// Drivers for the systems named in `config`
///
/// # Errors
///
/// Returns an error if an HTTP client cannot be built
pub fn build_drivers(config: &ProvisioningConfig) -> AppResult<ResourceDrivers> {
    let timeout = config.driver_timeout;

    Ok(ResourceDrivers {
        identity: Arc::new(KeycloakDriver::new(KeycloakDriverConfig::from_config(
            config,
        ))?),
        relational: Arc::new(PostgresDriver::new(
            config.postgres_admin_url.clone(),
            config.tenant_migrations_dir.clone(),
            timeout,
        )),
        document: Arc::new(MongoDriver::new(config.mongo_admin_uri.clone(), timeout)),
        vector: Arc::new(QdrantDriver::new(
            &config.qdrant_url,
            config.qdrant_vector_size,
            config.qdrant_distance,
            timeout,
        )?),
        storage: Arc::new(StorageDriver::new(config.storage_root.clone())),
    })
}
