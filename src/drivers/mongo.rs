// ABOUTME: MongoDB driver creating and dropping one document database per tenant
// ABOUTME: A database is materialized by creating a healthcheck collection in it
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FreeFlow Contributors

use std::time::Duration;

use async_trait::async_trait;
use mongodb::options::ClientOptions;
use mongodb::Client;
use tracing::{debug, info};

use super::{sanitize_identifier, ResourceDriver};
use crate::constants::defaults::MONGO_HEALTHCHECK_COLLECTION;
use crate::errors::{AppError, AppResult};

const SERVICE: &str = "MongoDB";

/// Document database driver
pub struct MongoDriver {
    admin_uri: String,
    timeout: Duration,
}

impl MongoDriver {
    /// Create a driver for the deployment reached by `admin_uri`
    #[must_use]
    pub const fn new(admin_uri: String, timeout: Duration) -> Self {
        Self { admin_uri, timeout }
    }

    async fn client(&self) -> AppResult<Client> {
        let mut options = ClientOptions::parse(&self.admin_uri)
            .await
            .map_err(|e| AppError::external_service(SERVICE, e))?;
        options.server_selection_timeout = Some(self.timeout);
        options.connect_timeout = Some(self.timeout);
        options.app_name = Some("freeflow-tenants".to_owned());

        Client::with_options(options).map_err(|e| AppError::external_service(SERVICE, e))
    }
}

#[async_trait]
impl ResourceDriver for MongoDriver {
    fn kind(&self) -> &'static str {
        SERVICE
    }

    async fn ensure(&self, name: &str) -> AppResult<()> {
        let name = sanitize_identifier(name)?;
        let client = self.client().await?;

        let existing = client
            .list_database_names()
            .await
            .map_err(|e| AppError::external_service(SERVICE, e))?;
        if existing.iter().any(|db| *db == name) {
            debug!(database = %name, "Document database already exists");
            return Ok(());
        }

        client
            .database(&name)
            .create_collection(MONGO_HEALTHCHECK_COLLECTION)
            .await
            .map_err(|e| AppError::external_service(SERVICE, e))?;
        info!(database = %name, "Document database created");
        Ok(())
    }

    async fn drop_resource(&self, name: &str) -> AppResult<()> {
        let name = sanitize_identifier(name)?;
        let client = self.client().await?;

        // Dropping a missing database is a no-op on the server
        client
            .database(&name)
            .drop()
            .await
            .map_err(|e| AppError::external_service(SERVICE, e))?;
        info!(database = %name, "Document database dropped");
        Ok(())
    }
}
