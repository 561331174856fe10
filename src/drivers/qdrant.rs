// ABOUTME: Qdrant REST driver creating and dropping one vector collection per tenant
// ABOUTME: GET probes existence, PUT creates with size and distance, DELETE tolerates absence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FreeFlow Contributors

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use tracing::{debug, info};

use super::ResourceDriver;
use crate::config::VectorDistance;
use crate::errors::{AppError, AppResult};

const SERVICE: &str = "Qdrant";

#[derive(Debug, Serialize)]
struct VectorParams {
    size: u32,
    distance: VectorDistance,
}

#[derive(Debug, Serialize)]
struct CreateCollection {
    vectors: VectorParams,
}

/// Vector collection driver
pub struct QdrantDriver {
    base_url: String,
    vector_size: u32,
    distance: VectorDistance,
    http_client: Client,
}

impl QdrantDriver {
    /// Create a driver for the Qdrant instance at `base_url`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn new(
        base_url: &str,
        vector_size: u32,
        distance: VectorDistance,
        timeout: Duration,
    ) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            vector_size,
            distance,
            http_client,
        })
    }

    fn collection_url(&self, name: &str) -> String {
        format!("{}/collections/{}", self.base_url, urlencoding::encode(name))
    }
}

#[async_trait]
impl ResourceDriver for QdrantDriver {
    fn kind(&self) -> &'static str {
        SERVICE
    }

    async fn ensure(&self, name: &str) -> AppResult<()> {
        let url = self.collection_url(name);

        let probe = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::external_service(SERVICE, e))?;
        match probe.status() {
            StatusCode::OK => {
                debug!(collection = name, "Collection already exists");
                return Ok(());
            }
            StatusCode::NOT_FOUND => {}
            status => return Err(failure("check", status, probe).await),
        }

        let body = CreateCollection {
            vectors: VectorParams {
                size: self.vector_size,
                distance: self.distance,
            },
        };
        let response = self
            .http_client
            .put(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::external_service(SERVICE, e))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(failure("create", status, response).await);
        }
        info!(
            collection = name,
            size = self.vector_size,
            distance = %self.distance,
            "Collection created"
        );
        Ok(())
    }

    async fn drop_resource(&self, name: &str) -> AppResult<()> {
        let response = self
            .http_client
            .delete(self.collection_url(name))
            .send()
            .await
            .map_err(|e| AppError::external_service(SERVICE, e))?;

        match response.status() {
            StatusCode::OK | StatusCode::NOT_FOUND => Ok(()),
            status => Err(failure("delete", status, response).await),
        }
    }
}

async fn failure(action: &str, status: StatusCode, response: Response) -> AppError {
    let message = response.text().await.unwrap_or_default();
    AppError::external_service(
        SERVICE,
        format!("{action} failed: {} {message}", status.as_u16()),
    )
}
