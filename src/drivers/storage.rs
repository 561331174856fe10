// ABOUTME: Tenant file storage driver managing one directory per tenant
// ABOUTME: Directories live under a configured root; names are reduced to a single safe path component
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FreeFlow Contributors

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tracing::info;

use super::ResourceDriver;
use crate::errors::{AppError, AppResult};

/// File storage driver
pub struct StorageDriver {
    root: PathBuf,
}

impl StorageDriver {
    /// Create a driver rooted at `root`
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory owned by tenant `name`
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` unless `name` is exactly one normal path component
    pub fn tenant_dir(&self, name: &str) -> AppResult<PathBuf> {
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(part)), None) if part == name => Ok(self.root.join(part)),
            _ => Err(AppError::invalid_input(format!(
                "Storage name '{}' is not a single path component",
                name.escape_default()
            ))),
        }
    }
}

#[async_trait]
impl ResourceDriver for StorageDriver {
    fn kind(&self) -> &'static str {
        "Storage"
    }

    async fn ensure(&self, name: &str) -> AppResult<()> {
        let dir = self.tenant_dir(name)?;
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            AppError::internal(format!("Failed to create {}: {e}", dir.display())).with_source(e)
        })?;
        info!(path = %dir.display(), "Tenant storage ready");
        Ok(())
    }

    async fn drop_resource(&self, name: &str) -> AppResult<()> {
        let dir = self.tenant_dir(name)?;
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => {
                info!(path = %dir.display(), "Tenant storage removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::internal(format!(
                "Failed to remove {}: {e}",
                dir.display()
            ))
            .with_source(e)),
        }
    }
}
