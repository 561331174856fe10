// ABOUTME: Keycloak admin REST client managing one identity realm per tenant
// ABOUTME: Password-grant admin token with caching, realm create from template, disable and delete
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FreeFlow Contributors

//! Keycloak identity driver
//!
//! Realms are created from a JSON template whose `realm`, `id`, `displayName`
//! and `displayNameHtml` fields are rewritten per tenant. Create tolerates
//! `409 Conflict`; disable and delete tolerate `404 Not Found`.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Method, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::{IdentityDriver, ResourceDriver};
use crate::config::ProvisioningConfig;
use crate::constants::defaults::TOKEN_EXPIRY_SKEW_SECS;
use crate::errors::{AppError, AppResult};

const SERVICE: &str = "Keycloak";

/// Keycloak admin client configuration
#[derive(Clone)]
pub struct KeycloakDriverConfig {
    /// Base URL without trailing slash
    pub base_url: String,
    /// Realm the admin token is requested from
    pub admin_realm: String,
    /// Admin client id
    pub client_id: String,
    /// Optional admin client secret
    pub client_secret: Option<String>,
    /// Admin user
    pub username: String,
    /// Admin password
    pub password: String,
    /// Realm template JSON file
    pub template_path: PathBuf,
    /// Per-request timeout
    pub timeout: Duration,
}

impl KeycloakDriverConfig {
    /// Extract the identity settings from the provisioning configuration
    #[must_use]
    pub fn from_config(config: &ProvisioningConfig) -> Self {
        Self {
            base_url: config.keycloak_base_url.trim_end_matches('/').to_owned(),
            admin_realm: config.keycloak_admin_realm.clone(),
            client_id: config.keycloak_admin_client_id.clone(),
            client_secret: config.keycloak_admin_client_secret.clone(),
            username: config.keycloak_admin_username.clone(),
            password: config.keycloak_admin_password.clone(),
            template_path: config.keycloak_realm_template_path.clone(),
            timeout: config.driver_timeout,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AccessToken {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: Instant,
}

/// Keycloak identity driver
pub struct KeycloakDriver {
    config: KeycloakDriverConfig,
    http_client: Client,
    token: RwLock<Option<CachedToken>>,
}

impl KeycloakDriver {
    /// Create a driver with its own HTTP client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn new(mut config: KeycloakDriverConfig) -> AppResult<Self> {
        config.base_url = config.base_url.trim_end_matches('/').to_owned();
        let http_client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            config,
            http_client,
            token: RwLock::new(None),
        })
    }

    /// Whether the realm exists
    ///
    /// # Errors
    ///
    /// Returns an error if the token or the request fails, or for any status
    /// other than 200 or 404
    pub async fn realm_exists(&self, realm_name: &str) -> AppResult<bool> {
        let response = self
            .admin_request(Method::GET, &realm_path(realm_name), None)
            .await?;

        match response.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(failure("realm lookup", status, response).await),
        }
    }

    /// Create a realm from a fully rendered representation
    ///
    /// # Errors
    ///
    /// Returns an error for any status other than 201, 204 or 409
    pub async fn create_realm(&self, representation: &Value) -> AppResult<()> {
        let response = self
            .admin_request(Method::POST, "/realms", Some(representation))
            .await?;

        match response.status() {
            StatusCode::CREATED | StatusCode::NO_CONTENT | StatusCode::CONFLICT => Ok(()),
            status => Err(failure("realm creation", status, response).await),
        }
    }

    /// Delete a realm
    ///
    /// # Errors
    ///
    /// Returns an error for any status other than 204 or 404
    pub async fn delete_realm(&self, realm_name: &str) -> AppResult<()> {
        let response = self
            .admin_request(Method::DELETE, &realm_path(realm_name), None)
            .await?;

        match response.status() {
            StatusCode::NO_CONTENT | StatusCode::NOT_FOUND => Ok(()),
            status => Err(failure("realm deletion", status, response).await),
        }
    }

    /// Set `enabled=false` on a realm
    ///
    /// # Errors
    ///
    /// Returns an error for any status other than 204 or 404
    pub async fn disable_realm(&self, realm_name: &str) -> AppResult<()> {
        let body = json!({ "enabled": false });
        let response = self
            .admin_request(Method::PUT, &realm_path(realm_name), Some(&body))
            .await?;

        match response.status() {
            StatusCode::NO_CONTENT | StatusCode::NOT_FOUND => Ok(()),
            status => Err(failure("realm disable", status, response).await),
        }
    }

    async fn load_template(&self) -> AppResult<Value> {
        let raw = tokio::fs::read_to_string(&self.config.template_path)
            .await
            .map_err(|e| {
                AppError::config(format!(
                    "Cannot read realm template {}: {e}",
                    self.config.template_path.display()
                ))
            })?;
        serde_json::from_str(&raw).map_err(|e| {
            AppError::config(format!(
                "Realm template {} is not valid JSON: {e}",
                self.config.template_path.display()
            ))
        })
    }

    async fn admin_request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> AppResult<Response> {
        let token = self.access_token().await?;
        let url = format!("{}/admin{path}", self.config.base_url);

        let mut request = self.http_client.request(method, &url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }

        request
            .send()
            .await
            .map_err(|e| AppError::external_service(SERVICE, e))
    }

    async fn access_token(&self) -> AppResult<String> {
        {
            let cached = self.token.read().await;
            if let Some(token) = cached.as_ref() {
                if Instant::now() < token.expires_at {
                    return Ok(token.token.clone());
                }
            }
        }

        let mut cached = self.token.write().await;
        // Another task may have refreshed while we waited for the lock
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.expires_at {
                return Ok(token.token.clone());
            }
        }

        let token_url = format!(
            "{}/realms/{}/protocol/openid-connect/token",
            self.config.base_url,
            urlencoding::encode(&self.config.admin_realm)
        );
        let mut form = vec![
            ("grant_type", "password"),
            ("client_id", self.config.client_id.as_str()),
            ("username", self.config.username.as_str()),
            ("password", self.config.password.as_str()),
        ];
        if let Some(secret) = self.config.client_secret.as_deref() {
            form.push(("client_secret", secret));
        }

        debug!(realm = %self.config.admin_realm, "Requesting Keycloak admin token");
        let response = self
            .http_client
            .post(&token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| AppError::external_service(SERVICE, e))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(failure("token request", status, response).await);
        }

        let token: AccessToken = response.json().await.map_err(|e| {
            AppError::external_service(SERVICE, format!("Invalid token response: {e}"))
        })?;

        let lifetime = token.expires_in.saturating_sub(TOKEN_EXPIRY_SKEW_SECS);
        *cached = Some(CachedToken {
            token: token.access_token.clone(),
            expires_at: Instant::now() + Duration::from_secs(lifetime),
        });

        Ok(token.access_token)
    }
}

#[async_trait]
impl ResourceDriver for KeycloakDriver {
    fn kind(&self) -> &'static str {
        SERVICE
    }

    async fn ensure(&self, name: &str) -> AppResult<()> {
        self.ensure_realm(name, name).await
    }

    async fn drop_resource(&self, name: &str) -> AppResult<()> {
        self.delete_realm(name).await
    }
}

#[async_trait]
impl IdentityDriver for KeycloakDriver {
    async fn ensure_realm(&self, name: &str, display_name: &str) -> AppResult<()> {
        if self.realm_exists(name).await? {
            debug!(realm = name, "Realm already exists");
            return Ok(());
        }

        let template = self.load_template().await?;
        let representation = render_realm_template(template, name, display_name)?;
        self.create_realm(&representation).await?;
        info!(realm = name, "Realm created");
        Ok(())
    }

    async fn disable(&self, name: &str) -> AppResult<()> {
        self.disable_realm(name).await
    }
}

/// Rewrite a realm template for one tenant
///
/// `id` is only rewritten when the template carries one.
///
/// # Errors
///
/// Returns a configuration error when the template is not a JSON object
pub fn render_realm_template(
    mut template: Value,
    realm_name: &str,
    display_name: &str,
) -> AppResult<Value> {
    let realm = template
        .as_object_mut()
        .ok_or_else(|| AppError::config("Realm template must be a JSON object"))?;

    realm.insert("realm".to_owned(), Value::from(realm_name));
    realm.insert("displayName".to_owned(), Value::from(display_name));
    realm.insert(
        "displayNameHtml".to_owned(),
        Value::from(format!(
            r#"<div class="kc-logo-text"><span>{display_name}</span></div>"#
        )),
    );
    if realm.contains_key("id") {
        realm.insert("id".to_owned(), Value::from(realm_name));
    }

    Ok(template)
}

fn realm_path(realm_name: &str) -> String {
    format!("/realms/{}", urlencoding::encode(realm_name))
}

async fn failure(action: &str, status: StatusCode, response: Response) -> AppError {
    let message = response.text().await.unwrap_or_default();
    AppError::external_service(
        SERVICE,
        format!("{action} failed: {} {message}", status.as_u16()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_template_fields() {
        let template = json!({
            "id": "freeflow",
            "realm": "freeflow",
            "enabled": true,
            "roles": { "realm": [] }
        });

        let rendered =
            render_realm_template(template, "freeflow-acme", "FreeFlow acme").unwrap();

        assert_eq!(rendered["id"], "freeflow-acme");
        assert_eq!(rendered["realm"], "freeflow-acme");
        assert_eq!(rendered["displayName"], "FreeFlow acme");
        assert_eq!(
            rendered["displayNameHtml"],
            r#"<div class="kc-logo-text"><span>FreeFlow acme</span></div>"#
        );
        assert_eq!(rendered["enabled"], true);
    }

    #[test]
    fn leaves_missing_id_absent() {
        let rendered = render_realm_template(json!({ "realm": "x" }), "freeflow-a1b", "d").unwrap();
        assert!(rendered.get("id").is_none());
    }

    #[test]
    fn rejects_non_object_templates() {
        assert!(render_realm_template(json!([1, 2]), "r", "d").is_err());
    }

    #[test]
    fn encodes_realm_path() {
        assert_eq!(realm_path("freeflow-acme"), "/realms/freeflow-acme");
        assert_eq!(realm_path("a b"), "/realms/a%20b");
    }
}
