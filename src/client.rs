//! Connector management-API client
//!
//! Thin, uniform wrapper over the remote management REST endpoints. Every
//! operation resolves to the raw response body on 2xx and a `ClientError`
//! carrying the transport cause or the remote diagnostic otherwise, so all
//! callers share one recovery pattern.
//!
//! Read probes (`server_reachable`, `exists`) downgrade any failure to
//! `false`: the server being down or the connector being absent are normal
//! conditions, not errors.

use crate::config::ConnectSettings;
use crate::error::{ClientError, ClientResult, Result, WardenError};
use crate::sink_config::SinkConnectorConfig;
use reqwest::{Client, Response};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// Cap on in-memory response bodies from the management API
pub const MAX_RESPONSE_BYTES: usize = 10 * 1024 * 1024; // 10 MiB

/// Non-blocking client for the connector management REST API
#[derive(Debug, Clone)]
pub struct ConnectClient {
    http: Client,
    base_url: String,
}

impl ConnectClient {
    /// Create a new client from connection settings
    pub fn new(settings: &ConnectSettings) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(Duration::from_millis(settings.connection_timeout_ms))
            .timeout(Duration::from_millis(settings.request_timeout_ms))
            .build()
            .map_err(|e| WardenError::config(format!("failed to build HTTP client: {e}")))?;

        let base_url = settings.url.trim_end_matches('/').to_string();

        Ok(Self { http, base_url })
    }

    /// Base URL of the management API
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Read a response body, bounded by [`MAX_RESPONSE_BYTES`]
    async fn read_capped(mut response: Response) -> ClientResult<String> {
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > MAX_RESPONSE_BYTES {
                return Err(ClientError::ResponseTooLarge {
                    limit: MAX_RESPONSE_BYTES,
                });
            }
            body.extend_from_slice(&chunk);
        }
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    /// Resolve a response to its body on 2xx, or a rejection carrying the body
    async fn into_body(response: Response) -> ClientResult<String> {
        let status = response.status();
        let body = Self::read_capped(response).await?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(ClientError::rejected(status, body))
        }
    }

    async fn get(&self, path: &str) -> ClientResult<String> {
        let response = self.http.get(self.url(path)).send().await?;
        Self::into_body(response).await
    }

    /// Check whether the management API answers at all.
    ///
    /// Any transport failure or non-2xx response resolves to `false`; an
    /// absent server is an expected condition at startup, never an error.
    pub async fn server_reachable(&self) -> bool {
        match self.get("/").await {
            Ok(_) => true,
            Err(e) => {
                debug!(url = %self.base_url, error = %e, "management API not reachable");
                false
            }
        }
    }

    /// Check whether the named connector resource exists (404 ⇒ `false`)
    pub async fn exists(&self, name: &str) -> bool {
        match self.get(&format!("/connectors/{name}")).await {
            Ok(_) => true,
            Err(e) => {
                debug!(connector = name, error = %e, "connector does not exist");
                false
            }
        }
    }

    /// Fetch the connector's raw status document
    pub async fn status(&self, name: &str) -> ClientResult<String> {
        self.get(&format!("/connectors/{name}/status")).await
    }

    /// Fetch the connector's stored configuration document
    pub async fn config(&self, name: &str) -> ClientResult<String> {
        self.get(&format!("/connectors/{name}/config")).await
    }

    /// List all connectors known to the management API
    pub async fn list(&self) -> ClientResult<String> {
        self.get("/connectors").await
    }

    /// Create the connector from a synthesized configuration.
    ///
    /// On 4xx/5xx the remote body is embedded in the error so the caller
    /// sees the management API's own diagnostic. Idempotency is the
    /// orchestration layer's concern: callers check existence first.
    pub async fn create(&self, config: &SinkConnectorConfig) -> ClientResult<String> {
        let body = json!({ "config": config.as_map() });
        let response = self
            .http
            .post(self.url("/connectors"))
            .json(&body)
            .send()
            .await?;
        Self::into_body(response).await
    }

    /// Delete the named connector
    pub async fn delete(&self, name: &str) -> ClientResult<String> {
        let response = self
            .http
            .delete(self.url(&format!("/connectors/{name}")))
            .send()
            .await?;
        Self::into_body(response).await
    }

    /// Pause the named connector
    pub async fn pause(&self, name: &str) -> ClientResult<String> {
        let response = self
            .http
            .put(self.url(&format!("/connectors/{name}/pause")))
            .send()
            .await?;
        Self::into_body(response).await
    }

    /// Resume the named connector
    pub async fn resume(&self, name: &str) -> ClientResult<String> {
        let response = self
            .http
            .put(self.url(&format!("/connectors/{name}/resume")))
            .send()
            .await?;
        Self::into_body(response).await
    }

    /// Restart the named connector
    pub async fn restart(&self, name: &str) -> ClientResult<String> {
        let response = self
            .http
            .post(self.url(&format!("/connectors/{name}/restart")))
            .send()
            .await?;
        Self::into_body(response).await
    }
}
