// # dynv6 REST API Client
//
// This crate provides the reqwest-based `HttpClient` used by the dynv6
// updater to talk to the dynv6 REST API v2.
//
// The client is a thin transport: it attaches the bearer token, sends
// one request, and hands back the status code and JSON body. Status
// interpretation (auth failures, rejected updates) happens in
// `dynv6-core`.
//
// - ❌ NO retry logic (every failure is reported once)
// - ❌ NO caching (zones and records are fetched fresh each run)
//
// ## Security Requirements
//
// - API token NEVER appears in logs or Debug output
// - Client MUST fail fast if token is empty
//
// ## API Reference
//
// - dynv6 REST API: https://dynv6.com/docs/apis
// - List Zones: GET `/zones`
// - List Records: GET `/zones/:zone_id/records`
// - Update Zone: PATCH `/zones/:zone_id`
// - Update Record: PATCH `/zones/:zone_id/records/:record_id`

use async_trait::async_trait;
use dynv6_core::config::ApiConfig;
use dynv6_core::traits::{ApiRequest, ApiResponse, HttpClient, HttpMethod};
use dynv6_core::{Error, Result};
use serde_json::Value;
use std::time::Duration;

/// dynv6 API client
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the API token.
pub struct Dynv6Client {
    /// HTTP token from the dynv6 account
    /// ⚠️ NEVER log this value
    api_token: String,

    /// API base URL without trailing slash
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for Dynv6Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dynv6Client")
            .field("api_token", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Dynv6Client {
    /// Create a new dynv6 API client
    ///
    /// # Parameters
    ///
    /// - `api_token`: HTTP token from the dynv6 account
    /// - `base_url`: API base URL (e.g. `https://dynv6.com/api/v2`)
    /// - `timeout`: Per-request timeout
    ///
    /// # Security
    ///
    /// The API token will NEVER be logged or displayed in error messages.
    pub fn new(
        api_token: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let api_token = api_token.into();

        if api_token.trim().is_empty() {
            return Err(Error::config("dynv6 API token cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_token,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Create a client from the API section of the configuration
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        config.validate()?;
        Self::new(
            config.api_token.clone(),
            config.base_url.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl HttpClient for Dynv6Client {
    /// Send one request to the dynv6 API
    ///
    /// # Returns
    ///
    /// - `Ok(ApiResponse)`: Any HTTP response, including non-2xx statuses
    /// - `Err(Error::Transport)`: Connection, TLS, timeout or body read failure
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = self.url_for(&request.path);
        tracing::debug!("{} {}", request.method, url);

        let builder = match request.method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Patch => self.client.patch(&url),
        };

        let builder = builder
            .bearer_auth(&self.api_token)
            .header("Accept", "application/json");

        let builder = match &request.body {
            Some(body) => builder.json(body),
            None => builder,
        };

        let response = builder
            .send()
            .await
            .map_err(|e| Error::transport(format!("{} {} failed: {}", request.method, request.path, e)))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| Error::transport(format!("Failed to read response body: {}", e)))?;

        if !(200..300).contains(&status) {
            tracing::warn!(
                "dynv6 API answered {} {} with HTTP {}",
                request.method,
                request.path,
                status
            );
        }

        Ok(ApiResponse {
            status,
            body: decode_body(&text),
        })
    }

    fn client_name(&self) -> &'static str {
        "dynv6"
    }
}

/// Parse a response body as JSON; empty bodies become `Null` and
/// non-JSON bodies are kept as a string
fn decode_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
