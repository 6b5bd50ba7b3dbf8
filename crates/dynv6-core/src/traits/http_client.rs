// # HTTP Client Trait
//
// Defines the capability the core uses to talk to the dynv6 REST API.
//
// ## Implementations
//
// - reqwest-based: `dynv6-api` crate
// - Scripted mock: `tests/common` in this crate
//
// ## Usage
//
// ```rust,ignore
// use dynv6_core::traits::{ApiRequest, HttpClient};
//
// let response = client.send(ApiRequest::get("/zones")).await?;
// if response.status == 200 {
//     println!("{}", response.body);
// }
// ```

use async_trait::async_trait;
use std::fmt;

/// HTTP method used by the updater
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Patch,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => f.write_str("GET"),
            HttpMethod::Patch => f.write_str("PATCH"),
        }
    }
}

/// A request against the dynv6 API
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Path relative to the API base URL, starting with `/`
    pub path: String,
    /// JSON body (PATCH only)
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    /// Build a GET request
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            path: path.into(),
            body: None,
        }
    }

    /// Build a PATCH request with a JSON body
    pub fn patch(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: HttpMethod::Patch,
            path: path.into(),
            body: Some(body),
        }
    }
}

/// Response to an [`ApiRequest`]
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Parsed JSON body; `Null` when the body was empty
    pub body: serde_json::Value,
}

impl ApiResponse {
    /// Whether the call succeeded (dynv6 answers 200 on success)
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Trait for HTTP client implementations
///
/// Implementations own the credential and attach
/// `Authorization: Bearer <token>` and `Accept: application/json` to
/// every request.
///
/// # Single-shot
///
/// One call to [`HttpClient::send`] issues exactly one HTTP request. No
/// retries, no caching: a transport failure is returned as
/// [`Error::Transport`](crate::Error::Transport) and the caller decides what
/// to do with it.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Issue a request and return its status and JSON body
    ///
    /// Non-200 statuses are NOT errors at this level; they are returned in
    /// [`ApiResponse::status`] for the caller to interpret.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, crate::Error>;

    /// Get the client name (for logging/debugging)
    fn client_name(&self) -> &'static str;
}
