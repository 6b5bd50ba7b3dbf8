// # HTTP IPv4 Lookup
//
// This crate provides the external IPv4 source for the dynv6 updater.
//
// ## Purpose
//
// Hosts behind NAT cannot see their public IPv4 address on any local
// interface, so it is asked from a "what is my IP" service that answers
// with the caller's address as plain text.
//
// ## Trust Level: Untrusted
//
// The body is returned as-is (trimmed). Validation happens in
// `AddressSelector::validate_ipv4`, so an HTML error page or a rate-limit
// notice is rejected there instead of being published.

use async_trait::async_trait;
use dynv6_core::config::Ipv4LookupConfig;
use dynv6_core::traits::ExternalIpv4Source;
use dynv6_core::{Error, Result};
use std::time::Duration;

/// HTTP-based external IPv4 lookup
#[derive(Debug)]
pub struct HttpIpv4Source {
    /// URL to fetch the address from
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpv4Source {
    /// Create a new HTTP IPv4 source
    ///
    /// # Parameters
    ///
    /// - `url`: URL to fetch the address from (e.g., "https://api.ipify.org")
    /// - `timeout`: Request timeout
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// Create a source from the lookup section of the configuration
    pub fn from_config(config: &Ipv4LookupConfig) -> Result<Self> {
        config.validate()?;
        Self::new(config.url.clone(), Duration::from_secs(config.timeout_secs))
    }

    /// The configured lookup URL
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ExternalIpv4Source for HttpIpv4Source {
    async fn fetch_raw(&self) -> Result<String> {
        tracing::debug!("Fetching external IPv4 from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::transport(format!("IPv4 lookup request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::transport(format!(
                "IPv4 lookup service answered HTTP {}",
                response.status()
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| Error::transport(format!("Failed to read IPv4 lookup response: {}", e)))?;

        Ok(text.trim().to_string())
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}
