//! Configuration types for the dynv6 updater
//!
//! This module defines all configuration structures used throughout the crate.

use crate::model::Hostname;
use serde::{Deserialize, Serialize};

/// Default dynv6 REST API base URL
pub const DEFAULT_API_BASE_URL: &str = "https://dynv6.com/api/v2";

/// Default external IPv4 lookup service (returns a plain-text address)
pub const DEFAULT_IPV4_LOOKUP_URL: &str = "https://api.ipify.org";

/// Default network interface providing global IPv6 addresses
pub const DEFAULT_INTERFACE: &str = "eth0";

/// Main updater configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dynv6Config {
    /// Hostname whose records are kept in sync
    pub hostname: String,

    /// Interface providing the global IPv6 address
    #[serde(default = "default_interface")]
    pub interface: String,

    /// dynv6 API settings
    pub api: ApiConfig,

    /// External IPv4 lookup settings
    #[serde(default)]
    pub ipv4_lookup: Ipv4LookupConfig,

    /// Optional engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl Dynv6Config {
    /// Create a configuration with defaults for everything but the hostname
    /// and token
    pub fn new(hostname: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            interface: default_interface(),
            api: ApiConfig::new(api_token),
            ipv4_lookup: Ipv4LookupConfig::default(),
            engine: EngineConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        Hostname::parse(&self.hostname)
            .map_err(|e| crate::Error::config(format!("Invalid hostname: {}", e)))?;

        if self.interface.trim().is_empty() {
            return Err(crate::Error::config("Interface name cannot be empty"));
        }

        self.api.validate()?;
        self.ipv4_lookup.validate()?;

        Ok(())
    }
}

/// dynv6 API configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API base URL
    #[serde(default = "default_api_base_url")]
    pub base_url: String,

    /// HTTP token from the dynv6 account
    /// ⚠️ NEVER log this value
    pub api_token: String,

    /// Per-call timeout in seconds
    #[serde(default = "default_api_timeout_secs")]
    pub timeout_secs: u64,
}

impl ApiConfig {
    /// Create an API configuration with the default base URL and timeout
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            base_url: default_api_base_url(),
            api_token: api_token.into(),
            timeout_secs: default_api_timeout_secs(),
        }
    }

    /// Validate the API configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.api_token.trim().is_empty() {
            return Err(crate::Error::config("dynv6 API token cannot be empty"));
        }
        validate_url("API base URL", &self.base_url)?;
        if self.timeout_secs == 0 {
            return Err(crate::Error::config("API timeout must be > 0"));
        }
        Ok(())
    }
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &"<REDACTED>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// External IPv4 lookup configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ipv4LookupConfig {
    /// URL returning the caller's public IPv4 address as plain text
    #[serde(default = "default_ipv4_lookup_url")]
    pub url: String,

    /// Request timeout in seconds
    #[serde(default = "default_ipv4_lookup_timeout_secs")]
    pub timeout_secs: u64,
}

impl Ipv4LookupConfig {
    /// Validate the lookup configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        validate_url("IPv4 lookup URL", &self.url)?;
        if self.timeout_secs == 0 {
            return Err(crate::Error::config("IPv4 lookup timeout must be > 0"));
        }
        Ok(())
    }
}

impl Default for Ipv4LookupConfig {
    fn default() -> Self {
        Self {
            url: default_ipv4_lookup_url(),
            timeout_secs: default_ipv4_lookup_timeout_secs(),
        }
    }
}

/// How an out-of-date auto-derived A record is updated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Ipv4Mode {
    /// Patch the zone's primary addresses; the A record keeps following them
    #[default]
    ZonePrimary,
    /// Patch the A record directly, overriding auto-derivation
    Manual,
}

/// Engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// IPv4 update strategy for auto-derived A records
    #[serde(default)]
    pub ipv4_mode: Ipv4Mode,

    /// Perform all lookups but log PATCH calls instead of sending them
    #[serde(default)]
    pub dry_run: bool,

    /// Reconcile every A and AAAA record under the hostname, not only the
    /// first of each type
    #[serde(default)]
    pub all_records: bool,
}

fn validate_url(what: &str, url: &str) -> Result<(), crate::Error> {
    if !url.starts_with("https://") && !url.starts_with("http://") {
        return Err(crate::Error::config(format!(
            "{} must use HTTP or HTTPS scheme. Got: {}",
            what, url
        )));
    }
    Ok(())
}

fn default_interface() -> String {
    DEFAULT_INTERFACE.to_string()
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_api_timeout_secs() -> u64 {
    30
}

fn default_ipv4_lookup_url() -> String {
    DEFAULT_IPV4_LOOKUP_URL.to_string()
}

fn default_ipv4_lookup_timeout_secs() -> u64 {
    10
}
