// # Address Source Traits
//
// Defines the interfaces for the two local-address collaborators:
//
// - Interface enumeration: `dynv6-ip-netlink` crate (Linux rtnetlink)
// - External IPv4 lookup: `dynv6-ip-http` crate
//
// Both return raw, untrusted strings. Parsing and scope filtering happen in
// `AddressSelector`.

use async_trait::async_trait;

/// Trait for network interface address enumeration
///
/// # Trust Level: Semi-Trusted
///
/// Sources perform platform-specific I/O only. They must not filter by
/// scope or pick an address; the core does that.
#[async_trait]
pub trait InterfaceAddressSource: Send + Sync {
    /// List the IPv6 addresses of `interface`, in the order the OS reports them
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<String>)`: Raw address strings (possibly with a `%scope` suffix)
    /// - `Err(Error)`: If the interface does not exist or cannot be queried
    async fn ipv6_candidates(&self, interface: &str) -> Result<Vec<String>, crate::Error>;

    /// Get the source name (for logging/debugging)
    fn source_name(&self) -> &'static str;
}

/// Trait for external IPv4 lookup services
///
/// # Trust Level: Untrusted
///
/// The body comes from a third-party service and is validated by
/// [`AddressSelector::validate_ipv4`](crate::address::AddressSelector::validate_ipv4).
#[async_trait]
pub trait ExternalIpv4Source: Send + Sync {
    /// Fetch the raw text body of the lookup service
    async fn fetch_raw(&self) -> Result<String, crate::Error>;

    /// Get the source name (for logging/debugging)
    fn source_name(&self) -> &'static str;
}
