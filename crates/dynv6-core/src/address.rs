//! Local address selection
//!
//! Turns raw, untrusted address strings from the outer collaborators into
//! the typed [`LocalAddresses`] the reconciliation engine compares against.
//! Each stage produces a new value: raw candidate, parsed address, selected
//! address.

use crate::error::{Error, Result};
use std::net::{Ipv4Addr, Ipv6Addr};
use tracing::debug;

/// The locally observed addresses for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalAddresses {
    /// External IPv4 address, or the reason it could not be validated
    pub ipv4: std::result::Result<Ipv4Addr, String>,
    /// First global-scope IPv6 address of the interface
    pub ipv6: Option<Ipv6Addr>,
}

/// Picks the local addresses from collaborator output
pub struct AddressSelector;

impl AddressSelector {
    /// Return the first candidate that parses as a global-scope IPv6 address
    ///
    /// Candidates that fail to parse are skipped. A `%scope` suffix, as
    /// reported for link-local addresses, is ignored.
    pub fn select_global_ipv6<S: AsRef<str>>(candidates: &[S]) -> Option<Ipv6Addr> {
        candidates.iter().find_map(|raw_candidate| {
            let raw_candidate = raw_candidate.as_ref();
            let without_scope = raw_candidate.split('%').next().unwrap_or(raw_candidate);

            match without_scope.trim().parse::<Ipv6Addr>() {
                Ok(parsed) if is_global_ipv6(&parsed) => Some(parsed),
                Ok(parsed) => {
                    debug!("Skipping non-global IPv6 candidate {}", parsed);
                    None
                }
                Err(_) => {
                    debug!("Skipping malformed IPv6 candidate '{}'", raw_candidate);
                    None
                }
            }
        })
    }

    /// Strict dotted-quad parse of an external IPv4 address
    pub fn validate_ipv4(raw: &str) -> Result<Ipv4Addr> {
        raw.trim().parse::<Ipv4Addr>()
            .map_err(|_| Error::parse(format!("Invalid IPv4 address: '{}'", raw)))
    }
}

/// Whether an IPv6 address is globally routable unicast
///
/// Excludes unspecified, loopback, multicast, IPv4-mapped, link-local
/// (`fe80::/10`), site-local (`fec0::/10`) and unique-local (`fc00::/7`).
pub fn is_global_ipv6(addr: &Ipv6Addr) -> bool {
    let first = addr.segments()[0];

    !(addr.is_unspecified()
        || addr.is_loopback()
        || addr.is_multicast()
        || addr.to_ipv4_mapped().is_some()
        || (first & 0xffc0) == 0xfe80
        || (first & 0xffc0) == 0xfec0
        || (first & 0xfe00) == 0xfc00)
}
