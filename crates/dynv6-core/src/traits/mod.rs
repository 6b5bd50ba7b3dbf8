//! Core traits for the dynv6 updater
//!
//! This module defines the interfaces the core consumes from its outer
//! collaborators.
//!
//! - [`HttpClient`]: Issue a request against the dynv6 API, get status + JSON body
//! - [`InterfaceAddressSource`]: Enumerate raw IPv6 addresses of a network interface
//! - [`ExternalIpv4Source`]: Fetch the raw body of a "what is my IP" service

pub mod http_client;
pub mod ip_source;

pub use http_client::{ApiRequest, ApiResponse, HttpClient, HttpMethod};
pub use ip_source::{ExternalIpv4Source, InterfaceAddressSource};
