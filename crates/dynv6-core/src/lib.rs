// # dynv6-core
//
// Core library for the dynv6 dynamic DNS updater.
//
// ## Architecture Overview
//
// A run keeps the A and AAAA records of one hostname in sync with the
// host's current addresses:
// - **AddressSelector**: Picks the global IPv6 address and validates the external IPv4
// - **ZoneResolver**: Maps the hostname to its zone and records, with deep search
// - **interpret**: Tells explicit record values from auto-derived ones
// - **ReconciliationEngine**: Decides one update intent per address family
// - **UpdateExecutor**: Turns each intent into exactly one PATCH call
// - **Dynv6Engine**: Wires the above to the API client and address sources
//
// ## Design Principles
//
// 1. **Pure Core**: Selection, interpretation and planning perform no I/O
// 2. **Trait Seams**: HTTP and address sources are injected, so runs are testable offline
// 3. **Idempotency**: A run against up-to-date records issues no write calls
// 4. **Library-First**: The binary only parses arguments and prints the report

pub mod address;
pub mod config;
pub mod engine;
pub mod error;
pub mod executor;
pub mod interpret;
pub mod model;
pub mod resolver;
pub mod traits;

// Re-export core types for convenience
pub use address::{AddressSelector, LocalAddresses};
pub use config::{ApiConfig, Dynv6Config, EngineConfig, Ipv4LookupConfig, Ipv4Mode};
pub use engine::run::{Dynv6Engine, FamilyReport, RunReport};
pub use engine::{NoOpReason, ReconciliationEngine, UpdateIntent};
pub use error::{Error, Result};
pub use executor::{Outcome, UpdateExecutor};
pub use interpret::{RecordState, interpret};
pub use model::{Hostname, Record, RecordType, ResolvedTarget, Zone};
pub use resolver::{ResolvedPair, ZoneResolver};
pub use traits::{ApiRequest, ApiResponse, ExternalIpv4Source, HttpClient, HttpMethod, InterfaceAddressSource};
