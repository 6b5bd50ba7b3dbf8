//! One-shot reconciliation run
//!
//! [`Dynv6Engine`] wires the collaborators to the core:
//!
//! 1. Resolve the AAAA and A records of the hostname (`GET /zones`, `GET /zones/{id}/records`)
//! 2. Observe the local addresses (interface IPv6 candidates, external IPv4)
//! 3. Plan one intent per family
//! 4. Execute the actionable intents, one PATCH each
//!
//! With `all_records` set, further A and AAAA records sharing the record
//! name are planned and executed after the two primary ones. An update
//! identical to one already sent in the run is skipped.
//!
//! Only a failure to list zones or records aborts the run. Everything else
//! is reported per family and the run continues.

use crate::address::{AddressSelector, LocalAddresses};
use crate::config::Dynv6Config;
use crate::engine::{NoOpReason, ReconciliationEngine, UpdateIntent};
use crate::error::{Error, Result};
use crate::executor::{Outcome, UpdateExecutor};
use crate::model::{Hostname, RecordType};
use crate::resolver::{ResolvedPair, ZoneResolver};
use crate::traits::{ExternalIpv4Source, HttpClient, InterfaceAddressSource};
use std::fmt;
use tracing::{debug, info, warn};

/// What happened to one address family
#[derive(Debug)]
pub enum FamilyReport {
    /// No call was needed
    Skipped {
        record_type: RecordType,
        reason: NoOpReason,
    },

    /// The update call was accepted (or logged, in dry-run mode)
    Updated {
        record_type: RecordType,
        outcome: Outcome,
    },

    /// The update call was rejected or could not complete
    Failed {
        record_type: RecordType,
        error: Error,
    },

    /// No zone or record of this type exists for the hostname
    Unresolved {
        record_type: RecordType,
        error: Error,
    },
}

impl FamilyReport {
    /// The address family this report is about
    pub fn record_type(&self) -> RecordType {
        match self {
            FamilyReport::Skipped { record_type, .. }
            | FamilyReport::Updated { record_type, .. }
            | FamilyReport::Failed { record_type, .. }
            | FamilyReport::Unresolved { record_type, .. } => *record_type,
        }
    }
}

impl fmt::Display for FamilyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let family = match self.record_type() {
            RecordType::A => "IPv4",
            RecordType::Aaaa => "IPv6",
        };

        match self {
            FamilyReport::Skipped { reason, .. } => {
                write!(f, "{}: no action taken, {}", family, reason)
            }
            FamilyReport::Updated { outcome, .. } => {
                write!(f, "{}: {}", family, outcome.human_message)
            }
            FamilyReport::Failed { error, .. } => write!(f, "{}: {}", family, error),
            FamilyReport::Unresolved { error, .. } => {
                write!(f, "{}: not updated, {}", family, error)
            }
        }
    }
}

/// Result of one run
#[derive(Debug)]
pub struct RunReport {
    /// Hostname that was reconciled
    pub hostname: String,
    /// One report per family, IPv6 first, then one per further record
    pub families: Vec<FamilyReport>,
}

impl RunReport {
    /// Number of families for which an update was applied
    pub fn updated_count(&self) -> usize {
        self.families
            .iter()
            .filter(|r| matches!(r, FamilyReport::Updated { .. }))
            .count()
    }

    /// Whether any family failed to update
    pub fn has_failures(&self) -> bool {
        self.families
            .iter()
            .any(|r| matches!(r, FamilyReport::Failed { .. }))
    }
}

/// One-shot reconciliation of a hostname's A and AAAA records
///
/// ## Lifecycle
///
/// 1. Create with [`Dynv6Engine::new()`]
/// 2. Call [`Dynv6Engine::run()`] once per invocation
///
/// Nothing is cached between runs: every run fetches zones and records
/// fresh.
pub struct Dynv6Engine {
    /// API client
    client: Box<dyn HttpClient>,

    /// Interface address enumeration
    interface_source: Box<dyn InterfaceAddressSource>,

    /// External IPv4 lookup
    ipv4_source: Box<dyn ExternalIpv4Source>,

    /// Hostname to reconcile
    hostname: Hostname,

    /// Interface providing the global IPv6 address
    interface: String,

    /// Decision core
    engine: ReconciliationEngine,

    /// Log PATCH calls instead of sending them
    dry_run: bool,

    /// Also reconcile records beyond the first of each type
    all_records: bool,
}

impl Dynv6Engine {
    /// Create a new engine
    ///
    /// # Parameters
    ///
    /// - `client`: dynv6 API client
    /// - `interface_source`: Interface address enumeration
    /// - `ipv4_source`: External IPv4 lookup
    /// - `config`: Updater configuration
    pub fn new(
        client: Box<dyn HttpClient>,
        interface_source: Box<dyn InterfaceAddressSource>,
        ipv4_source: Box<dyn ExternalIpv4Source>,
        config: Dynv6Config,
    ) -> Result<Self> {
        config.validate()?;
        let hostname = Hostname::parse(&config.hostname)?;

        Ok(Self {
            client,
            interface_source,
            ipv4_source,
            hostname,
            interface: config.interface,
            engine: ReconciliationEngine::new(config.engine.ipv4_mode),
            dry_run: config.engine.dry_run,
            all_records: config.engine.all_records,
        })
    }

    /// Run one reconciliation
    ///
    /// # Returns
    ///
    /// - `Ok(RunReport)`: The run completed; individual families may still have failed
    /// - `Err(Error)`: Zones or records could not be listed; no update was attempted
    pub async fn run(&self) -> Result<RunReport> {
        info!(
            "Reconciling {} via {}",
            self.hostname,
            self.client.client_name()
        );

        let resolver = ZoneResolver::new(self.client.as_ref());
        let ResolvedPair {
            aaaa,
            a,
            additional,
        } = resolver.resolve_both(&self.hostname).await?;

        let aaaa_detail = aaaa.as_ref().err().map(ToString::to_string);
        let a_detail = a.as_ref().err().map(ToString::to_string);
        for detail in aaaa_detail.iter().chain(a_detail.iter()) {
            warn!("{}", detail);
        }

        let local = self.observe_local().await;

        let intents = self.engine.plan(
            &local,
            aaaa.as_ref().map_err(|_| aaaa_detail.as_deref().unwrap_or_default()),
            a.as_ref().map_err(|_| a_detail.as_deref().unwrap_or_default()),
        );

        let additional_intents: Vec<UpdateIntent> = if self.all_records {
            additional
                .iter()
                .map(|target| {
                    self.engine
                        .plan_additional(&local, aaaa.as_ref().map_err(|_| ""), target)
                })
                .collect()
        } else {
            if !additional.is_empty() {
                debug!(
                    "Leaving {} further record(s) of {} untouched",
                    additional.len(),
                    self.hostname
                );
            }
            Vec::new()
        };

        let executor = UpdateExecutor::new(self.client.as_ref(), self.dry_run);
        let mut families = Vec::with_capacity(intents.len() + additional_intents.len());
        let mut applied = Vec::new();

        // intents come back IPv6 first, matching this order
        for (intent, unresolved) in intents.into_iter().zip([aaaa.err(), a.err()]) {
            let report = match unresolved {
                Some(error) => FamilyReport::Unresolved {
                    record_type: intent.record_type(),
                    error,
                },
                None => self.apply(&executor, intent, &mut applied).await,
            };
            families.push(report);
        }

        for intent in additional_intents {
            families.push(self.apply(&executor, intent, &mut applied).await);
        }

        Ok(RunReport {
            hostname: self.hostname.to_string(),
            families,
        })
    }

    async fn apply(
        &self,
        executor: &UpdateExecutor<'_>,
        intent: UpdateIntent,
        applied: &mut Vec<UpdateIntent>,
    ) -> FamilyReport {
        let record_type = intent.record_type();

        let intent = if applied.contains(&intent) {
            UpdateIntent::NoOp {
                record_type,
                reason: NoOpReason::AlreadyApplied,
            }
        } else {
            intent
        };

        match intent {
            UpdateIntent::NoOp { reason, .. } => {
                debug!("{}: no action taken, {}", record_type, reason);
                FamilyReport::Skipped {
                    record_type,
                    reason,
                }
            }
            actionable => {
                let result = executor
                    .execute(&actionable)
                    .await
                    .and_then(Outcome::into_result);
                applied.push(actionable);

                match result {
                    Ok(outcome) => FamilyReport::Updated {
                        record_type,
                        outcome,
                    },
                    Err(error) => {
                        warn!("{} update for {} failed: {}", record_type, self.hostname, error);
                        FamilyReport::Failed { record_type, error }
                    }
                }
            }
        }
    }

    async fn observe_local(&self) -> LocalAddresses {
        let ipv6 = match self.interface_source.ipv6_candidates(&self.interface).await {
            Ok(candidates) => {
                debug!(
                    "{} reported {} IPv6 candidate(s) on {}",
                    self.interface_source.source_name(),
                    candidates.len(),
                    self.interface
                );
                AddressSelector::select_global_ipv6(&candidates)
            }
            Err(e) => {
                warn!("Could not list addresses of {}: {}", self.interface, e);
                None
            }
        };

        let ipv4 = match self.ipv4_source.fetch_raw().await {
            Ok(raw) => AddressSelector::validate_ipv4(&raw).map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        if let Err(detail) = &ipv4 {
            warn!(
                "External IPv4 from {} unusable: {}",
                self.ipv4_source.source_name(),
                detail
            );
        }

        LocalAddresses { ipv4, ipv6 }
    }
}
