//! Reconciliation engine
//!
//! The decision core: compares the remote record state with the locally
//! observed addresses, one address family at a time, and produces the
//! update intents that bring them back in sync.
//!
//! ## Decision Flow
//!
//! ```text
//! LocalAddresses ──┐
//! AAAA target ─────┼──▶ ReconciliationEngine::plan ──▶ [IPv6 intent, IPv4 intent]
//! A target ────────┘
//! ```
//!
//! Exactly one intent is produced per family, IPv6 first. Intents that need
//! no network call are [`UpdateIntent::NoOp`].
//!
//! ## Zone-level updates
//!
//! An auto-derived A record follows the zone's primary IPv4 address, so it
//! is updated by patching the zone. dynv6 silently ignores that PATCH
//! unless it carries both `ipv4address` and `ipv6prefix`, so a
//! [`UpdateIntent::ZonePrimaryUpdate`] always carries an IPv6 address: the
//! local one if known, else the one currently published by the AAAA record.

pub mod run;

use crate::address::LocalAddresses;
use crate::config::Ipv4Mode;
use crate::model::{RecordType, ResolvedTarget};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;
use tracing::debug;

/// Why a family needs no update call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoOpReason {
    /// The interface has no global-scope IPv6 address
    NoGlobalIpv6,
    /// The external IPv4 lookup returned something that is not an address
    InvalidExternalAddress(String),
    /// The remote record already holds the local address
    Unchanged(IpAddr),
    /// The hostname has no record of this type
    NoSuchRecord(String),
    /// A zone-level update is needed but no IPv6 address is known at all
    NoIpv6ForZoneUpdate,
    /// An identical update was already applied during this run
    AlreadyApplied,
}

impl fmt::Display for NoOpReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoOpReason::NoGlobalIpv6 => f.write_str("no global IPv6 available"),
            NoOpReason::InvalidExternalAddress(detail) => {
                write!(f, "invalid external address ({})", detail)
            }
            NoOpReason::Unchanged(ip) => write!(f, "address {} unchanged", ip),
            NoOpReason::NoSuchRecord(detail) => write!(f, "no such record ({})", detail),
            NoOpReason::NoIpv6ForZoneUpdate => {
                f.write_str("zone update needs an IPv6 address and none is known")
            }
            NoOpReason::AlreadyApplied => f.write_str("same update already applied"),
        }
    }
}

/// One update decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateIntent {
    /// Patch the zone's primary addresses (`PATCH /zones/{zone_id}`)
    ZonePrimaryUpdate {
        zone_id: String,
        zone_name: String,
        ipv4: Ipv4Addr,
        ipv6: Ipv6Addr,
    },

    /// Patch one record (`PATCH /zones/{zone_id}/records/{record_id}`)
    RecordUpdate {
        zone_id: String,
        record_id: String,
        record_name: String,
        fqdn: String,
        record_type: RecordType,
        new_value: IpAddr,
    },

    /// Nothing to do for this family
    NoOp {
        record_type: RecordType,
        reason: NoOpReason,
    },
}

impl UpdateIntent {
    /// Whether executing this intent issues an HTTP call
    pub fn is_actionable(&self) -> bool {
        !matches!(self, UpdateIntent::NoOp { .. })
    }

    /// The address family this intent was planned for
    pub fn record_type(&self) -> RecordType {
        match self {
            UpdateIntent::ZonePrimaryUpdate { .. } => RecordType::A,
            UpdateIntent::RecordUpdate { record_type, .. }
            | UpdateIntent::NoOp { record_type, .. } => *record_type,
        }
    }
}

/// Remote state for one family: the resolved target or why there is none
pub type FamilyTarget<'t> = Result<&'t ResolvedTarget, &'t str>;

/// Compares local and remote state and plans updates
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconciliationEngine {
    ipv4_mode: Ipv4Mode,
}

impl ReconciliationEngine {
    /// Create an engine with the given IPv4 update strategy
    pub fn new(ipv4_mode: Ipv4Mode) -> Self {
        Self { ipv4_mode }
    }

    /// Plan the updates for one run
    ///
    /// Returns exactly two intents: IPv6 first, then IPv4.
    pub fn plan(
        &self,
        local: &LocalAddresses,
        aaaa: FamilyTarget<'_>,
        a: FamilyTarget<'_>,
    ) -> Vec<UpdateIntent> {
        let ipv6 = self.plan_ipv6(local, aaaa);
        let ipv4 = self.plan_ipv4(local, aaaa, a);
        debug!("Planned intents: {:?}, {:?}", ipv6, ipv4);
        vec![ipv6, ipv4]
    }

    /// Plan the update of one further record under the hostname
    ///
    /// Applies the same per-family rules as [`plan`](Self::plan). `aaaa` is
    /// the primary AAAA target, whose published value backs zone updates.
    pub fn plan_additional(
        &self,
        local: &LocalAddresses,
        aaaa: FamilyTarget<'_>,
        target: &ResolvedTarget,
    ) -> UpdateIntent {
        match target.record_type {
            RecordType::Aaaa => self.plan_ipv6(local, Ok(target)),
            RecordType::A => self.plan_ipv4(local, aaaa, Ok(target)),
        }
    }

    fn plan_ipv6(&self, local: &LocalAddresses, aaaa: FamilyTarget<'_>) -> UpdateIntent {
        let no_op = |reason| UpdateIntent::NoOp {
            record_type: RecordType::Aaaa,
            reason,
        };

        let target = match aaaa {
            Ok(target) => target,
            Err(detail) => return no_op(NoOpReason::NoSuchRecord(detail.to_string())),
        };

        let Some(ipv6) = local.ipv6 else {
            return no_op(NoOpReason::NoGlobalIpv6);
        };

        if same_address(&ipv6, target.current_address.as_deref()) {
            return no_op(NoOpReason::Unchanged(IpAddr::V6(ipv6)));
        }

        UpdateIntent::RecordUpdate {
            zone_id: target.zone_id.clone(),
            record_id: target.record_id.clone(),
            record_name: target.record_name.clone(),
            fqdn: target.fqdn(),
            record_type: RecordType::Aaaa,
            new_value: IpAddr::V6(ipv6),
        }
    }

    fn plan_ipv4(
        &self,
        local: &LocalAddresses,
        aaaa: FamilyTarget<'_>,
        a: FamilyTarget<'_>,
    ) -> UpdateIntent {
        let no_op = |reason| UpdateIntent::NoOp {
            record_type: RecordType::A,
            reason,
        };

        let target = match a {
            Ok(target) => target,
            Err(detail) => return no_op(NoOpReason::NoSuchRecord(detail.to_string())),
        };

        let ipv4 = match &local.ipv4 {
            Ok(ipv4) => *ipv4,
            Err(detail) => return no_op(NoOpReason::InvalidExternalAddress(detail.clone())),
        };

        if same_address(&ipv4, target.current_address.as_deref()) {
            return no_op(NoOpReason::Unchanged(IpAddr::V4(ipv4)));
        }

        if target.is_auto_derived && self.ipv4_mode == Ipv4Mode::ZonePrimary {
            // Both families must travel together or the PATCH is ignored
            let published_ipv6 = aaaa
                .ok()
                .and_then(|t| t.current_address.as_deref())
                .and_then(|raw| raw.parse::<Ipv6Addr>().ok());

            return match local.ipv6.or(published_ipv6) {
                Some(ipv6) => UpdateIntent::ZonePrimaryUpdate {
                    zone_id: target.zone_id.clone(),
                    zone_name: target.zone_name.clone(),
                    ipv4,
                    ipv6,
                },
                None => no_op(NoOpReason::NoIpv6ForZoneUpdate),
            };
        }

        UpdateIntent::RecordUpdate {
            zone_id: target.zone_id.clone(),
            record_id: target.record_id.clone(),
            record_name: target.record_name.clone(),
            fqdn: target.fqdn(),
            record_type: RecordType::A,
            new_value: IpAddr::V4(ipv4),
        }
    }
}

/// Canonical-form comparison; an absent or unparsable remote value never matches
fn same_address<A: FromStr + PartialEq>(local: &A, remote: Option<&str>) -> bool {
    remote
        .and_then(|raw| raw.trim().parse::<A>().ok())
        .is_some_and(|remote| &remote == local)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(record_type: RecordType, address: Option<&str>, auto: bool) -> ResolvedTarget {
        ResolvedTarget {
            zone_name: "example.dynv6.net".into(),
            zone_id: "100".into(),
            record_name: String::new(),
            record_id: match record_type {
                RecordType::A => "1".into(),
                RecordType::Aaaa => "2".into(),
            },
            record_type,
            current_address: address.map(Into::into),
            is_auto_derived: auto,
        }
    }

    fn local(ipv4: &str, ipv6: Option<&str>) -> LocalAddresses {
        LocalAddresses {
            ipv4: ipv4.parse().map_err(|_| format!("'{}'", ipv4)),
            ipv6: ipv6.map(|v| v.parse().unwrap()),
        }
    }

    #[test]
    fn test_unchanged_canonical_form() {
        let aaaa = target(RecordType::Aaaa, Some("2001:0db8::0001"), false);
        let a = target(RecordType::A, Some("203.0.113.5"), false);
        let intents = ReconciliationEngine::default().plan(
            &local("203.0.113.5", Some("2001:db8::1")),
            Ok(&aaaa),
            Ok(&a),
        );

        assert_eq!(intents.len(), 2);
        assert!(intents.iter().all(|i| !i.is_actionable()));
    }

    #[test]
    fn test_ipv6_record_update() {
        let aaaa = target(RecordType::Aaaa, Some("2001:db8::1"), false);
        let a = target(RecordType::A, Some("203.0.113.5"), false);
        let intents = ReconciliationEngine::default().plan(
            &local("203.0.113.5", Some("2001:db8::2")),
            Ok(&aaaa),
            Ok(&a),
        );

        assert_eq!(
            intents[0],
            UpdateIntent::RecordUpdate {
                zone_id: "100".into(),
                record_id: "2".into(),
                record_name: String::new(),
                fqdn: "example.dynv6.net".into(),
                record_type: RecordType::Aaaa,
                new_value: "2001:db8::2".parse().unwrap(),
            }
        );
        assert!(!intents[1].is_actionable());
    }

    #[test]
    fn test_auto_derived_uses_zone_update_with_both_families() {
        let aaaa = target(RecordType::Aaaa, Some("2001:db8::1"), false);
        let a = target(RecordType::A, Some("203.0.113.5"), true);
        let intents = ReconciliationEngine::default().plan(
            &local("198.51.100.7", Some("2001:db8::1")),
            Ok(&aaaa),
            Ok(&a),
        );

        assert_eq!(
            intents[1],
            UpdateIntent::ZonePrimaryUpdate {
                zone_id: "100".into(),
                zone_name: "example.dynv6.net".into(),
                ipv4: "198.51.100.7".parse().unwrap(),
                ipv6: "2001:db8::1".parse().unwrap(),
            }
        );
    }

    #[test]
    fn test_zone_update_falls_back_to_published_ipv6() {
        let aaaa = target(RecordType::Aaaa, Some("2001:db8::9"), false);
        let a = target(RecordType::A, Some("203.0.113.5"), true);
        let intents = ReconciliationEngine::default().plan(
            &local("198.51.100.7", None),
            Ok(&aaaa),
            Ok(&a),
        );

        assert_eq!(
            intents[0],
            UpdateIntent::NoOp {
                record_type: RecordType::Aaaa,
                reason: NoOpReason::NoGlobalIpv6,
            }
        );
        match &intents[1] {
            UpdateIntent::ZonePrimaryUpdate { ipv6, .. } => {
                assert_eq!(*ipv6, "2001:db8::9".parse::<Ipv6Addr>().unwrap());
            }
            other => panic!("expected zone update, got {:?}", other),
        }
    }

    #[test]
    fn test_zone_update_without_any_ipv6_is_skipped() {
        let a = target(RecordType::A, Some("203.0.113.5"), true);
        let intents = ReconciliationEngine::default().plan(
            &local("198.51.100.7", None),
            Err("no AAAA record"),
            Ok(&a),
        );

        assert_eq!(
            intents[1],
            UpdateIntent::NoOp {
                record_type: RecordType::A,
                reason: NoOpReason::NoIpv6ForZoneUpdate,
            }
        );
    }

    #[test]
    fn test_manual_mode_overrides_auto_derived() {
        let aaaa = target(RecordType::Aaaa, Some("2001:db8::1"), false);
        let a = target(RecordType::A, Some("203.0.113.5"), true);
        let intents = ReconciliationEngine::new(Ipv4Mode::Manual).plan(
            &local("198.51.100.7", Some("2001:db8::1")),
            Ok(&aaaa),
            Ok(&a),
        );

        assert!(matches!(
            intents[1],
            UpdateIntent::RecordUpdate {
                record_type: RecordType::A,
                ..
            }
        ));
    }

    #[test]
    fn test_explicit_a_record_update() {
        let aaaa = target(RecordType::Aaaa, Some("2001:db8::1"), false);
        let a = target(RecordType::A, Some("203.0.113.5"), false);
        let intents = ReconciliationEngine::default().plan(
            &local("198.51.100.7", Some("2001:db8::1")),
            Ok(&aaaa),
            Ok(&a),
        );

        assert!(matches!(
            &intents[1],
            UpdateIntent::RecordUpdate { record_id, new_value, .. }
                if record_id == "1" && new_value.to_string() == "198.51.100.7"
        ));
    }

    #[test]
    fn test_invalid_external_address_and_missing_records() {
        let a = target(RecordType::A, Some("203.0.113.5"), false);
        let intents = ReconciliationEngine::default().plan(
            &local("not-an-ip", Some("2001:db8::1")),
            Err("no AAAA record"),
            Ok(&a),
        );

        assert!(matches!(
            intents[0],
            UpdateIntent::NoOp {
                reason: NoOpReason::NoSuchRecord(_),
                ..
            }
        ));
        assert!(matches!(
            intents[1],
            UpdateIntent::NoOp {
                reason: NoOpReason::InvalidExternalAddress(_),
                ..
            }
        ));
    }

    #[test]
    fn test_record_without_address_always_updates() {
        let aaaa = target(RecordType::Aaaa, None, false);
        let a = target(RecordType::A, None, false);
        let intents = ReconciliationEngine::default().plan(
            &local("203.0.113.5", Some("2001:db8::1")),
            Ok(&aaaa),
            Ok(&a),
        );

        assert!(intents.iter().all(UpdateIntent::is_actionable));
    }

    #[test]
    fn test_auto_derived_a_without_address_uses_zone_update() {
        let a = target(RecordType::A, None, true);
        let intents = ReconciliationEngine::default().plan(
            &local("203.0.113.5", Some("2001:db8::1")),
            Err("no AAAA record"),
            Ok(&a),
        );

        assert!(matches!(
            intents[1],
            UpdateIntent::ZonePrimaryUpdate { .. }
        ));
    }

    #[test]
    fn test_additional_records_follow_family_rules() {
        let engine = ReconciliationEngine::default();
        let local = local("198.51.100.7", Some("2001:db8::1"));
        let primary_aaaa = target(RecordType::Aaaa, Some("2001:db8::1"), false);

        let mut extra_aaaa = target(RecordType::Aaaa, Some("2001:db8::5"), false);
        extra_aaaa.record_id = "7".into();
        assert!(matches!(
            engine.plan_additional(&local, Ok(&primary_aaaa), &extra_aaaa),
            UpdateIntent::RecordUpdate { ref record_id, .. } if record_id == "7"
        ));

        let mut extra_a = target(RecordType::A, Some("198.51.100.7"), false);
        extra_a.record_id = "8".into();
        assert_eq!(
            engine.plan_additional(&local, Ok(&primary_aaaa), &extra_a),
            UpdateIntent::NoOp {
                record_type: RecordType::A,
                reason: NoOpReason::Unchanged("198.51.100.7".parse().unwrap()),
            }
        );
    }
}
