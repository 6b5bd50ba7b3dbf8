//! Zone and record resolution
//!
//! Finds the zone that owns a hostname and the A/AAAA record inside it.
//!
//! ## Zone lookup
//!
//! 1. Naive guess: the zone is everything after the first label
//!    (`home.example.com` → zone `example.com`, record `home`).
//! 2. Deep search, when no zone has the naive name: every label suffix of
//!    the hostname is tried, longest first. The first zone found fixes the
//!    zone name; the remaining prefix labels become the record name. A
//!    hostname that is itself a zone resolves to the apex record `""`.
//!
//! The naive guess takes precedence over the suffix scan, so the longest
//! matching zone only wins when the naive parent is not a zone:
//!
//! - `a.b.example.com` with zones `example.com` and `b.example.com`
//!   resolves to zone `b.example.com`, record `a`.
//! - `b.example.com` with the same zones resolves to zone `example.com`,
//!   record `b`, not to the apex of `b.example.com`.

use crate::error::{Error, Result};
use crate::interpret::interpret;
use crate::model::{Hostname, Record, RecordType, ResolvedTarget, Zone};
use crate::traits::{ApiRequest, ApiResponse, HttpClient};
use tracing::debug;

/// A zone matched to a hostname
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneMatch<'z> {
    /// The owning zone
    pub zone: &'z Zone,
    /// Hostname labels below the zone apex, joined by `.`
    pub record_name: String,
}

/// Locate the zone owning `hostname` among `zones`
///
/// Pure function: tries the naive guess, then every suffix longest first,
/// and returns the first match. A naive match is returned even when a
/// longer suffix of the hostname is also a zone.
pub fn locate_zone<'z>(hostname: &Hostname, zones: &'z [Zone]) -> Option<ZoneMatch<'z>> {
    let zone_named = move |name: &str| zones.iter().find(|zone| zone.name.eq_ignore_ascii_case(name));

    let naive = hostname.parent();
    if !naive.is_empty()
        && let Some(zone) = zone_named(&naive)
    {
        return Some(ZoneMatch {
            zone,
            record_name: hostname.first_label().to_string(),
        });
    }

    debug!("No zone named {}, starting deep search for {}", naive, hostname);

    hostname
        .suffix_splits()
        .find_map(|(record_name, zone_name)| {
            zone_named(&zone_name).map(|zone| ZoneMatch { zone, record_name })
        })
}

/// Find the record of `record_type` for a located zone
///
/// The first matching record in API order wins.
pub fn find_target(
    hostname: &Hostname,
    zone_match: &ZoneMatch<'_>,
    records: &[Record],
    record_type: RecordType,
) -> Result<ResolvedTarget> {
    let record = records
        .iter()
        .find(|record| record.matches(&zone_match.record_name, record_type))
        .ok_or_else(|| Error::RecordNotFound {
            hostname: hostname.to_string(),
            zone: zone_match.zone.name.clone(),
            record_type: record_type.to_string(),
        })?;

    Ok(target_for(zone_match, record, record_type))
}

/// Every A and AAAA record under the matched record name except the first
/// of each type, in API order
pub fn additional_targets(zone_match: &ZoneMatch<'_>, records: &[Record]) -> Vec<ResolvedTarget> {
    let mut targets = Vec::new();
    for record_type in [RecordType::Aaaa, RecordType::A] {
        let matching = records
            .iter()
            .filter(|record| record.matches(&zone_match.record_name, record_type))
            .skip(1);
        targets.extend(matching.map(|record| target_for(zone_match, record, record_type)));
    }
    targets
}

fn target_for(zone_match: &ZoneMatch<'_>, record: &Record, record_type: RecordType) -> ResolvedTarget {
    let state = interpret(record);

    ResolvedTarget {
        zone_name: zone_match.zone.name.clone(),
        zone_id: zone_match.zone.id.clone(),
        record_name: zone_match.record_name.clone(),
        record_id: record.id.clone(),
        record_type,
        current_address: state.address,
        is_auto_derived: state.is_auto_derived,
    }
}

/// Resolution results for both address families of one hostname
#[derive(Debug)]
pub struct ResolvedPair {
    /// AAAA resolution
    pub aaaa: Result<ResolvedTarget>,
    /// A resolution
    pub a: Result<ResolvedTarget>,
    /// Further A and AAAA records sharing the record name, IPv6 first
    pub additional: Vec<ResolvedTarget>,
}

/// Resolves hostnames against the account's zones
pub struct ZoneResolver<'c> {
    client: &'c dyn HttpClient,
}

impl<'c> ZoneResolver<'c> {
    /// Create a resolver using `client` for API calls
    pub fn new(client: &'c dyn HttpClient) -> Self {
        Self { client }
    }

    /// Resolve the record of `record_type` for `hostname`
    ///
    /// Issues `GET /zones` and `GET /zones/{id}/records`.
    pub async fn resolve(
        &self,
        hostname: &Hostname,
        record_type: RecordType,
    ) -> Result<ResolvedTarget> {
        let zones = self.fetch_zones().await?;
        let zone_match = locate_zone(hostname, &zones).ok_or_else(|| Error::ZoneNotFound {
            hostname: hostname.to_string(),
        })?;

        let records = self.fetch_records(zone_match.zone).await?;
        find_target(hostname, &zone_match, &records, record_type)
    }

    /// Resolve both the AAAA and the A record of `hostname`
    ///
    /// Fetches the zone list and the matched zone's records once. Returns
    /// `Err` only when the zone list or the record list cannot be fetched;
    /// a missing zone or record is reported per family.
    pub async fn resolve_both(&self, hostname: &Hostname) -> Result<ResolvedPair> {
        let zones = self.fetch_zones().await?;

        let Some(zone_match) = locate_zone(hostname, &zones) else {
            debug!("No zone matches {} at any suffix depth", hostname);
            let not_found = || Error::ZoneNotFound {
                hostname: hostname.to_string(),
            };
            return Ok(ResolvedPair {
                aaaa: Err(not_found()),
                a: Err(not_found()),
                additional: Vec::new(),
            });
        };

        debug!(
            "Resolved {} to zone {} (id {}), record name '{}'",
            hostname, zone_match.zone.name, zone_match.zone.id, zone_match.record_name
        );

        let records = self.fetch_records(zone_match.zone).await?;

        Ok(ResolvedPair {
            aaaa: find_target(hostname, &zone_match, &records, RecordType::Aaaa),
            a: find_target(hostname, &zone_match, &records, RecordType::A),
            additional: additional_targets(&zone_match, &records),
        })
    }

    /// Fetch the account's zone list
    ///
    /// # API Call
    ///
    /// ```http
    /// GET /zones
    /// Authorization: Bearer <token>
    /// ```
    pub async fn fetch_zones(&self) -> Result<Vec<Zone>> {
        let response = self.client.send(ApiRequest::get("/zones")).await?;

        match response.status {
            200 => decode(response),
            401 | 403 => Err(Error::Authentication {
                status: response.status,
            }),
            status => Err(Error::api(status, "listing zones")),
        }
    }

    /// Fetch the record list of `zone`
    ///
    /// # API Call
    ///
    /// ```http
    /// GET /zones/:zone_id/records
    /// Authorization: Bearer <token>
    /// ```
    pub async fn fetch_records(&self, zone: &Zone) -> Result<Vec<Record>> {
        let path = format!("/zones/{}/records", zone.id);
        let response = self.client.send(ApiRequest::get(path)).await?;

        match response.status {
            200 => decode(response),
            401 | 403 => Err(Error::Authentication {
                status: response.status,
            }),
            status => Err(Error::api(
                status,
                format!("listing records of zone {}", zone.name),
            )),
        }
    }
}

fn decode<T: serde::de::DeserializeOwned>(response: ApiResponse) -> Result<Vec<T>> {
    Ok(serde_json::from_value(response.body)?)
}
