//! Domain model: hostnames, zones, records and resolution results
//!
//! `Zone` and `Record` mirror the JSON shapes returned by the dynv6 REST
//! API. Both are read-only snapshots fetched fresh on every run.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// DNS record type handled by the updater
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    /// IPv4 address record
    A,
    /// IPv6 address record
    #[serde(rename = "AAAA")]
    Aaaa,
}

impl RecordType {
    /// Wire name of the record type
    pub fn as_str(self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated, dot-separated hostname
///
/// Parsing trims one trailing dot and lowercases the input. Each label must
/// follow RFC 1035: 1-63 characters, alphanumeric or hyphen, and must not
/// start or end with a hyphen. The whole name is limited to 253 characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hostname {
    labels: Vec<String>,
}

impl Hostname {
    /// Parse and validate a hostname
    pub fn parse(raw: &str) -> Result<Self> {
        let name = raw.trim();
        let name = name.strip_suffix('.').unwrap_or(name).to_ascii_lowercase();

        if name.is_empty() {
            return Err(Error::invalid_input("Hostname cannot be empty"));
        }

        if name.len() > 253 {
            return Err(Error::invalid_input(format!(
                "Hostname too long: {} chars (max 253)",
                name.len()
            )));
        }

        let mut labels = Vec::new();
        for label in name.split('.') {
            if label.is_empty() {
                return Err(Error::invalid_input(format!(
                    "Hostname has empty label: '{}'",
                    name
                )));
            }

            if label.len() > 63 {
                return Err(Error::invalid_input(format!(
                    "Hostname label too long: {} chars (max 63). Label: '{}'",
                    label.len(),
                    label
                )));
            }

            if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
                return Err(Error::invalid_input(format!(
                    "Hostname label contains invalid characters: '{}'",
                    label
                )));
            }

            if label.starts_with('-') || label.ends_with('-') {
                return Err(Error::invalid_input(format!(
                    "Hostname label cannot start or end with hyphen: '{}'",
                    label
                )));
            }

            labels.push(label.to_string());
        }

        Ok(Self { labels })
    }

    /// The labels of this hostname, leftmost first
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// The naive zone guess: everything after the first label
    ///
    /// Empty for a single-label hostname.
    pub fn parent(&self) -> String {
        self.labels[1..].join(".")
    }

    /// The leftmost label
    pub fn first_label(&self) -> &str {
        &self.labels[0]
    }

    /// Every `(record_name, zone_name)` split of this hostname, longest
    /// zone name first
    ///
    /// The first split is the whole hostname as zone with an empty record
    /// name; the last uses the rightmost label alone as zone name.
    pub fn suffix_splits(&self) -> impl Iterator<Item = (String, String)> + '_ {
        (0..self.labels.len()).map(move |i| {
            (self.labels[..i].join("."), self.labels[i..].join("."))
        })
    }
}

impl fmt::Display for Hostname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.labels.join("."))
    }
}

/// A zone as listed by `GET /zones`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Zone ID
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// Zone apex name (e.g. "example.dynv6.net")
    pub name: String,
    /// Primary IPv4 address of the zone
    #[serde(default)]
    pub ipv4address: Option<String>,
    /// Primary IPv6 prefix/address of the zone
    #[serde(default)]
    pub ipv6prefix: Option<String>,
}

/// A resource record as listed by `GET /zones/{id}/records`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Record ID
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// Label prefix relative to the zone apex ("" for the apex itself)
    #[serde(default)]
    pub name: String,
    /// Record type as reported by the API ("A", "AAAA", "CNAME", ...)
    #[serde(rename = "type")]
    pub record_type: String,
    /// Explicit record value; empty for auto-derived A records
    #[serde(default)]
    pub data: Option<String>,
    /// Effective value computed by the provider
    #[serde(default, rename = "expandedData")]
    pub expanded_data: Option<String>,
}

impl Record {
    /// Whether this record has the given name and type
    pub fn matches(&self, record_name: &str, record_type: RecordType) -> bool {
        self.name.eq_ignore_ascii_case(record_name) && self.record_type == record_type.as_str()
    }
}

/// The zone and record a hostname resolved to for one address family
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// Zone apex name
    pub zone_name: String,
    /// Zone ID
    pub zone_id: String,
    /// Record name relative to the zone ("" for the apex)
    pub record_name: String,
    /// Record ID
    pub record_id: String,
    /// Record type
    pub record_type: RecordType,
    /// Address currently published by the record, if any
    pub current_address: Option<String>,
    /// Whether the address is inherited from the zone's primary address
    pub is_auto_derived: bool,
}

impl ResolvedTarget {
    /// Fully qualified name of the record
    pub fn fqdn(&self) -> String {
        if self.record_name.is_empty() {
            self.zone_name.clone()
        } else {
            format!("{}.{}", self.record_name, self.zone_name)
        }
    }
}

/// IDs are numeric in dynv6 responses; accept strings as well
fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}

/// Render an ID for a request body, as a number when it is one
pub(crate) fn id_value(id: &str) -> serde_json::Value {
    id.parse::<u64>()
        .map(serde_json::Value::from)
        .unwrap_or_else(|_| serde_json::Value::from(id))
}
