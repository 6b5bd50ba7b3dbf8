//! Record state interpretation
//!
//! dynv6 derives the apex A record of a zone from the zone's primary IPv4
//! address unless the record is given an explicit value. Such a record has
//! an empty `data` field and carries the effective address, if the zone
//! has one yet, in `expandedData`. Only A records are derived this way.

use crate::model::{Record, RecordType};

/// The effective address of a record and where it comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordState {
    /// Effective address; `None` when the record carries no address yet
    pub address: Option<String>,
    /// Whether the address is inherited from the zone's primary address
    pub is_auto_derived: bool,
}

/// Normalize a raw record payload into a [`RecordState`]
///
/// - non-empty `data`: explicit address
/// - empty `data` on an A record: auto-derived, even when `expandedData`
///   is empty too
/// - empty `data` on any other record: `expandedData` if present, never
///   auto-derived
///
/// A record without an address is always out of date for callers.
pub fn interpret(record: &Record) -> RecordState {
    let data = non_empty(record.data.as_deref());
    let expanded = non_empty(record.expanded_data.as_deref());

    RecordState {
        address: data.or(expanded).map(str::to_string),
        is_auto_derived: data.is_none() && record.record_type == RecordType::A.as_str(),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
