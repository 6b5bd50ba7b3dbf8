//! Test doubles and common utilities for reconciliation contract tests
//!
//! [`FakeDynv6Api`] keeps zones and records in memory and applies PATCH
//! calls to them, so a second run observes the effect of the first one.

#![allow(dead_code)]

use dynv6_core::error::{Error, Result};
use dynv6_core::traits::{
    ApiRequest, ApiResponse, ExternalIpv4Source, HttpClient, HttpMethod, InterfaceAddressSource,
};
use dynv6_core::{Dynv6Config, Dynv6Engine};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct ApiState {
    zones: Vec<Value>,
    records: HashMap<String, Vec<Value>>,
    requests: Vec<ApiRequest>,
    list_status: Option<u16>,
    patch_status: HashMap<String, u16>,
    unreachable_paths: Vec<String>,
}

/// An in-memory dynv6 API that records every request
///
/// Clones share state, so a test can hand one clone to the engine and
/// inspect the other.
#[derive(Clone, Default)]
pub struct FakeDynv6Api {
    state: Arc<Mutex<ApiState>>,
}

impl FakeDynv6Api {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a zone; auto-derived A records follow its `ipv4address`
    pub fn with_zone(self, id: u64, name: &str, ipv4: Option<&str>, ipv6: Option<&str>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.zones.push(json!({
                "id": id,
                "name": name,
                "ipv4address": ipv4,
                "ipv6prefix": ipv6,
            }));
            state.records.entry(id.to_string()).or_default();
        }
        self
    }

    /// Add a record with an explicit value
    pub fn with_record(self, zone_id: u64, id: u64, name: &str, record_type: &str, data: &str) -> Self {
        self.push_record(zone_id, json!({
            "id": id,
            "zoneID": zone_id,
            "name": name,
            "type": record_type,
            "data": data,
            "expandedData": data,
        }))
    }

    /// Add an A record that inherits the zone's primary IPv4 address
    pub fn with_auto_a_record(self, zone_id: u64, id: u64, name: &str) -> Self {
        let expanded = self
            .zone_field(zone_id, "ipv4address")
            .unwrap_or_default();
        self.push_record(zone_id, json!({
            "id": id,
            "zoneID": zone_id,
            "name": name,
            "type": "A",
            "data": "",
            "expandedData": expanded,
        }))
    }

    /// Answer every GET with this status
    pub fn failing_lists_with(self, status: u16) -> Self {
        self.state.lock().unwrap().list_status = Some(status);
        self
    }

    /// Answer PATCH calls to `path` with this status
    pub fn rejecting_patch(self, path: &str, status: u16) -> Self {
        self.state
            .lock()
            .unwrap()
            .patch_status
            .insert(path.to_string(), status);
        self
    }

    /// Fail calls to `path` at the transport level
    pub fn unreachable(self, path: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .unreachable_paths
            .push(path.to_string());
        self
    }

    /// Every request received so far
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    /// PATCH requests received so far
    pub fn patches(&self) -> Vec<ApiRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == HttpMethod::Patch)
            .collect()
    }

    pub fn clear_requests(&self) {
        self.state.lock().unwrap().requests.clear();
    }

    /// Current `data` of a record
    pub fn record_data(&self, zone_id: u64, id: u64) -> Option<String> {
        let state = self.state.lock().unwrap();
        state.records.get(&zone_id.to_string())?.iter().find_map(|r| {
            (r["id"] == json!(id)).then(|| r["data"].as_str().unwrap_or_default().to_string())
        })
    }

    /// Current value of a zone field
    pub fn zone_field(&self, zone_id: u64, field: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        state
            .zones
            .iter()
            .find(|z| z["id"] == json!(zone_id))
            .and_then(|z| z[field].as_str().map(str::to_string))
    }

    fn push_record(self, zone_id: u64, record: Value) -> Self {
        self.state
            .lock()
            .unwrap()
            .records
            .entry(zone_id.to_string())
            .or_default()
            .push(record);
        self
    }

    fn respond(state: &mut ApiState, request: &ApiRequest) -> ApiResponse {
        let segments: Vec<&str> = request.path.trim_start_matches('/').split('/').collect();

        match (request.method, segments.as_slice()) {
            (HttpMethod::Get, _) if state.list_status.is_some() => ApiResponse {
                status: state.list_status.unwrap_or(500),
                body: json!({ "error": "listing failed" }),
            },
            (HttpMethod::Get, ["zones"]) => ok(Value::Array(state.zones.clone())),
            (HttpMethod::Get, ["zones", zone_id, "records"]) => match state.records.get(*zone_id) {
                Some(records) => ok(Value::Array(records.clone())),
                None => not_found(),
            },
            (HttpMethod::Patch, _) if state.patch_status.contains_key(&request.path) => ApiResponse {
                status: state.patch_status[&request.path],
                body: json!({ "error": "rejected" }),
            },
            (HttpMethod::Patch, ["zones", zone_id]) => {
                let body = request.body.clone().unwrap_or_default();
                let Some(zone) = state.zones.iter_mut().find(|z| id_matches(&z["id"], zone_id))
                else {
                    return not_found();
                };
                for field in ["ipv4address", "ipv6prefix"] {
                    if let Some(value) = body.get(field) {
                        zone[field] = value.clone();
                    }
                }
                let zone = zone.clone();

                // auto-derived A records follow the new primary address
                if let Some(records) = state.records.get_mut(*zone_id) {
                    for record in records.iter_mut() {
                        if record["type"] == "A" && record["data"] == "" {
                            record["expandedData"] = zone["ipv4address"].clone();
                        }
                    }
                }
                ok(zone)
            }
            (HttpMethod::Patch, ["zones", zone_id, "records", record_id]) => {
                let body = request.body.clone().unwrap_or_default();
                let Some(record) = state
                    .records
                    .get_mut(*zone_id)
                    .and_then(|records| records.iter_mut().find(|r| id_matches(&r["id"], record_id)))
                else {
                    return not_found();
                };
                record["data"] = body["data"].clone();
                record["expandedData"] = body["data"].clone();
                ok(record.clone())
            }
            _ => not_found(),
        }
    }
}

#[async_trait::async_trait]
impl HttpClient for FakeDynv6Api {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(request.clone());

        if state.unreachable_paths.contains(&request.path) {
            return Err(Error::transport(format!("connection reset: {}", request.path)));
        }

        Ok(Self::respond(&mut state, &request))
    }

    fn client_name(&self) -> &'static str {
        "fake-dynv6"
    }
}

fn ok(body: Value) -> ApiResponse {
    ApiResponse { status: 200, body }
}

fn not_found() -> ApiResponse {
    ApiResponse {
        status: 404,
        body: json!({ "error": "not found" }),
    }
}

fn id_matches(id: &Value, segment: &str) -> bool {
    match id {
        Value::Number(n) => n.to_string() == segment,
        Value::String(s) => s == segment,
        _ => false,
    }
}

/// An interface reporting a fixed list of addresses
pub struct StaticInterfaceSource {
    candidates: Option<Vec<String>>,
}

impl StaticInterfaceSource {
    pub fn new(candidates: &[&str]) -> Self {
        Self {
            candidates: Some(candidates.iter().map(|c| c.to_string()).collect()),
        }
    }

    /// An interface that cannot be queried
    pub fn missing() -> Self {
        Self { candidates: None }
    }
}

#[async_trait::async_trait]
impl InterfaceAddressSource for StaticInterfaceSource {
    async fn ipv6_candidates(&self, interface: &str) -> Result<Vec<String>> {
        self.candidates
            .clone()
            .ok_or_else(|| Error::config(format!("interface {} not found", interface)))
    }

    fn source_name(&self) -> &'static str {
        "static"
    }
}

/// An external lookup returning a fixed body
pub struct StaticIpv4Source {
    body: Option<String>,
}

impl StaticIpv4Source {
    pub fn new(body: &str) -> Self {
        Self {
            body: Some(body.to_string()),
        }
    }

    /// A lookup service that cannot be reached
    pub fn unreachable() -> Self {
        Self { body: None }
    }
}

#[async_trait::async_trait]
impl ExternalIpv4Source for StaticIpv4Source {
    async fn fetch_raw(&self) -> Result<String> {
        self.body
            .clone()
            .ok_or_else(|| Error::transport("lookup service unreachable"))
    }

    fn source_name(&self) -> &'static str {
        "static"
    }
}

/// Build an engine over the given fakes with default settings
pub fn engine_for(
    hostname: &str,
    api: &FakeDynv6Api,
    interface: StaticInterfaceSource,
    ipv4: StaticIpv4Source,
) -> Dynv6Engine {
    engine_with_config(Dynv6Config::new(hostname, "test-token"), api, interface, ipv4)
}

pub fn engine_with_config(
    config: Dynv6Config,
    api: &FakeDynv6Api,
    interface: StaticInterfaceSource,
    ipv4: StaticIpv4Source,
) -> Dynv6Engine {
    Dynv6Engine::new(
        Box::new(api.clone()),
        Box::new(interface),
        Box::new(ipv4),
        config,
    )
    .expect("engine construction succeeds")
}
