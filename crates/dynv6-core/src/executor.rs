//! Update execution
//!
//! Translates each actionable [`UpdateIntent`] into exactly one PATCH call
//! and interprets the response status. No retries: a non-200 answer is
//! reported as a failed [`Outcome`] and the run moves on.
//!
//! ## API Calls
//!
//! ```http
//! # Zone primary addresses (auto-derived A records follow them)
//! PATCH /zones/:zone_id
//! { "ipv4address": "203.0.113.5", "ipv6prefix": "2001:db8::1" }
//!
//! # Single record
//! PATCH /zones/:zone_id/records/:record_id
//! { "type": "AAAA", "name": "home", "data": "2001:db8::1", "recordID": 7, "zoneID": 42 }
//! ```

use crate::engine::UpdateIntent;
use crate::error::{Error, Result};
use crate::model::id_value;
use crate::traits::{ApiRequest, HttpClient};
use tracing::{debug, info, warn};

/// Result of executing one intent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Whether the API accepted the update
    pub succeeded: bool,
    /// HTTP status; `None` when no call was made (no-op or dry run)
    pub http_status: Option<u16>,
    /// Human-readable summary
    pub human_message: String,
}

impl Outcome {
    /// Convert a failed outcome into [`Error::UpdateRejected`]
    pub fn into_result(self) -> Result<Outcome> {
        match (self.succeeded, self.http_status) {
            (false, Some(status)) => Err(Error::UpdateRejected {
                status,
                message: self.human_message,
            }),
            _ => Ok(self),
        }
    }
}

/// Build the PATCH request for an intent; `None` for no-ops
pub fn request_for(intent: &UpdateIntent) -> Option<ApiRequest> {
    match intent {
        UpdateIntent::ZonePrimaryUpdate {
            zone_id, ipv4, ipv6, ..
        } => Some(ApiRequest::patch(
            format!("/zones/{}", zone_id),
            serde_json::json!({
                "ipv4address": ipv4.to_string(),
                "ipv6prefix": ipv6.to_string(),
            }),
        )),
        UpdateIntent::RecordUpdate {
            zone_id,
            record_id,
            record_name,
            record_type,
            new_value,
            ..
        } => Some(ApiRequest::patch(
            format!("/zones/{}/records/{}", zone_id, record_id),
            serde_json::json!({
                "type": record_type.as_str(),
                "name": record_name,
                "data": new_value.to_string(),
                "recordID": id_value(record_id),
                "zoneID": id_value(zone_id),
            }),
        )),
        UpdateIntent::NoOp { .. } => None,
    }
}

/// Executes update intents against the API
pub struct UpdateExecutor<'c> {
    client: &'c dyn HttpClient,
    dry_run: bool,
}

impl<'c> UpdateExecutor<'c> {
    /// Create an executor; in dry-run mode PATCH calls are logged, not sent
    pub fn new(client: &'c dyn HttpClient, dry_run: bool) -> Self {
        Self { client, dry_run }
    }

    /// Execute one intent
    ///
    /// # Returns
    ///
    /// - `Ok(Outcome)`: The call completed (successfully or not), or no call was needed
    /// - `Err(Error::Transport)`: The call could not complete
    pub async fn execute(&self, intent: &UpdateIntent) -> Result<Outcome> {
        let Some(request) = request_for(intent) else {
            return Ok(Outcome {
                succeeded: true,
                http_status: None,
                human_message: describe_no_op(intent),
            });
        };

        if self.dry_run {
            info!(
                "[DRY-RUN] Would send {} {} with payload: {}",
                request.method,
                request.path,
                request.body.as_ref().map(ToString::to_string).unwrap_or_default()
            );
            return Ok(Outcome {
                succeeded: true,
                http_status: None,
                human_message: format!("[dry-run] {}", success_message(intent)),
            });
        }

        debug!("{} {}", request.method, request.path);
        let response = self.client.send(request).await?;

        if response.is_ok() {
            let message = success_message(intent);
            info!("{}", message);
            Ok(Outcome {
                succeeded: true,
                http_status: Some(response.status),
                human_message: message,
            })
        } else {
            let message = failure_message(intent, response.status);
            warn!("{}", message);
            Ok(Outcome {
                succeeded: false,
                http_status: Some(response.status),
                human_message: message,
            })
        }
    }
}

fn success_message(intent: &UpdateIntent) -> String {
    match intent {
        UpdateIntent::ZonePrimaryUpdate {
            zone_name, ipv4, ipv6, ..
        } => format!(
            "Updated primary addresses of zone {} to {} / {}",
            zone_name, ipv4, ipv6
        ),
        UpdateIntent::RecordUpdate {
            fqdn,
            record_type,
            new_value,
            ..
        } => format!("{} record for {} changed to {}", record_type, fqdn, new_value),
        UpdateIntent::NoOp { .. } => describe_no_op(intent),
    }
}

fn failure_message(intent: &UpdateIntent, status: u16) -> String {
    match intent {
        UpdateIntent::ZonePrimaryUpdate { zone_name, .. } => format!(
            "Updating primary addresses of zone {} failed with HTTP {}",
            zone_name, status
        ),
        UpdateIntent::RecordUpdate {
            fqdn, record_type, ..
        } => format!(
            "Updating {} record for {} failed with HTTP {}",
            record_type, fqdn, status
        ),
        UpdateIntent::NoOp { .. } => describe_no_op(intent),
    }
}

fn describe_no_op(intent: &UpdateIntent) -> String {
    match intent {
        UpdateIntent::NoOp {
            record_type,
            reason,
        } => format!("{}: no action taken, {}", record_type, reason),
        _ => String::new(),
    }
}
