//! Status table operations.

pub mod model;

use chrono::{SecondsFormat, Utc};
use model::{StatusTable, StatusUpdate, WebhookPayload};

/// Service name used when a webhook carries no service descriptor.
pub const UNKNOWN_SERVICE: &str = "Unknown";

/// Project name used when a webhook carries no project descriptor.
pub const UNKNOWN_PROJECT: &str = "Unknown";

/// Status used when neither the payload nor its deployment carries one.
pub const UNKNOWN_STATUS: &str = "UNKNOWN";

/// Current time in the wire format used for `at` fields.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Derive the normalized update for one webhook notification.
///
/// Returns `None` when the payload carries no deployment descriptor, or when
/// no service id can be resolved from either the service descriptor or the
/// deployment. Such notifications are acknowledged but ignored.
///
/// The `at` field is the processing time passed in by the caller, never an
/// upstream-supplied timestamp.
pub fn normalize(payload: &WebhookPayload, at: String) -> Option<StatusUpdate> {
    let deployment = payload.deployment.as_ref()?;

    let service_id = payload
        .service
        .as_ref()
        .and_then(|s| s.id.clone())
        .or_else(|| deployment.service_id.clone())?;

    let service_name = payload
        .service
        .as_ref()
        .and_then(|s| s.name.clone())
        .unwrap_or_else(|| UNKNOWN_SERVICE.to_string());

    let project_name = payload
        .project
        .as_ref()
        .and_then(|p| p.name.clone())
        .unwrap_or_else(|| UNKNOWN_PROJECT.to_string());

    let status = payload
        .status
        .clone()
        .or_else(|| deployment.status.clone())
        .unwrap_or_else(|| UNKNOWN_STATUS.to_string());

    Some(StatusUpdate {
        service_id,
        service_name,
        project_name,
        status,
        at,
    })
}

/// Overwrite the table entry for the update's service id.
///
/// The whole record is replaced, so a project URL stored by the startup
/// fetch does not survive a webhook update for the same service.
pub fn apply(table: &mut StatusTable, update: &StatusUpdate) {
    table.insert(update.service_id.clone(), update.to_record());
}
