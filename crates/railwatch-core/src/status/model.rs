//! Status table models.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Latest known deployment status for one service.
///
/// Entries seeded from the upstream API carry a project URL; entries written
/// by the webhook path do not, and the field is omitted from the wire when
/// absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRecord {
    pub project_name: String,
    pub service_name: String,
    pub status: String,
    pub at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_url: Option<String>,
}

/// Mapping from service id to its latest status record.
pub type StatusTable = HashMap<String, StatusRecord>;

/// Normalized update derived from one webhook notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub service_id: String,
    pub service_name: String,
    pub project_name: String,
    pub status: String,
    pub at: String,
}

impl StatusUpdate {
    /// The table entry this update overwrites.
    pub fn to_record(&self) -> StatusRecord {
        StatusRecord {
            project_name: self.project_name.clone(),
            service_name: self.service_name.clone(),
            status: self.status.clone(),
            at: self.at.clone(),
            project_url: None,
        }
    }
}

/// Notification body posted by the deployment platform.
///
/// Every field is optional; unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookPayload {
    pub deployment: Option<DeploymentInfo>,
    pub status: Option<String>,
    pub project: Option<ProjectInfo>,
    pub service: Option<ServiceInfo>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentInfo {
    pub service_id: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectInfo {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceInfo {
    pub id: Option<String>,
    pub name: Option<String>,
}
