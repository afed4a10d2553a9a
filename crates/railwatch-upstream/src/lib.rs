//! Railway GraphQL client for the one-shot startup status fetch.
//!
//! Queries projects, environments, deployments, and services once and
//! projects the response into the relay's status table. Failures are logged
//! and swallowed; the server never waits on this call.

pub mod model;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use railwatch_core::relay::{FetchState, Relay};
use railwatch_core::status::model::{StatusRecord, StatusTable};
use thiserror::Error;
use tracing::{error, info};

use model::{QueryData, StatusResponse};

/// Default Railway GraphQL endpoint.
pub const DEFAULT_API_URL: &str = "https://backboard.railway.app/graphql/v2";

/// Service name stored when a deployment's service id has no entry in the
/// project's service list.
pub const UNKNOWN_SERVICE: &str = "Unknown Service";

/// Startup query: the latest deployment per environment, plus the service
/// list used to resolve names.
const STATUS_QUERY: &str = r#"
query {
  projects {
    edges {
      node {
        id
        name
        environments {
          edges {
            node {
              id
              name
              deployments(first: 1) {
                edges {
                  node {
                    id
                    status
                    createdAt
                    serviceId
                  }
                }
              }
            }
          }
        }
        services {
          edges {
            node {
              id
              name
            }
          }
        }
      }
    }
  }
}"#;

/// Errors from the startup status fetch.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("upstream request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream response missing data: {0}")]
    MissingData(String),
}

/// Railway API client.
#[derive(Clone)]
pub struct RailwayClient {
    client: reqwest::Client,
    api_url: String,
    token: String,
}

impl RailwayClient {
    pub fn new(api_url: &str, token: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    /// Fetch the current deployment status of every service.
    pub async fn fetch_initial_status(&self) -> Result<StatusTable, FetchError> {
        let body = serde_json::json!({ "query": STATUS_QUERY });

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let parsed: StatusResponse = response.json().await?;
        let data = parsed
            .data
            .ok_or_else(|| FetchError::MissingData("no `data` field in response".to_string()))?;

        Ok(project_table(&data))
    }
}

/// Project the GraphQL response into a status table.
///
/// One entry per deployment, keyed by service id. The per-project service
/// list resolves names; ids it does not know fall back to a sentinel.
pub fn project_table(data: &QueryData) -> StatusTable {
    let mut table = StatusTable::new();

    for project in data.projects.edges.iter().map(|e| &e.node) {
        let service_names: HashMap<&str, &str> = project
            .services
            .edges
            .iter()
            .map(|e| (e.node.id.as_str(), e.node.name.as_str()))
            .collect();

        let project_url = format!("https://railway.app/project/{}", project.id);

        for environment in project.environments.edges.iter().map(|e| &e.node) {
            for deployment in environment.deployments.edges.iter().map(|e| &e.node) {
                let service_name = service_names
                    .get(deployment.service_id.as_str())
                    .copied()
                    .unwrap_or(UNKNOWN_SERVICE);

                table.insert(
                    deployment.service_id.clone(),
                    StatusRecord {
                        project_name: project.name.clone(),
                        service_name: service_name.to_string(),
                        status: deployment.status.clone(),
                        at: deployment.created_at.clone(),
                        project_url: Some(project_url.clone()),
                    },
                );
            }
        }
    }

    table
}

/// Spawn the fire-and-forget startup fetch.
///
/// Seeds the relay's table on success and records the outcome either way.
/// The caller never waits on completion; no retry, no backoff.
pub fn spawn_initial_fetch(relay: Arc<Relay>, client: RailwayClient) {
    tokio::spawn(async move {
        match client.fetch_initial_status().await {
            Ok(table) => {
                let services = table.len();
                relay.seed(table);
                relay.set_fetch_state(FetchState::Ok { services });
                info!(services, "seeded status table from upstream");
            }
            Err(e) => {
                relay.set_fetch_state(FetchState::Failed {
                    error: e.to_string(),
                });
                error!(error = %e, "initial status fetch failed");
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
      "data": {
        "projects": {
          "edges": [
            {
              "node": {
                "id": "p1",
                "name": "demo",
                "environments": {
                  "edges": [
                    {
                      "node": {
                        "id": "e1",
                        "name": "production",
                        "deployments": {
                          "edges": [
                            {
                              "node": {
                                "id": "d1",
                                "status": "SUCCESS",
                                "createdAt": "2026-08-06T12:00:00.000Z",
                                "serviceId": "svc1"
                              }
                            },
                            {
                              "node": {
                                "id": "d2",
                                "status": "CRASHED",
                                "createdAt": "2026-08-06T13:00:00.000Z",
                                "serviceId": "svc-orphan"
                              }
                            }
                          ]
                        }
                      }
                    }
                  ]
                },
                "services": {
                  "edges": [
                    { "node": { "id": "svc1", "name": "api" } }
                  ]
                }
              }
            }
          ]
        }
      }
    }"#;

    #[test]
    fn projects_response_into_table() {
        let parsed: StatusResponse = serde_json::from_str(FIXTURE).unwrap();
        let table = project_table(&parsed.data.unwrap());

        assert_eq!(table.len(), 2);

        let record = &table["svc1"];
        assert_eq!(record.project_name, "demo");
        assert_eq!(record.service_name, "api");
        assert_eq!(record.status, "SUCCESS");
        assert_eq!(record.at, "2026-08-06T12:00:00.000Z");
        assert_eq!(
            record.project_url.as_deref(),
            Some("https://railway.app/project/p1")
        );
    }

    #[test]
    fn unknown_service_id_gets_sentinel_name() {
        let parsed: StatusResponse = serde_json::from_str(FIXTURE).unwrap();
        let table = project_table(&parsed.data.unwrap());

        assert_eq!(table["svc-orphan"].service_name, "Unknown Service");
        assert_eq!(table["svc-orphan"].status, "CRASHED");
    }

    #[test]
    fn missing_data_field_is_an_error() {
        let parsed: StatusResponse =
            serde_json::from_str(r#"{"errors":[{"message":"unauthorized"}]}"#).unwrap();
        assert!(parsed.data.is_none());
    }

    #[test]
    fn empty_projects_yield_empty_table() {
        let parsed: StatusResponse =
            serde_json::from_str(r#"{"data":{"projects":{"edges":[]}}}"#).unwrap();
        assert!(project_table(&parsed.data.unwrap()).is_empty());
    }
}
