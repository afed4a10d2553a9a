//! Typed view of the upstream GraphQL status query response.
//!
//! Only the fields the projection reads are modeled; everything else in the
//! response is ignored.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct StatusResponse {
    pub data: Option<QueryData>,
}

#[derive(Debug, Deserialize)]
pub struct QueryData {
    pub projects: Connection<Project>,
}

/// Relay-style connection wrapper (edges of nodes).
#[derive(Debug, Deserialize)]
pub struct Connection<T> {
    pub edges: Vec<Edge<T>>,
}

impl<T> Default for Connection<T> {
    fn default() -> Self {
        Self { edges: Vec::new() }
    }
}

#[derive(Debug, Deserialize)]
pub struct Edge<T> {
    pub node: T,
}

#[derive(Debug, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub environments: Connection<Environment>,
    #[serde(default)]
    pub services: Connection<Service>,
}

#[derive(Debug, Deserialize)]
pub struct Environment {
    #[serde(default)]
    pub deployments: Connection<Deployment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    pub status: String,
    pub created_at: String,
    pub service_id: String,
}

#[derive(Debug, Deserialize)]
pub struct Service {
    pub id: String,
    pub name: String,
}
