//! The relay service object shared by all request handlers.

use serde::Serialize;
use std::sync::RwLock;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::feed::{FeedEvent, SubscriberRegistry};
use crate::status::{
    self,
    model::{StatusTable, StatusUpdate, WebhookPayload},
};

/// Outcome of the one-shot startup fetch, kept for health reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum FetchState {
    Pending,
    Ok { services: usize },
    Failed { error: String },
}

/// In-memory relay state: the status table plus the set of live viewers.
///
/// Shared across handler tasks behind an `Arc`. Locks are never held across
/// an await point, and broadcasts iterate a snapshot of the subscriber set.
#[derive(Debug)]
pub struct Relay {
    table: RwLock<StatusTable>,
    subscribers: SubscriberRegistry,
    fetch: RwLock<FetchState>,
}

impl Relay {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(StatusTable::new()),
            subscribers: SubscriberRegistry::new(),
            fetch: RwLock::new(FetchState::Pending),
        }
    }

    /// Copy of the current status table.
    pub fn snapshot(&self) -> StatusTable {
        self.table.read().unwrap().clone()
    }

    /// Install the startup snapshot fetched from the upstream API.
    ///
    /// Only fills service ids the table does not know yet: a webhook that
    /// arrived while the fetch was in flight is newer than the fetch result
    /// and must keep winning.
    pub fn seed(&self, fetched: StatusTable) {
        let mut table = self.table.write().unwrap();
        for (service_id, record) in fetched {
            table.entry(service_id).or_insert(record);
        }
    }

    /// Handle one webhook notification: normalize, upsert, broadcast.
    ///
    /// Returns the normalized update when the payload carried a usable
    /// deployment descriptor, `None` when the notification was ignored.
    pub fn ingest(&self, payload: &WebhookPayload) -> Option<StatusUpdate> {
        let update = status::normalize(payload, status::now_rfc3339())?;

        {
            let mut table = self.table.write().unwrap();
            status::apply(&mut table, &update);
        }

        self.subscribers
            .broadcast(&FeedEvent::Update(update.clone()));

        Some(update)
    }

    /// Register a new viewer.
    ///
    /// Returns the subscriber id, its event receiver, and the table snapshot
    /// for the initial message. Registration happens before the snapshot is
    /// taken, so an update racing this call is at worst delivered twice
    /// (once inside the snapshot, once as an event), never lost.
    pub fn subscribe(&self) -> (Uuid, mpsc::UnboundedReceiver<FeedEvent>, StatusTable) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.subscribers.register(tx);
        let snapshot = self.snapshot();
        (id, rx, snapshot)
    }

    /// Drop a viewer. Safe to call more than once for the same id.
    pub fn unsubscribe(&self, id: &Uuid) {
        self.subscribers.unregister(id);
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn service_count(&self) -> usize {
        self.table.read().unwrap().len()
    }

    pub fn fetch_state(&self) -> FetchState {
        self.fetch.read().unwrap().clone()
    }

    pub fn set_fetch_state(&self, state: FetchState) {
        *self.fetch.write().unwrap() = state;
    }
}

impl Default for Relay {
    fn default() -> Self {
        Self::new()
    }
}
