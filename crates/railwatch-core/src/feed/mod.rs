//! Live feed events and the subscriber registry.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use crate::status::model::{StatusTable, StatusUpdate};

/// Message pushed to live feed viewers.
///
/// `init` wraps the full table under a `data` key; `update` is flat, with
/// the normalized record's fields next to the tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FeedEvent {
    /// Full table snapshot, sent once when a viewer connects.
    Init { data: StatusTable },
    /// One normalized update, fanned out after each ingested webhook.
    Update(StatusUpdate),
}

/// Sender half of one viewer's outbound channel.
pub type FeedSink = mpsc::UnboundedSender<FeedEvent>;

/// One connected viewer: a fresh id plus its outbound channel.
///
/// The registry owns set membership; the underlying connection belongs to
/// the transport layer.
#[derive(Debug, Clone)]
pub struct Subscriber {
    pub id: Uuid,
    pub sink: FeedSink,
}

/// Set of currently connected viewers.
///
/// The map lock is held only for membership changes and for snapshotting
/// the subscriber list; broadcast sends happen outside it.
#[derive(Debug, Default)]
pub struct SubscriberRegistry {
    inner: Mutex<HashMap<Uuid, Subscriber>>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a subscriber for the given sink, register it, and return
    /// its id.
    pub fn register(&self, sink: FeedSink) -> Uuid {
        let subscriber = Subscriber {
            id: Uuid::new_v4(),
            sink,
        };
        let id = subscriber.id;
        self.inner.lock().unwrap().insert(id, subscriber);
        debug!(subscriber = %id, "live feed subscriber registered");
        id
    }

    /// Remove a viewer. Removing an id that is already gone is a no-op.
    pub fn unregister(&self, id: &Uuid) {
        if self.inner.lock().unwrap().remove(id).is_some() {
            debug!(subscriber = %id, "live feed subscriber unregistered");
        }
    }

    /// Number of connected viewers.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Push an event to every connected viewer.
    ///
    /// A failed send means that viewer's receiver is gone; it is skipped
    /// and delivery continues to the rest.
    pub fn broadcast(&self, event: &FeedEvent) {
        let subscribers: Vec<Subscriber> = {
            let map = self.inner.lock().unwrap();
            map.values().cloned().collect()
        };

        for subscriber in subscribers {
            if subscriber.sink.send(event.clone()).is_err() {
                debug!(subscriber = %subscriber.id, "dropping event for closed subscriber");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(status: &str) -> FeedEvent {
        FeedEvent::Update(StatusUpdate {
            service_id: "svc1".into(),
            service_name: "api".into(),
            project_name: "demo".into(),
            status: status.into(),
            at: "2026-08-07T00:00:00.000Z".into(),
        })
    }

    #[test]
    fn update_serializes_flat() {
        let json = serde_json::to_value(update("SUCCESS")).unwrap();
        assert_eq!(json["type"], "update");
        assert_eq!(json["serviceId"], "svc1");
        assert_eq!(json["serviceName"], "api");
        assert_eq!(json["projectName"], "demo");
        assert_eq!(json["status"], "SUCCESS");
    }

    #[test]
    fn init_nests_table_under_data() {
        let mut table = StatusTable::new();
        table.insert(
            "svc1".into(),
            crate::status::model::StatusRecord {
                project_name: "demo".into(),
                service_name: "api".into(),
                status: "SUCCESS".into(),
                at: "2026-08-07T00:00:00.000Z".into(),
                project_url: None,
            },
        );
        let json = serde_json::to_value(FeedEvent::Init { data: table }).unwrap();
        assert_eq!(json["type"], "init");
        assert_eq!(json["data"]["svc1"]["serviceName"], "api");
        // webhook-path records never carry a project URL on the wire
        assert!(json["data"]["svc1"].get("projectUrl").is_none());
    }

    #[tokio::test]
    async fn broadcast_reaches_all_subscribers_in_order() {
        let registry = SubscriberRegistry::new();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        registry.register(tx_a);
        registry.register(tx_b);

        for status in ["BUILDING", "DEPLOYING", "SUCCESS"] {
            registry.broadcast(&update(status));
        }

        for rx in [&mut rx_a, &mut rx_b] {
            for expected in ["BUILDING", "DEPLOYING", "SUCCESS"] {
                match rx.recv().await.unwrap() {
                    FeedEvent::Update(u) => assert_eq!(u.status, expected),
                    other => panic!("unexpected event: {:?}", other),
                }
            }
        }
    }

    #[tokio::test]
    async fn closed_subscriber_does_not_block_others() {
        let registry = SubscriberRegistry::new();
        let (tx_dead, rx_dead) = mpsc::unbounded_channel();
        let (tx_live, mut rx_live) = mpsc::unbounded_channel();
        registry.register(tx_dead);
        registry.register(tx_live);
        drop(rx_dead);

        registry.broadcast(&update("SUCCESS"));

        assert!(matches!(rx_live.recv().await, Some(FeedEvent::Update(_))));
    }

    #[test]
    fn unregister_is_idempotent() {
        let registry = SubscriberRegistry::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let id = registry.register(tx);
        assert_eq!(registry.len(), 1);

        registry.unregister(&id);
        registry.unregister(&id);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn unregistered_subscriber_receives_nothing_more() {
        let registry = SubscriberRegistry::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = registry.register(tx);

        registry.broadcast(&update("BUILDING"));
        registry.unregister(&id);
        registry.broadcast(&update("SUCCESS"));

        assert!(matches!(rx.recv().await, Some(FeedEvent::Update(u)) if u.status == "BUILDING"));
        // sender side was dropped on unregister, so the channel ends here
        assert!(rx.recv().await.is_none());
    }
}
