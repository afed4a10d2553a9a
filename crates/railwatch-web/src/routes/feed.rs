//! Live feed route handler.
//!
//! Each viewer gets a long-lived SSE stream: one `init` snapshot event,
//! then every update as it is ingested.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::future;
use futures::stream::{self, Stream, StreamExt};
use railwatch_core::feed::FeedEvent;
use railwatch_core::Relay;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{error, info};
use uuid::Uuid;

use crate::state::AppState;

/// Unregisters the subscriber when the viewer's stream is dropped, whichever
/// end closed the connection.
struct FeedGuard {
    relay: Arc<Relay>,
    id: Uuid,
}

impl Drop for FeedGuard {
    fn drop(&mut self) {
        self.relay.unsubscribe(&self.id);
        info!(subscriber = %self.id, "live feed viewer disconnected");
    }
}

/// The per-viewer event sequence: one init snapshot, then live updates.
///
/// Dropping the returned stream unregisters the viewer.
fn feed_stream(relay: Arc<Relay>) -> impl Stream<Item = FeedEvent> + Send + 'static {
    let (id, rx, snapshot) = relay.subscribe();
    info!(subscriber = %id, "live feed viewer connected");

    let guard = FeedGuard { relay, id };

    stream::once(future::ready(FeedEvent::Init { data: snapshot }))
        .chain(UnboundedReceiverStream::new(rx))
        .map(move |event| {
            // the closure owns the guard, tying deregistration to stream drop
            let _guard = &guard;
            event
        })
}

/// GET /events - Open the live feed.
pub async fn open_feed(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let events = feed_stream(state.relay.clone()).map(|event| {
        let sse = Event::default().json_data(&event).unwrap_or_else(|e| {
            error!(error = %e, "failed to serialize feed event");
            Event::default().data("{}")
        });
        Ok(sse)
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}
