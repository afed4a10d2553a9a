//! Application state.

use railwatch_core::Relay;
use std::sync::Arc;

/// Application state shared across handlers.
///
/// The relay is the single owner of the status table and the subscriber
/// set; handlers go through it rather than touching globals.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
}

impl AppState {
    pub fn new(relay: Arc<Relay>) -> Self {
        Self { relay }
    }
}
