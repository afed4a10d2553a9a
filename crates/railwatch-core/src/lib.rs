//! Railwatch Core Library
//!
//! Domain models and relay logic for the deployment status relay.

pub mod feed;
pub mod relay;
pub mod status;

pub use relay::{FetchState, Relay};
