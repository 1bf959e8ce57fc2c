//! In-process event bus for the dorama catalog.
//!
//! - [`EventBus`]: publish/subscribe hub backed by `tokio::sync::broadcast`.
//! - [`AppEvent`]: the typed notifications views subscribe to.
//!
//! Subscribing returns a receiver; dropping it unsubscribes.

pub mod bus;

pub use bus::{AppEvent, EventBus, EventEnvelope};
