//! Delivery side of the fulfillment bridge.
//!
//! A consumer task turns accepted-order events into `Processing` delivery
//! records. Deliveries then move along a terminal state machine
//! (`Processing → Shipped | Canceled`); cancellation compensates the order's
//! stock reservation by restoring remote product quantity.

pub mod consumer;
pub mod error;
pub mod model;
pub mod postgres;
pub mod service;
pub mod store;

pub use consumer::DeliveryConsumer;
pub use error::{DeliveryError, Result};
pub use model::{Delivery, DeliveryStatus};
pub use postgres::PostgresDeliveryStore;
pub use service::{CancelOutcome, DeliveryService};
pub use store::{DeliveryStore, InMemoryDeliveryStore};
