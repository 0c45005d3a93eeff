//! Order side of the fulfillment bridge.
//!
//! Orders are created against live customer and product data, then explicitly
//! sent: sending re-validates both facts, reserves remote stock and hands the
//! order to the event channel for the delivery service to consume.

pub mod error;
pub mod model;
pub mod postgres;
pub mod service;
pub mod store;

pub use error::{OrderError, Result};
pub use model::Order;
pub use postgres::PostgresOrderStore;
pub use service::{OrderService, SendReceipt};
pub use store::{InMemoryOrderStore, OrderStore};
