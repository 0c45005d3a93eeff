//! Event channel between the order and delivery services.
//!
//! Accepted orders cross the service boundary only as [`OrderMessage`]
//! payloads. The channel is at-least-once and ordered per producer stream;
//! delivery status is implicit (a received order is always `Processing`) and
//! is not part of the payload.

pub mod message;
pub mod publisher;

pub use message::OrderMessage;
pub use publisher::{ChannelError, InMemoryOrderChannel, OrderPublisher, OrderReceiver};
