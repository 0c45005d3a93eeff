//! Publisher trait and the in-memory channel implementation.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::message::OrderMessage;

/// Errors that can occur while publishing to the channel.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// No consumer is attached to the channel any more.
    #[error("event channel is closed")]
    Closed,
}

/// Publishes accepted orders onto the event channel.
#[async_trait]
pub trait OrderPublisher: Send + Sync {
    /// Hands an order message to the channel.
    ///
    /// Returning `Ok` means the channel accepted the message, not that the
    /// consumer has processed it.
    async fn publish(&self, message: OrderMessage) -> Result<(), ChannelError>;
}

/// Receiving half of the in-memory channel, owned by the consumer task.
pub type OrderReceiver = mpsc::UnboundedReceiver<OrderMessage>;

/// In-memory, in-process event channel.
///
/// A single unbounded queue per producer/consumer pair, so messages from one
/// producer stream arrive in publication order. Redelivery does not occur on
/// this transport, but consumers must still tolerate it: the channel contract
/// is at-least-once.
#[derive(Debug, Clone)]
pub struct InMemoryOrderChannel {
    tx: mpsc::UnboundedSender<OrderMessage>,
}

impl InMemoryOrderChannel {
    /// Creates the channel, returning the publishing half and the receiver
    /// to hand to the consumer.
    pub fn new() -> (Self, OrderReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl OrderPublisher for InMemoryOrderChannel {
    async fn publish(&self, message: OrderMessage) -> Result<(), ChannelError> {
        self.tx.send(message).map_err(|_| ChannelError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::{Cpf, Money, OrderId, Sku};

    fn message(quantity: u32) -> OrderMessage {
        OrderMessage {
            id: OrderId::new(),
            name: "John Doe".to_string(),
            cpf: Cpf::new("07021050070"),
            title: "Wireless Mouse".to_string(),
            sku: Sku::new("MOUSE-2024-WL-0010"),
            price: Money::from_cents(2999),
            quantity,
            total: Money::from_cents(2999).multiply(quantity),
            date: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_publish_and_receive() {
        let (channel, mut rx) = InMemoryOrderChannel::new();
        let sent = message(2);

        channel.publish(sent.clone()).await.unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received, sent);
    }

    #[tokio::test]
    async fn test_messages_arrive_in_publication_order() {
        let (channel, mut rx) = InMemoryOrderChannel::new();

        for quantity in 1..=5 {
            channel.publish(message(quantity)).await.unwrap();
        }

        for quantity in 1..=5 {
            assert_eq!(rx.recv().await.unwrap().quantity, quantity);
        }
    }

    #[tokio::test]
    async fn test_publish_after_consumer_dropped_is_closed() {
        let (channel, rx) = InMemoryOrderChannel::new();
        drop(rx);

        let result = channel.publish(message(1)).await;
        assert!(matches!(result, Err(ChannelError::Closed)));
    }
}
