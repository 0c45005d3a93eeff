//! Consumer task draining the event channel into the delivery store.

use std::sync::Arc;

use channel::OrderReceiver;

use crate::service::DeliveryService;

/// Continuously polls the event channel and records each accepted order.
///
/// Runs on its own task, fully decoupled from the producer: a slow or failing
/// record never blocks the order side. A failed record is logged and the
/// message dropped; the channel performs no redelivery of its own.
pub struct DeliveryConsumer {
    service: Arc<DeliveryService>,
    receiver: OrderReceiver,
}

impl DeliveryConsumer {
    /// Creates a consumer over the receiving half of the channel.
    pub fn new(service: Arc<DeliveryService>, receiver: OrderReceiver) -> Self {
        Self { service, receiver }
    }

    /// Runs until the channel closes.
    pub async fn run(mut self) {
        while let Some(message) = self.receiver.recv().await {
            let order_id = message.id;
            if let Err(e) = self.service.record(message).await {
                tracing::error!(%order_id, error = %e, "failed to record delivery");
            }
        }
        tracing::info!("event channel closed, delivery consumer stopping");
    }
}
