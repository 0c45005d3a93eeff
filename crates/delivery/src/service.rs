//! Delivery operations: recording, shipping, cancellation and cleanup.

use std::sync::Arc;

use channel::OrderMessage;
use common::{DateRange, OrderId};
use directory::{DirectoryError, DirectoryGateway, enrich_rows};

use crate::error::{DeliveryError, Result};
use crate::model::{Delivery, DeliveryStatus};
use crate::store::DeliveryStore;

/// Outcome of a successful cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The delivery was canceled and the product stock restored.
    Canceled,

    /// The delivery was canceled, but the product no longer exists so its
    /// stock could not be restored.
    CanceledWithoutRestock,
}

/// Drives the delivery state machine and its compensating stock restore.
pub struct DeliveryService {
    gateway: Arc<dyn DirectoryGateway>,
    store: Arc<dyn DeliveryStore>,
}

impl DeliveryService {
    /// Creates a new delivery service.
    pub fn new(gateway: Arc<dyn DirectoryGateway>, store: Arc<dyn DeliveryStore>) -> Self {
        Self { gateway, store }
    }

    /// Records an incoming order event as a `Processing` delivery.
    ///
    /// The channel is at-least-once, so recording is keyed on the originating
    /// order id: a redelivered event is ignored rather than duplicated.
    /// Returns true if a new delivery was opened.
    #[tracing::instrument(skip(self, message), fields(order_id = %message.id))]
    pub async fn record(&self, message: OrderMessage) -> Result<bool> {
        let delivery = Delivery::from_message(message);
        let inserted = self.store.insert_if_absent(&delivery).await?;

        if inserted {
            metrics::counter!("deliveries_recorded_total").increment(1);
            tracing::info!(delivery_id = %delivery.id, "delivery opened");
        } else {
            tracing::warn!(delivery_id = %delivery.id, "duplicate order event ignored");
        }
        Ok(inserted)
    }

    /// Transitions a delivery to `Shipped`.
    #[tracing::instrument(skip(self))]
    pub async fn mark_shipped(&self, id: OrderId) -> Result<Delivery> {
        let mut delivery = self
            .store
            .get(id)
            .await?
            .ok_or(DeliveryError::DeliveryNotFound(id))?;

        match delivery.status {
            DeliveryStatus::Shipped => Err(DeliveryError::AlreadyShipped(id)),
            DeliveryStatus::Canceled => Err(DeliveryError::AlreadyCanceled(id)),
            DeliveryStatus::Processing => {
                self.store.set_status(id, DeliveryStatus::Shipped).await?;
                delivery.status = DeliveryStatus::Shipped;
                metrics::counter!("deliveries_shipped_total").increment(1);
                tracing::info!(delivery_id = %id, "delivery shipped");
                Ok(delivery)
            }
        }
    }

    /// Cancels a delivery, restoring the reserved product stock.
    ///
    /// The product service must be reachable: a connection failure blocks the
    /// cancellation with the record unchanged. A product that has vanished
    /// does not: the delivery is still canceled and the outcome reports the
    /// stock was not restored.
    #[tracing::instrument(skip(self))]
    pub async fn cancel(&self, id: OrderId) -> Result<CancelOutcome> {
        let delivery = self
            .store
            .get(id)
            .await?
            .ok_or(DeliveryError::DeliveryNotFound(id))?;

        match delivery.status {
            DeliveryStatus::Canceled => Err(DeliveryError::AlreadyCanceled(id)),
            DeliveryStatus::Shipped => Err(DeliveryError::AlreadyShipped(id)),
            DeliveryStatus::Processing => {
                match self.gateway.check_availability(&delivery.sku).await {
                    Err(DirectoryError::ProductNotFound(_)) => {
                        self.finish_cancel(id, false).await
                    }
                    Err(e) => Err(e.into()),
                    Ok(_) => {
                        match self
                            .gateway
                            .increase_stock(&delivery.sku, delivery.quantity)
                            .await
                        {
                            Ok(()) => self.finish_cancel(id, true).await,
                            Err(DirectoryError::ProductNotFound(_)) => {
                                self.finish_cancel(id, false).await
                            }
                            Err(e) => Err(e.into()),
                        }
                    }
                }
            }
        }
    }

    async fn finish_cancel(&self, id: OrderId, restocked: bool) -> Result<CancelOutcome> {
        self.store.set_status(id, DeliveryStatus::Canceled).await?;
        metrics::counter!("deliveries_canceled_total").increment(1);

        if restocked {
            tracing::info!(delivery_id = %id, "delivery canceled, stock restored");
            Ok(CancelOutcome::Canceled)
        } else {
            tracing::warn!(delivery_id = %id, "delivery canceled, product gone, stock not restored");
            Ok(CancelOutcome::CanceledWithoutRestock)
        }
    }

    /// Loads a single delivery, refreshed with live directory data.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: OrderId) -> Result<Delivery> {
        let delivery = self
            .store
            .get(id)
            .await?
            .ok_or(DeliveryError::DeliveryNotFound(id))?;

        let mut rows = [delivery];
        enrich_rows(self.gateway.as_ref(), &mut rows).await?;
        let [delivery] = rows;
        Ok(delivery)
    }

    /// Lists deliveries within the date range, enriched with live
    /// names/titles.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self, range: DateRange) -> Result<Vec<Delivery>> {
        let mut deliveries = self.store.list(range).await?;
        enrich_rows(self.gateway.as_ref(), &mut deliveries).await?;
        Ok(deliveries)
    }

    /// Deletes a delivery by id.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: OrderId) -> Result<()> {
        if self.store.delete(id).await? {
            Ok(())
        } else {
            Err(DeliveryError::DeliveryNotFound(id))
        }
    }

    /// Removes every canceled delivery.
    ///
    /// Finding nothing to remove is reported as an error, matching the rest
    /// of the not-found surface.
    #[tracing::instrument(skip(self))]
    pub async fn delete_canceled(&self) -> Result<u64> {
        let removed = self.store.delete_canceled().await?;
        if removed == 0 {
            return Err(DeliveryError::NoCanceledDeliveries);
        }
        tracing::info!(removed, "canceled deliveries purged");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryDeliveryStore;
    use channel::OrderMessage;
    use chrono::Utc;
    use common::{Cpf, Money, Sku};
    use directory::{CustomerRecord, InMemoryDirectory, ProductRecord, ProductStatus};

    fn message() -> OrderMessage {
        OrderMessage {
            id: OrderId::new(),
            name: "John Doe".to_string(),
            cpf: Cpf::new("07021050070"),
            title: "Wireless Mouse".to_string(),
            sku: Sku::new("MOUSE-2024-WL-0010"),
            price: Money::from_cents(2999),
            quantity: 10,
            total: Money::from_cents(29990),
            date: Utc::now(),
        }
    }

    fn setup() -> (DeliveryService, InMemoryDirectory, InMemoryDeliveryStore) {
        let directory = InMemoryDirectory::new();
        directory.insert_customer(CustomerRecord::new("07021050070", "John Doe"));
        // Stock already reserved by the order side: 0 units left.
        directory.insert_product(ProductRecord::new(
            "MOUSE-2024-WL-0010",
            "Wireless Mouse",
            Money::from_cents(2999),
            0,
            ProductStatus::Active,
        ));

        let store = InMemoryDeliveryStore::new();
        let service = DeliveryService::new(Arc::new(directory.clone()), Arc::new(store.clone()));
        (service, directory, store)
    }

    #[tokio::test]
    async fn test_record_opens_processing_delivery() {
        let (service, _, store) = setup();
        let message = message();
        let id = message.id;

        assert!(service.record(message).await.unwrap());

        let delivery = store.get(id).await.unwrap().unwrap();
        assert_eq!(delivery.status, DeliveryStatus::Processing);
        assert_eq!(delivery.total, Money::from_cents(29990));
    }

    #[tokio::test]
    async fn test_record_is_idempotent_per_order() {
        let (service, _, store) = setup();
        let message = message();

        assert!(service.record(message.clone()).await.unwrap());
        assert!(!service.record(message).await.unwrap());
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn test_mark_shipped() {
        let (service, _, _) = setup();
        let message = message();
        let id = message.id;
        service.record(message).await.unwrap();

        let delivery = service.mark_shipped(id).await.unwrap();
        assert_eq!(delivery.status, DeliveryStatus::Shipped);

        let again = service.mark_shipped(id).await;
        assert!(matches!(again, Err(DeliveryError::AlreadyShipped(_))));
    }

    #[tokio::test]
    async fn test_mark_shipped_on_canceled_is_rejected() {
        let (service, _, _) = setup();
        let message = message();
        let id = message.id;
        service.record(message).await.unwrap();
        service.cancel(id).await.unwrap();

        let result = service.mark_shipped(id).await;
        assert!(matches!(result, Err(DeliveryError::AlreadyCanceled(_))));
    }

    #[tokio::test]
    async fn test_cancel_restores_stock_exactly_once() {
        let (service, directory, store) = setup();
        let message = message();
        let id = message.id;
        let sku = message.sku.clone();
        service.record(message).await.unwrap();

        let outcome = service.cancel(id).await.unwrap();
        assert_eq!(outcome, CancelOutcome::Canceled);
        assert_eq!(directory.product_quantity(&sku), Some(10));
        assert_eq!(directory.increase_count(), 1);
        assert_eq!(
            store.get(id).await.unwrap().unwrap().status,
            DeliveryStatus::Canceled
        );

        let again = service.cancel(id).await;
        assert!(matches!(again, Err(DeliveryError::AlreadyCanceled(_))));
        assert_eq!(directory.increase_count(), 1);
    }

    #[tokio::test]
    async fn test_cancel_on_shipped_is_rejected() {
        let (service, directory, _) = setup();
        let message = message();
        let id = message.id;
        service.record(message).await.unwrap();
        service.mark_shipped(id).await.unwrap();

        let result = service.cancel(id).await;
        assert!(matches!(result, Err(DeliveryError::AlreadyShipped(_))));
        assert_eq!(directory.increase_count(), 0);
    }

    #[tokio::test]
    async fn test_cancel_blocked_while_products_down() {
        let (service, directory, store) = setup();
        let message = message();
        let id = message.id;
        service.record(message).await.unwrap();

        directory.set_products_down(true);

        let result = service.cancel(id).await;
        assert!(matches!(
            result,
            Err(DeliveryError::Directory(DirectoryError::ConnectionFailure {
                service: "products"
            }))
        ));
        assert_eq!(
            store.get(id).await.unwrap().unwrap().status,
            DeliveryStatus::Processing
        );
        assert_eq!(directory.increase_count(), 0);
    }

    #[tokio::test]
    async fn test_cancel_with_vanished_product_still_cancels() {
        let (service, directory, store) = setup();
        let mut message = message();
        message.sku = Sku::new("GONE-0001");
        let id = message.id;
        service.record(message).await.unwrap();

        let outcome = service.cancel(id).await.unwrap();
        assert_eq!(outcome, CancelOutcome::CanceledWithoutRestock);
        assert_eq!(
            store.get(id).await.unwrap().unwrap().status,
            DeliveryStatus::Canceled
        );
        assert_eq!(directory.increase_count(), 0);
    }

    #[tokio::test]
    async fn test_cancel_unknown_delivery() {
        let (service, _, _) = setup();
        let result = service.cancel(OrderId::new()).await;
        assert!(matches!(result, Err(DeliveryError::DeliveryNotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_canceled_requires_candidates() {
        let (service, _, store) = setup();

        let result = service.delete_canceled().await;
        assert!(matches!(result, Err(DeliveryError::NoCanceledDeliveries)));

        let message = message();
        let id = message.id;
        service.record(message).await.unwrap();
        service.cancel(id).await.unwrap();

        assert_eq!(service.delete_canceled().await.unwrap(), 1);
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn test_list_enriches_rows() {
        let (service, directory, _) = setup();
        let message = message();
        service.record(message).await.unwrap();

        directory.insert_product(ProductRecord::new(
            "MOUSE-2024-WL-0010",
            "Wireless Mouse v2",
            Money::from_cents(2999),
            0,
            ProductStatus::Active,
        ));

        let rows = service.list(DateRange::unbounded()).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].product_title.as_deref(), Some("Wireless Mouse v2"));
        assert_eq!(rows[0].customer_name.as_deref(), Some("John Doe"));
    }
}
