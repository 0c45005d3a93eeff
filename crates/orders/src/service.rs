//! Order orchestrator: validation, stock reservation and event hand-off.

use std::sync::Arc;

use channel::{OrderMessage, OrderPublisher};
use common::{Cpf, DateRange, OrderId, Sku};
use directory::{CustomerRecord, DirectoryGateway, ProductRecord, enrich_rows};

use crate::error::{OrderError, Result};
use crate::model::Order;
use crate::store::OrderStore;

/// Confirmation returned by a successful send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReceipt {
    pub order_id: OrderId,
}

impl std::fmt::Display for SendReceipt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "order {} sent for processing", self.order_id)
    }
}

/// Remote facts checked before any stock-affecting action.
struct ValidatedPurchase {
    customer: CustomerRecord,
    product: ProductRecord,
}

/// Coordinates order creation and dispatch against the remote directory.
///
/// The same validation routine runs at create time and again at send time:
/// remote state may have changed between the two, so both facts are always
/// re-checked before stock is touched.
pub struct OrderService {
    gateway: Arc<dyn DirectoryGateway>,
    store: Arc<dyn OrderStore>,
    publisher: Arc<dyn OrderPublisher>,
}

impl OrderService {
    /// Creates a new order service.
    pub fn new(
        gateway: Arc<dyn DirectoryGateway>,
        store: Arc<dyn OrderStore>,
        publisher: Arc<dyn OrderPublisher>,
    ) -> Self {
        Self {
            gateway,
            store,
            publisher,
        }
    }

    /// Validates the purchase and persists a new order with
    /// `processing = false`.
    #[tracing::instrument(skip(self))]
    pub async fn create(&self, cpf: Cpf, sku: Sku, quantity: u32) -> Result<Order> {
        let checked = self.validate(&cpf, &sku, quantity).await?;

        let order = Order::new(
            cpf,
            sku,
            checked.customer.name,
            checked.product.title,
            checked.product.price,
            quantity,
        );
        self.store.insert(&order).await?;

        metrics::counter!("orders_created_total").increment(1);
        tracing::info!(order_id = %order.id, total = %order.total, "order created");
        Ok(order)
    }

    /// Re-validates the order, reserves remote stock and hands the order to
    /// the event channel.
    ///
    /// Publication is fire-and-forget: its outcome is logged, never surfaced.
    /// If publication fails after the stock decrement committed, the stock
    /// stays reserved with no delivery record to show for it. That
    /// inconsistency window is a known property of this design.
    #[tracing::instrument(skip(self))]
    pub async fn send(&self, id: OrderId) -> Result<SendReceipt> {
        let order = self
            .store
            .get(id)
            .await?
            .ok_or(OrderError::OrderNotFound(id))?;

        if order.processing {
            return Err(OrderError::AlreadySent(id));
        }

        let checked = self
            .validate(&order.cpf, &order.sku, order.quantity)
            .await?;

        self.gateway
            .decrease_stock(&order.sku, order.quantity)
            .await?;
        self.store.mark_processing(id).await?;

        let message = OrderMessage {
            id,
            name: checked.customer.name,
            cpf: order.cpf,
            title: checked.product.title,
            sku: order.sku,
            price: order.unit_price,
            quantity: order.quantity,
            total: order.total,
            date: order.created_at,
        };
        let publisher = self.publisher.clone();
        tokio::spawn(async move {
            match publisher.publish(message).await {
                Ok(()) => tracing::info!(order_id = %id, "order event published"),
                Err(e) => {
                    tracing::error!(order_id = %id, error = %e, "order event publication failed");
                }
            }
        });

        metrics::counter!("orders_sent_total").increment(1);
        Ok(SendReceipt { order_id: id })
    }

    /// Loads a single order, refreshed with live directory data.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: OrderId) -> Result<Order> {
        let order = self
            .store
            .get(id)
            .await?
            .ok_or(OrderError::OrderNotFound(id))?;

        let mut rows = [order];
        enrich_rows(self.gateway.as_ref(), &mut rows).await?;
        let [order] = rows;
        Ok(order)
    }

    /// Lists orders within the date range, enriched with live names/titles.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self, range: DateRange) -> Result<Vec<Order>> {
        let mut orders = self.store.list(range).await?;
        enrich_rows(self.gateway.as_ref(), &mut orders).await?;
        Ok(orders)
    }

    /// Deletes an order by id.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: OrderId) -> Result<()> {
        if self.store.delete(id).await? {
            Ok(())
        } else {
            Err(OrderError::OrderNotFound(id))
        }
    }

    /// The shared validation routine behind both `create` and `send`.
    async fn validate(&self, cpf: &Cpf, sku: &Sku, quantity: u32) -> Result<ValidatedPurchase> {
        let customer = self.gateway.customer_by_cpf(cpf).await?;
        let product = self.gateway.product_by_sku(sku).await?;

        if quantity == 0 {
            return Err(OrderError::InvalidQuantity(
                "quantity must be greater than zero".to_string(),
            ));
        }
        if quantity > product.quantity {
            return Err(OrderError::InvalidQuantity(format!(
                "only {} units of {} available",
                product.quantity, sku
            )));
        }
        if !product.is_active() {
            return Err(OrderError::ProductUnavailable(sku.clone()));
        }

        Ok(ValidatedPurchase { customer, product })
    }
}
