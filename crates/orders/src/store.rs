//! Order store trait and the in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{DateRange, OrderId};
use tokio::sync::RwLock;

use crate::error::Result;
use crate::model::Order;

/// Persistence seam for orders.
///
/// The store is deliberately dumb: the `processing` transition rule is
/// enforced by the orchestrator, not here.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists a new order.
    async fn insert(&self, order: &Order) -> Result<()>;

    /// Loads an order by id.
    async fn get(&self, id: OrderId) -> Result<Option<Order>>;

    /// Lists orders within the creation-date range, oldest first.
    async fn list(&self, range: DateRange) -> Result<Vec<Order>>;

    /// Flags an order as sent.
    async fn mark_processing(&self, id: OrderId) -> Result<()>;

    /// Removes an order; returns false if it did not exist.
    async fn delete(&self, id: OrderId) -> Result<bool>;
}

/// In-memory order store for testing and default wiring.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl InMemoryOrderStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored orders.
    pub async fn count(&self) -> usize {
        self.orders.read().await.len()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: &Order) -> Result<()> {
        self.orders.write().await.insert(order.id, order.clone());
        Ok(())
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn list(&self, range: DateRange) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut rows: Vec<Order> = orders
            .values()
            .filter(|o| range.contains(o.created_at))
            .cloned()
            .collect();
        rows.sort_by_key(|o| o.created_at);
        Ok(rows)
    }

    async fn mark_processing(&self, id: OrderId) -> Result<()> {
        if let Some(order) = self.orders.write().await.get_mut(&id) {
            order.processing = true;
        }
        Ok(())
    }

    async fn delete(&self, id: OrderId) -> Result<bool> {
        Ok(self.orders.write().await.remove(&id).is_some())
    }
}
