//! Delivery store trait and the in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{DateRange, OrderId};
use tokio::sync::RwLock;

use crate::error::Result;
use crate::model::{Delivery, DeliveryStatus};

/// Persistence seam for deliveries.
#[async_trait]
pub trait DeliveryStore: Send + Sync {
    /// Persists a delivery unless one already exists for the order id.
    ///
    /// Returns true if the row was inserted. The first write wins: this is
    /// what makes consumption of the at-least-once channel idempotent.
    async fn insert_if_absent(&self, delivery: &Delivery) -> Result<bool>;

    /// Loads a delivery by id.
    async fn get(&self, id: OrderId) -> Result<Option<Delivery>>;

    /// Lists deliveries within the creation-date range, oldest first.
    async fn list(&self, range: DateRange) -> Result<Vec<Delivery>>;

    /// Updates the status of a delivery.
    async fn set_status(&self, id: OrderId, status: DeliveryStatus) -> Result<()>;

    /// Removes a delivery; returns false if it did not exist.
    async fn delete(&self, id: OrderId) -> Result<bool>;

    /// Removes every canceled delivery, returning how many were removed.
    async fn delete_canceled(&self) -> Result<u64>;
}

/// In-memory delivery store for testing and default wiring.
#[derive(Clone, Default)]
pub struct InMemoryDeliveryStore {
    deliveries: Arc<RwLock<HashMap<OrderId, Delivery>>>,
}

impl InMemoryDeliveryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored deliveries.
    pub async fn count(&self) -> usize {
        self.deliveries.read().await.len()
    }
}

#[async_trait]
impl DeliveryStore for InMemoryDeliveryStore {
    async fn insert_if_absent(&self, delivery: &Delivery) -> Result<bool> {
        let mut deliveries = self.deliveries.write().await;
        if deliveries.contains_key(&delivery.id) {
            return Ok(false);
        }
        deliveries.insert(delivery.id, delivery.clone());
        Ok(true)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Delivery>> {
        Ok(self.deliveries.read().await.get(&id).cloned())
    }

    async fn list(&self, range: DateRange) -> Result<Vec<Delivery>> {
        let deliveries = self.deliveries.read().await;
        let mut rows: Vec<Delivery> = deliveries
            .values()
            .filter(|d| range.contains(d.created_at))
            .cloned()
            .collect();
        rows.sort_by_key(|d| d.created_at);
        Ok(rows)
    }

    async fn set_status(&self, id: OrderId, status: DeliveryStatus) -> Result<()> {
        if let Some(delivery) = self.deliveries.write().await.get_mut(&id) {
            delivery.status = status;
        }
        Ok(())
    }

    async fn delete(&self, id: OrderId) -> Result<bool> {
        Ok(self.deliveries.write().await.remove(&id).is_some())
    }

    async fn delete_canceled(&self) -> Result<u64> {
        let mut deliveries = self.deliveries.write().await;
        let before = deliveries.len();
        deliveries.retain(|_, d| d.status != DeliveryStatus::Canceled);
        Ok((before - deliveries.len()) as u64)
    }
}
