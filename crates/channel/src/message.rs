//! The order payload published on send.

use chrono::{DateTime, Utc};
use common::{Cpf, Money, OrderId, Sku};
use serde::{Deserialize, Serialize};

/// One message per sent order.
///
/// Carries everything the delivery service needs to open a fulfillment
/// record; the consumer never calls back into the order store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderMessage {
    pub id: OrderId,
    pub name: String,
    pub cpf: Cpf,
    pub title: String,
    pub sku: Sku,
    pub price: Money,
    pub quantity: u32,
    pub total: Money,
    pub date: DateTime<Utc>,
}
