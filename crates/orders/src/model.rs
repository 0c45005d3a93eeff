//! The order record.

use chrono::{DateTime, Utc};
use common::{Cpf, Money, OrderId, Sku};
use directory::Enrich;
use serde::{Deserialize, Serialize};

/// A pending purchase awaiting stock reservation and hand-off.
///
/// `customer_name` and `product_title` are snapshots taken at creation time;
/// listings refresh them from the live services. Once `processing` is true
/// the record is immutable except for deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub cpf: Cpf,
    pub sku: Sku,
    pub customer_name: Option<String>,
    pub product_title: Option<String>,
    pub unit_price: Money,
    pub quantity: u32,
    pub total: Money,
    pub processing: bool,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Creates a new order with `total = unit_price * quantity` and
    /// `processing = false`.
    pub fn new(
        cpf: Cpf,
        sku: Sku,
        customer_name: impl Into<String>,
        product_title: impl Into<String>,
        unit_price: Money,
        quantity: u32,
    ) -> Self {
        Self {
            id: OrderId::new(),
            cpf,
            sku,
            customer_name: Some(customer_name.into()),
            product_title: Some(product_title.into()),
            unit_price,
            quantity,
            total: unit_price.multiply(quantity),
            processing: false,
            created_at: Utc::now(),
        }
    }
}

impl Enrich for Order {
    fn cpf(&self) -> &Cpf {
        &self.cpf
    }

    fn sku(&self) -> &Sku {
        &self.sku
    }

    fn apply_customer_name(&mut self, name: &str) {
        self.customer_name = Some(name.to_string());
    }

    fn apply_product_title(&mut self, title: &str) {
        self.product_title = Some(title.to_string());
    }
}
