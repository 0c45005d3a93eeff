//! Gateway trait and the records returned by the remote services.

use async_trait::async_trait;
use common::{Cpf, Money, Sku};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Customer record as served by the customer service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub cpf: Cpf,
    pub name: String,
}

impl CustomerRecord {
    /// Creates a customer record.
    pub fn new(cpf: impl Into<Cpf>, name: impl Into<String>) -> Self {
        Self {
            cpf: cpf.into(),
            name: name.into(),
        }
    }
}

/// Sale status of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Active,
    Inactive,
}

/// Product record as served by the product service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub sku: Sku,
    pub title: String,
    pub price: Money,
    pub quantity: u32,
    pub status: ProductStatus,
}

impl ProductRecord {
    /// Creates a product record.
    pub fn new(
        sku: impl Into<Sku>,
        title: impl Into<String>,
        price: Money,
        quantity: u32,
        status: ProductStatus,
    ) -> Self {
        Self {
            sku: sku.into(),
            title: title.into(),
            price,
            quantity,
            status,
        }
    }

    /// Returns true if the product can be sold.
    pub fn is_active(&self) -> bool {
        self.status == ProductStatus::Active
    }
}

/// One method per remote capability consumed by the fulfillment services.
///
/// Implementations translate every raw outcome into [`crate::DirectoryError`]
/// before returning, so orchestration code only ever handles the domain
/// taxonomy.
#[async_trait]
pub trait DirectoryGateway: Send + Sync {
    /// Looks up a customer by CPF.
    async fn customer_by_cpf(&self, cpf: &Cpf) -> Result<CustomerRecord>;

    /// Looks up a product by SKU.
    async fn product_by_sku(&self, sku: &Sku) -> Result<ProductRecord>;

    /// Decrements remote stock, reserving units for an order.
    async fn decrease_stock(&self, sku: &Sku, quantity: u32) -> Result<()>;

    /// Increments remote stock, restoring units from a canceled order.
    async fn increase_stock(&self, sku: &Sku, quantity: u32) -> Result<()>;

    /// Checks whether the product has units left.
    ///
    /// The remote contract exposes no dedicated availability endpoint, so
    /// this is derived from the product lookup and shares its failure modes.
    async fn check_availability(&self, sku: &Sku) -> Result<bool> {
        Ok(self.product_by_sku(sku).await?.quantity > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_is_active() {
        let product = ProductRecord::new(
            "SKU-001",
            "Widget",
            Money::from_cents(1000),
            5,
            ProductStatus::Active,
        );
        assert!(product.is_active());

        let inactive = ProductRecord {
            status: ProductStatus::Inactive,
            ..product
        };
        assert!(!inactive.is_active());
    }

    #[test]
    fn test_product_status_serialization() {
        assert_eq!(
            serde_json::to_string(&ProductStatus::Active).unwrap(),
            "\"active\""
        );
        let status: ProductStatus = serde_json::from_str("\"inactive\"").unwrap();
        assert_eq!(status, ProductStatus::Inactive);
    }

    #[test]
    fn test_customer_record_serialization_roundtrip() {
        let customer = CustomerRecord::new("07021050070", "John Doe");
        let json = serde_json::to_string(&customer).unwrap();
        let deserialized: CustomerRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(customer, deserialized);
    }
}
