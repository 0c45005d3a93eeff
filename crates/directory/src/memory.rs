//! In-memory directory implementation for testing.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{Cpf, Sku};

use crate::error::{DirectoryError, Result};
use crate::gateway::{CustomerRecord, DirectoryGateway, ProductRecord};

#[derive(Debug, Default)]
struct DirectoryState {
    customers: HashMap<Cpf, CustomerRecord>,
    products: HashMap<Sku, ProductRecord>,
    customers_down: bool,
    products_down: bool,
    customer_lookups: usize,
    product_lookups: usize,
    decrease_calls: Vec<(Sku, u32)>,
    increase_calls: Vec<(Sku, u32)>,
}

/// In-memory stand-in for both remote services.
///
/// Provides the same failure surface as the HTTP adapter: unknown keys map to
/// the not-found variants and the `set_*_down` switches simulate a 503.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    state: Arc<RwLock<DirectoryState>>,
}

impl InMemoryDirectory {
    /// Creates an empty in-memory directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a customer.
    pub fn insert_customer(&self, customer: CustomerRecord) {
        let mut state = self.state.write().unwrap();
        state.customers.insert(customer.cpf.clone(), customer);
    }

    /// Registers a product.
    pub fn insert_product(&self, product: ProductRecord) {
        let mut state = self.state.write().unwrap();
        state.products.insert(product.sku.clone(), product);
    }

    /// Simulates the customer service being down.
    pub fn set_customers_down(&self, down: bool) {
        self.state.write().unwrap().customers_down = down;
    }

    /// Simulates the product service being down.
    pub fn set_products_down(&self, down: bool) {
        self.state.write().unwrap().products_down = down;
    }

    /// Returns the current stock of a product, if registered.
    pub fn product_quantity(&self, sku: &Sku) -> Option<u32> {
        self.state
            .read()
            .unwrap()
            .products
            .get(sku)
            .map(|p| p.quantity)
    }

    /// Number of `decrease_stock` calls made.
    pub fn decrease_count(&self) -> usize {
        self.state.read().unwrap().decrease_calls.len()
    }

    /// Number of `increase_stock` calls made.
    pub fn increase_count(&self) -> usize {
        self.state.read().unwrap().increase_calls.len()
    }

    /// Number of customer lookups served.
    pub fn customer_lookup_count(&self) -> usize {
        self.state.read().unwrap().customer_lookups
    }

    /// Number of product lookups served.
    pub fn product_lookup_count(&self) -> usize {
        self.state.read().unwrap().product_lookups
    }
}

#[async_trait]
impl DirectoryGateway for InMemoryDirectory {
    async fn customer_by_cpf(&self, cpf: &Cpf) -> Result<CustomerRecord> {
        let mut state = self.state.write().unwrap();
        if state.customers_down {
            return Err(DirectoryError::ConnectionFailure {
                service: "customers",
            });
        }
        state.customer_lookups += 1;
        state
            .customers
            .get(cpf)
            .cloned()
            .ok_or_else(|| DirectoryError::CustomerNotFound(cpf.clone()))
    }

    async fn product_by_sku(&self, sku: &Sku) -> Result<ProductRecord> {
        let mut state = self.state.write().unwrap();
        if state.products_down {
            return Err(DirectoryError::ConnectionFailure {
                service: "products",
            });
        }
        state.product_lookups += 1;
        state
            .products
            .get(sku)
            .cloned()
            .ok_or_else(|| DirectoryError::ProductNotFound(sku.clone()))
    }

    async fn decrease_stock(&self, sku: &Sku, quantity: u32) -> Result<()> {
        let mut state = self.state.write().unwrap();
        if state.products_down {
            return Err(DirectoryError::ConnectionFailure {
                service: "products",
            });
        }
        let Some(product) = state.products.get_mut(sku) else {
            return Err(DirectoryError::ProductNotFound(sku.clone()));
        };
        product.quantity = product.quantity.saturating_sub(quantity);
        state.decrease_calls.push((sku.clone(), quantity));
        Ok(())
    }

    async fn increase_stock(&self, sku: &Sku, quantity: u32) -> Result<()> {
        let mut state = self.state.write().unwrap();
        if state.products_down {
            return Err(DirectoryError::ConnectionFailure {
                service: "products",
            });
        }
        let Some(product) = state.products.get_mut(sku) else {
            return Err(DirectoryError::ProductNotFound(sku.clone()));
        };
        product.quantity += quantity;
        state.increase_calls.push((sku.clone(), quantity));
        Ok(())
    }
}
