//! Read-time enrichment of listing rows with live directory data.
//!
//! Stored orders and deliveries carry only snapshots of the customer name and
//! product title; listings refresh both from the remote services. Each
//! distinct CPF and SKU on a page is fetched once and joined locally, so a
//! page of N rows costs at most one call per distinct key rather than 2×N.

use std::collections::HashMap;

use common::{Cpf, Sku};

use crate::error::Result;
use crate::gateway::DirectoryGateway;

/// A row that can receive live customer and product data.
pub trait Enrich {
    fn cpf(&self) -> &Cpf;
    fn sku(&self) -> &Sku;
    fn apply_customer_name(&mut self, name: &str);
    fn apply_product_title(&mut self, title: &str);
}

/// Fills customer names and product titles for a page of rows.
///
/// Gateway failures propagate unchanged, so a vanished product or an
/// unreachable service surfaces on the listing exactly as it would on a
/// single-row read.
pub async fn enrich_rows<T: Enrich>(gateway: &dyn DirectoryGateway, rows: &mut [T]) -> Result<()> {
    let mut names: HashMap<Cpf, String> = HashMap::new();
    let mut titles: HashMap<Sku, String> = HashMap::new();

    for row in rows.iter() {
        if !names.contains_key(row.cpf()) {
            let customer = gateway.customer_by_cpf(row.cpf()).await?;
            names.insert(row.cpf().clone(), customer.name);
        }
        if !titles.contains_key(row.sku()) {
            let product = gateway.product_by_sku(row.sku()).await?;
            titles.insert(row.sku().clone(), product.title);
        }
    }

    for row in rows.iter_mut() {
        if let Some(name) = names.get(row.cpf()).cloned() {
            row.apply_customer_name(&name);
        }
        if let Some(title) = titles.get(row.sku()).cloned() {
            row.apply_product_title(&title);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DirectoryError;
    use crate::gateway::{CustomerRecord, ProductRecord, ProductStatus};
    use crate::memory::InMemoryDirectory;
    use common::Money;

    #[derive(Debug)]
    struct TestRow {
        cpf: Cpf,
        sku: Sku,
        name: Option<String>,
        title: Option<String>,
    }

    impl TestRow {
        fn new(cpf: &str, sku: &str) -> Self {
            Self {
                cpf: Cpf::new(cpf),
                sku: Sku::new(sku),
                name: None,
                title: None,
            }
        }
    }

    impl Enrich for TestRow {
        fn cpf(&self) -> &Cpf {
            &self.cpf
        }

        fn sku(&self) -> &Sku {
            &self.sku
        }

        fn apply_customer_name(&mut self, name: &str) {
            self.name = Some(name.to_string());
        }

        fn apply_product_title(&mut self, title: &str) {
            self.title = Some(title.to_string());
        }
    }

    fn directory() -> InMemoryDirectory {
        let directory = InMemoryDirectory::new();
        directory.insert_customer(CustomerRecord::new("07021050070", "John Doe"));
        directory.insert_customer(CustomerRecord::new("12345678901", "Jane Roe"));
        directory.insert_product(ProductRecord::new(
            "MOUSE-2024-WL-0010",
            "Wireless Mouse",
            Money::from_cents(2999),
            10,
            ProductStatus::Active,
        ));
        directory
    }

    #[tokio::test]
    async fn test_rows_are_filled() {
        let directory = directory();
        let mut rows = vec![
            TestRow::new("07021050070", "MOUSE-2024-WL-0010"),
            TestRow::new("12345678901", "MOUSE-2024-WL-0010"),
        ];

        enrich_rows(&directory, &mut rows).await.unwrap();

        assert_eq!(rows[0].name.as_deref(), Some("John Doe"));
        assert_eq!(rows[0].title.as_deref(), Some("Wireless Mouse"));
        assert_eq!(rows[1].name.as_deref(), Some("Jane Roe"));
        assert_eq!(rows[1].title.as_deref(), Some("Wireless Mouse"));
    }

    #[tokio::test]
    async fn test_distinct_keys_fetched_once() {
        let directory = directory();
        let mut rows = vec![
            TestRow::new("07021050070", "MOUSE-2024-WL-0010"),
            TestRow::new("07021050070", "MOUSE-2024-WL-0010"),
            TestRow::new("07021050070", "MOUSE-2024-WL-0010"),
        ];

        enrich_rows(&directory, &mut rows).await.unwrap();

        assert_eq!(directory.customer_lookup_count(), 1);
        assert_eq!(directory.product_lookup_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_product_propagates() {
        let directory = directory();
        let mut rows = vec![TestRow::new("07021050070", "GONE-0001")];

        let result = enrich_rows(&directory, &mut rows).await;
        assert!(matches!(result, Err(DirectoryError::ProductNotFound(_))));
    }

    #[tokio::test]
    async fn test_service_down_propagates() {
        let directory = directory();
        directory.set_customers_down(true);
        let mut rows = vec![TestRow::new("07021050070", "MOUSE-2024-WL-0010")];

        let result = enrich_rows(&directory, &mut rows).await;
        assert!(matches!(
            result,
            Err(DirectoryError::ConnectionFailure {
                service: "customers"
            })
        ));
    }

    #[tokio::test]
    async fn test_empty_page_is_a_no_op() {
        let directory = directory();
        let mut rows: Vec<TestRow> = vec![];
        enrich_rows(&directory, &mut rows).await.unwrap();
        assert_eq!(directory.customer_lookup_count(), 0);
    }
}
