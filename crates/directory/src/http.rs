//! reqwest-based adapter for the remote customer and product services.

use std::sync::Arc;

use async_trait::async_trait;
use common::{Cpf, Sku};
use reqwest::StatusCode;

use crate::error::{DirectoryError, Result};
use crate::gateway::{CustomerRecord, DirectoryGateway, ProductRecord};
use crate::token::TokenCache;

/// HTTP implementation of [`DirectoryGateway`].
///
/// Every call attaches the current bearer token from the shared
/// [`TokenCache`]. The `reqwest::Client` is expected to carry a bounded
/// request timeout; a timed-out call is reported the same way as a 503.
pub struct HttpDirectoryGateway {
    http: reqwest::Client,
    customers_url: String,
    products_url: String,
    tokens: Arc<TokenCache>,
}

impl HttpDirectoryGateway {
    /// Creates a gateway against the given service base URLs.
    pub fn new(
        http: reqwest::Client,
        customers_url: impl Into<String>,
        products_url: impl Into<String>,
        tokens: Arc<TokenCache>,
    ) -> Self {
        Self {
            http,
            customers_url: trim_base(customers_url.into()),
            products_url: trim_base(products_url.into()),
            tokens,
        }
    }

    async fn send_authorized(
        &self,
        service: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response> {
        let auth = self.tokens.authorization_header().await?;
        request
            .header(reqwest::header::AUTHORIZATION, auth)
            .send()
            .await
            .map_err(|e| translate_transport(service, &e))
    }

    /// Sends a stock mutation PATCH and translates the empty response.
    async fn patch_stock(&self, url: String) -> Result<()> {
        let response = self
            .send_authorized("products", self.http.patch(&url))
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        Err(translate_status("products", status, || {
            DirectoryError::ProductNotFound(sku_from_url(&url))
        }))
    }
}

#[async_trait]
impl DirectoryGateway for HttpDirectoryGateway {
    async fn customer_by_cpf(&self, cpf: &Cpf) -> Result<CustomerRecord> {
        let url = format!("{}/customers/cpf/{}", self.customers_url, cpf);
        let response = self
            .send_authorized("customers", self.http.get(&url))
            .await?;

        let status = response.status();
        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| DirectoryError::Unknown(e.to_string()));
        }
        Err(translate_status("customers", status, || {
            DirectoryError::CustomerNotFound(cpf.clone())
        }))
    }

    async fn product_by_sku(&self, sku: &Sku) -> Result<ProductRecord> {
        let url = format!("{}/products/sku/{}", self.products_url, sku);
        let response = self
            .send_authorized("products", self.http.get(&url))
            .await?;

        let status = response.status();
        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| DirectoryError::Unknown(e.to_string()));
        }
        Err(translate_status("products", status, || {
            DirectoryError::ProductNotFound(sku.clone())
        }))
    }

    async fn decrease_stock(&self, sku: &Sku, quantity: u32) -> Result<()> {
        let url = format!("{}/products/sku/{}/sub/{}", self.products_url, sku, quantity);
        self.patch_stock(url).await
    }

    async fn increase_stock(&self, sku: &Sku, quantity: u32) -> Result<()> {
        let url = format!("{}/products/sku/{}/add/{}", self.products_url, sku, quantity);
        self.patch_stock(url).await
    }
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

/// Maps an unsuccessful HTTP status to the domain taxonomy.
fn translate_status(
    service: &'static str,
    status: StatusCode,
    on_missing: impl FnOnce() -> DirectoryError,
) -> DirectoryError {
    match status {
        StatusCode::NOT_FOUND => on_missing(),
        StatusCode::SERVICE_UNAVAILABLE => DirectoryError::ConnectionFailure { service },
        other => DirectoryError::Unknown(format!("{service} returned {other}")),
    }
}

/// Maps a transport-level failure; timeouts count as the service being down.
fn translate_transport(service: &'static str, err: &reqwest::Error) -> DirectoryError {
    if err.is_timeout() || err.is_connect() {
        DirectoryError::ConnectionFailure { service }
    } else {
        DirectoryError::Unknown(err.to_string())
    }
}

/// Recovers the SKU path segment from a stock mutation URL for error reporting.
fn sku_from_url(url: &str) -> Sku {
    let mut segments = url.rsplit('/');
    segments.next();
    segments.next();
    Sku::new(segments.next().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_status_not_found() {
        let sku = Sku::new("SKU-001");
        let err = translate_status("products", StatusCode::NOT_FOUND, || {
            DirectoryError::ProductNotFound(sku.clone())
        });
        assert!(matches!(err, DirectoryError::ProductNotFound(s) if s == sku));
    }

    #[test]
    fn test_translate_status_service_unavailable() {
        let err = translate_status("customers", StatusCode::SERVICE_UNAVAILABLE, || {
            DirectoryError::CustomerNotFound(Cpf::new("1"))
        });
        assert!(matches!(
            err,
            DirectoryError::ConnectionFailure {
                service: "customers"
            }
        ));
    }

    #[test]
    fn test_translate_status_other_is_unknown() {
        let err = translate_status("products", StatusCode::INTERNAL_SERVER_ERROR, || {
            DirectoryError::ProductNotFound(Sku::new("SKU-001"))
        });
        assert!(matches!(err, DirectoryError::Unknown(_)));
    }

    #[test]
    fn test_sku_recovered_from_mutation_url() {
        let sku = sku_from_url("http://products/products/sku/MOUSE-2024-WL-0010/sub/10");
        assert_eq!(sku.as_str(), "MOUSE-2024-WL-0010");

        let sku = sku_from_url("http://products/products/sku/ABC/add/3");
        assert_eq!(sku.as_str(), "ABC");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        assert_eq!(trim_base("http://svc/".to_string()), "http://svc");
        assert_eq!(trim_base("http://svc".to_string()), "http://svc");
    }
}
