//! Domain error taxonomy for remote directory calls.

use common::{Cpf, Sku};
use thiserror::Error;

/// Errors produced by the directory gateway.
///
/// Raw HTTP and transport failures are translated into these variants at the
/// gateway boundary; callers never see a `reqwest` error.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The customer service answered 404 for the CPF.
    #[error("customer {0} not found")]
    CustomerNotFound(Cpf),

    /// The product service answered 404 for the SKU.
    #[error("product {0} not found")]
    ProductNotFound(Sku),

    /// The remote service is down (503, connect failure or timeout).
    #[error("{service} service is unavailable")]
    ConnectionFailure { service: &'static str },

    /// Any other transport or protocol failure.
    #[error("unexpected remote error: {0}")]
    Unknown(String),
}

/// Convenience type alias for directory results.
pub type Result<T> = std::result::Result<T, DirectoryError>;
