//! Order domain errors.

use common::{OrderId, Sku};
use directory::DirectoryError;
use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// No order exists with the given id.
    #[error("order {0} not found")]
    OrderNotFound(OrderId),

    /// The order was already sent; it cannot be sent again.
    #[error("order {0} was already sent")]
    AlreadySent(OrderId),

    /// The requested quantity is zero or exceeds the available stock.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    /// The product exists but is not active for sale.
    #[error("product {0} is not available for sale")]
    ProductUnavailable(Sku),

    /// Remote directory failure, already translated into the domain taxonomy.
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// Storage failure.
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

/// Convenience type alias for order results.
pub type Result<T> = std::result::Result<T, OrderError>;
