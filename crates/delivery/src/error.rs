//! Delivery domain errors.

use common::OrderId;
use directory::DirectoryError;
use thiserror::Error;

/// Errors that can occur during delivery operations.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// No delivery exists with the given id.
    #[error("delivery {0} not found")]
    DeliveryNotFound(OrderId),

    /// The delivery is already shipped; the transition is rejected.
    #[error("delivery {0} was already shipped")]
    AlreadyShipped(OrderId),

    /// The delivery is already canceled; the transition is rejected.
    #[error("delivery {0} was already canceled")]
    AlreadyCanceled(OrderId),

    /// Bulk removal found nothing to remove.
    #[error("no canceled deliveries to remove")]
    NoCanceledDeliveries,

    /// Remote directory failure, already translated into the domain taxonomy.
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// Storage failure.
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

/// Convenience type alias for delivery results.
pub type Result<T> = std::result::Result<T, DeliveryError>;
