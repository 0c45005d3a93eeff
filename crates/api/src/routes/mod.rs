//! Route handlers.

pub mod deliveries;
pub mod health;
pub mod metrics;
pub mod orders;

use axum::extract::Path;
use chrono::{DateTime, Utc};
use common::{DateRange, OrderId};
use serde::Deserialize;

use crate::error::ApiError;

/// Optional creation-date filters shared by both listing endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub after_date: Option<DateTime<Utc>>,
    pub before_date: Option<DateTime<Utc>>,
}

impl ListQuery {
    pub fn range(&self) -> DateRange {
        DateRange {
            after: self.after_date,
            before: self.before_date,
        }
    }
}

/// Parses a path segment into an order/delivery id.
pub fn parse_id(Path(id): Path<String>) -> Result<OrderId, ApiError> {
    let uuid = uuid::Uuid::parse_str(&id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid ID format: {e}")))?;
    Ok(OrderId::from_uuid(uuid))
}
