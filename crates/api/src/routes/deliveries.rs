//! Delivery endpoints: list, ship, cancel, delete.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use delivery::{CancelOutcome, Delivery};
use serde::Serialize;

use crate::AppState;
use crate::error::ApiError;
use crate::routes::{ListQuery, parse_id};

// -- Response types --

#[derive(Serialize)]
pub struct DeliveryResponse {
    pub id: String,
    pub cpf: String,
    pub sku: String,
    pub customer_name: Option<String>,
    pub product_title: Option<String>,
    pub unit_price_cents: i64,
    pub quantity: u32,
    pub total_cents: i64,
    pub status: String,
    pub created_at: String,
}

impl From<Delivery> for DeliveryResponse {
    fn from(delivery: Delivery) -> Self {
        Self {
            id: delivery.id.to_string(),
            cpf: delivery.cpf.to_string(),
            sku: delivery.sku.to_string(),
            customer_name: delivery.customer_name,
            product_title: delivery.product_title,
            unit_price_cents: delivery.unit_price.cents(),
            quantity: delivery.quantity,
            total_cents: delivery.total.cents(),
            status: delivery.status.to_string(),
            created_at: delivery.created_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
pub struct CancelResponse {
    pub delivery_id: String,
    pub status: String,
    pub stock_restored: bool,
    pub message: String,
}

#[derive(Serialize)]
pub struct PurgeResponse {
    pub removed: u64,
}

// -- Handlers --

/// GET /deliveries — list deliveries, optionally bounded by creation date.
#[tracing::instrument(skip(state))]
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<DeliveryResponse>>, ApiError> {
    let deliveries = state.deliveries.list(query.range()).await?;
    Ok(Json(deliveries.into_iter().map(Into::into).collect()))
}

/// GET /deliveries/{id} — load a single delivery.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    path: Path<String>,
) -> Result<Json<DeliveryResponse>, ApiError> {
    let id = parse_id(path)?;
    let delivery = state.deliveries.get(id).await?;
    Ok(Json(delivery.into()))
}

/// POST /deliveries/{id}/ship — transition the delivery to SHIPPED.
#[tracing::instrument(skip(state))]
pub async fn ship(
    State(state): State<Arc<AppState>>,
    path: Path<String>,
) -> Result<Json<DeliveryResponse>, ApiError> {
    let id = parse_id(path)?;
    let delivery = state.deliveries.mark_shipped(id).await?;
    Ok(Json(delivery.into()))
}

/// POST /deliveries/{id}/cancel — cancel the delivery and restore stock.
#[tracing::instrument(skip(state))]
pub async fn cancel(
    State(state): State<Arc<AppState>>,
    path: Path<String>,
) -> Result<Json<CancelResponse>, ApiError> {
    let id = parse_id(path)?;
    let outcome = state.deliveries.cancel(id).await?;

    let (stock_restored, message) = match outcome {
        CancelOutcome::Canceled => (true, format!("delivery {id} canceled, stock restored")),
        CancelOutcome::CanceledWithoutRestock => (
            false,
            format!("delivery {id} canceled, but the product no longer exists; stock not restored"),
        ),
    };

    Ok(Json(CancelResponse {
        delivery_id: id.to_string(),
        status: "CANCELED".to_string(),
        stock_restored,
        message,
    }))
}

/// DELETE /deliveries/{id} — remove a delivery.
#[tracing::instrument(skip(state))]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    path: Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(path)?;
    state.deliveries.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /deliveries/canceled — bulk-remove all canceled deliveries.
#[tracing::instrument(skip(state))]
pub async fn purge_canceled(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PurgeResponse>, ApiError> {
    let removed = state.deliveries.delete_canceled().await?;
    Ok(Json(PurgeResponse { removed }))
}
