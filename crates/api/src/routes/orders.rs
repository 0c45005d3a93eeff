//! Order endpoints: create, list, send, delete.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::{Cpf, Sku};
use orders::Order;
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;
use crate::routes::{ListQuery, parse_id};

// -- Request types --

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub cpf: String,
    pub sku: String,
    pub quantity: Option<u32>,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub cpf: String,
    pub sku: String,
    pub customer_name: Option<String>,
    pub product_title: Option<String>,
    pub unit_price_cents: i64,
    pub quantity: u32,
    pub total_cents: i64,
    pub processing: bool,
    pub created_at: String,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id.to_string(),
            cpf: order.cpf.to_string(),
            sku: order.sku.to_string(),
            customer_name: order.customer_name,
            product_title: order.product_title,
            unit_price_cents: order.unit_price.cents(),
            quantity: order.quantity,
            total_cents: order.total.cents(),
            processing: order.processing,
            created_at: order.created_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
pub struct SendResponse {
    pub order_id: String,
    pub message: String,
}

// -- Handlers --

/// POST /orders — validate the purchase and create a pending order.
#[tracing::instrument(skip(state, req))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    // An absent quantity fails the same validation as an explicit zero.
    let quantity = req.quantity.unwrap_or(0);
    let order = state
        .orders
        .create(Cpf::new(req.cpf), Sku::new(req.sku), quantity)
        .await?;

    Ok((StatusCode::CREATED, Json(order.into())))
}

/// GET /orders — list orders, optionally bounded by creation date.
#[tracing::instrument(skip(state))]
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let orders = state.orders.list(query.range()).await?;
    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

/// GET /orders/{id} — load a single order.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    path: Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let id = parse_id(path)?;
    let order = state.orders.get(id).await?;
    Ok(Json(order.into()))
}

/// POST /orders/{id}/send — reserve stock and hand the order off.
#[tracing::instrument(skip(state))]
pub async fn send(
    State(state): State<Arc<AppState>>,
    path: Path<String>,
) -> Result<Json<SendResponse>, ApiError> {
    let id = parse_id(path)?;
    let receipt = state.orders.send(id).await?;
    Ok(Json(SendResponse {
        order_id: receipt.order_id.to_string(),
        message: receipt.to_string(),
    }))
}

/// DELETE /orders/{id} — remove an order.
#[tracing::instrument(skip(state))]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    path: Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(path)?;
    state.orders.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
