//! HTTP API server with observability for the fulfillment bridge.
//!
//! Exposes the order and delivery operations over REST, with structured
//! logging (tracing) and Prometheus metrics. The delivery consumer runs on
//! its own task, wired to the order side only through the event channel.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post};
use channel::InMemoryOrderChannel;
use delivery::{DeliveryConsumer, DeliveryService, InMemoryDeliveryStore};
use directory::InMemoryDirectory;
use metrics_exporter_prometheus::PrometheusHandle;
use orders::{InMemoryOrderStore, OrderService};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub orders: OrderService,
    pub deliveries: Arc<DeliveryService>,
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/orders", post(routes::orders::create))
        .route("/orders", get(routes::orders::list))
        .route("/orders/{id}", get(routes::orders::get))
        .route("/orders/{id}", delete(routes::orders::delete))
        .route("/orders/{id}/send", post(routes::orders::send))
        .route("/deliveries", get(routes::deliveries::list))
        .route("/deliveries/canceled", delete(routes::deliveries::purge_canceled))
        .route("/deliveries/{id}", get(routes::deliveries::get))
        .route("/deliveries/{id}", delete(routes::deliveries::delete))
        .route("/deliveries/{id}/ship", post(routes::deliveries::ship))
        .route("/deliveries/{id}/cancel", post(routes::deliveries::cancel))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates fully in-memory application state and spawns the delivery
/// consumer.
///
/// Used by the integration tests and by the binary when no `DATABASE_URL`
/// is configured; the returned directory handle is the seeding surface.
pub fn create_in_memory_state(directory: InMemoryDirectory) -> Arc<AppState> {
    let (channel, receiver) = InMemoryOrderChannel::new();
    let gateway = Arc::new(directory);

    let orders = OrderService::new(
        gateway.clone(),
        Arc::new(InMemoryOrderStore::new()),
        Arc::new(channel),
    );
    let deliveries = Arc::new(DeliveryService::new(
        gateway,
        Arc::new(InMemoryDeliveryStore::new()),
    ));

    tokio::spawn(DeliveryConsumer::new(deliveries.clone(), receiver).run());

    Arc::new(AppState {
        orders,
        deliveries,
    })
}
