//! API server entry point.

use std::sync::Arc;
use std::time::Duration;

use api::config::Config;
use channel::InMemoryOrderChannel;
use delivery::{
    DeliveryConsumer, DeliveryService, DeliveryStore, InMemoryDeliveryStore, PostgresDeliveryStore,
};
use directory::{DirectoryGateway, HttpDirectoryGateway, TokenCache};
use orders::{InMemoryOrderStore, OrderService, OrderStore, PostgresOrderStore};
use sqlx::PgPool;
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

/// Opens the order and delivery stores, durable when `DATABASE_URL` is set.
async fn open_stores(config: &Config) -> (Arc<dyn OrderStore>, Arc<dyn DeliveryStore>) {
    match &config.database_url {
        Some(url) => {
            let pool = PgPool::connect(url)
                .await
                .expect("failed to connect to database");
            let order_store = PostgresOrderStore::new(pool.clone());
            order_store
                .run_migrations()
                .await
                .expect("failed to run migrations");
            tracing::info!("using PostgreSQL stores");
            (
                Arc::new(order_store),
                Arc::new(PostgresDeliveryStore::new(pool)),
            )
        }
        None => {
            tracing::info!("DATABASE_URL not set, using in-memory stores");
            (
                Arc::new(InMemoryOrderStore::new()),
                Arc::new(InMemoryDeliveryStore::new()),
            )
        }
    }
}

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    // 1. Initialize tracing
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Install Prometheus metrics recorder
    let prometheus_builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    let metrics_handle = prometheus_builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 3. Build the outbound client stack: one timed client shared by the
    //    token cache and the gateway
    let http = reqwest::Client::builder()
        .timeout(Duration::from_millis(config.remote_timeout_ms))
        .build()
        .expect("failed to build HTTP client");
    let tokens = Arc::new(TokenCache::new(
        http.clone(),
        config.token_url(),
        config.credential(),
    ));
    let gateway: Arc<dyn DirectoryGateway> = Arc::new(HttpDirectoryGateway::new(
        http,
        &config.customers_url,
        &config.products_url,
        tokens,
    ));

    // 4. Open stores and wire the two services through the event channel
    let (order_store, delivery_store) = open_stores(&config).await;
    let (event_channel, receiver) = InMemoryOrderChannel::new();

    let orders = OrderService::new(gateway.clone(), order_store, Arc::new(event_channel));
    let deliveries = Arc::new(DeliveryService::new(gateway, delivery_store));

    // 5. Start the delivery consumer on its own task
    tokio::spawn(DeliveryConsumer::new(deliveries.clone(), receiver).run());

    // 6. Build and start the server
    let state = Arc::new(api::AppState {
        orders,
        deliveries,
    });
    let app = api::create_app(state, metrics_handle);

    let addr = config.addr();
    tracing::info!(%addr, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("server shut down gracefully");
}
