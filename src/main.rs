use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;
mod idempotency;
mod messaging;
mod metrics;
mod models;
mod store;
mod utils;

use config::Config;
use messaging::{EventConsumer, EventPublisher};
use metrics::Metrics;
use store::EventStore;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Structured logging with environment-based filtering.
    // Override with e.g. RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,user_activity_pipeline=debug")),
        )
        .init();

    let config = Config::from_env();
    tracing::info!(
        brokers = %config.kafka_brokers,
        port = config.port,
        "Starting user activity pipeline"
    );

    let metrics = Arc::new(Metrics::new()?);
    let store = Arc::new(EventStore::new());

    // Broker clients are created once and live for the process; failure here
    // aborts startup.
    let publisher = Arc::new(EventPublisher::new(&config.kafka_brokers)?);
    let consumer = EventConsumer::new(&config.kafka_brokers, store.clone(), metrics.clone())?;
    tracing::info!("Producer and consumer connected");

    tokio::spawn(async move {
        consumer.run().await;
    });

    let registry = Arc::new(metrics.registry().clone());
    let port = config.port;

    tracing::info!(port = port, "HTTP server listening");
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(store.clone()))
            .app_data(web::Data::new(publisher.clone()))
            .app_data(web::Data::new(metrics.clone()))
            .app_data(web::Data::new(registry.clone()))
            .configure(api::configure)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await?;

    Ok(())
}
