use std::sync::Arc;
use std::time::Duration;

use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;
mod domain;
mod metrics;
mod persistence;
mod utils;

use config::Config;
use domain::customer::CustomerServiceImpl;
use persistence::PgCustomerRepository;
use utils::{retry_with_backoff, RetryConfig, RetryResult};

type Service = CustomerServiceImpl<PgCustomerRepository>;

const CONNECT_ATTEMPTS: u32 = 10;
const CONNECT_DELAY: Duration = Duration::from_secs(5);

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // RUST_LOG wins over LOG_LEVEL when both are set
    let default_filter = if config.is_development() {
        format!("{},customer_service=debug", config.log_level)
    } else {
        config.log_level.clone()
    };
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(!config.is_production()),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();

    tracing::info!(
        environment = %config.environment,
        version = env!("CARGO_PKG_VERSION"),
        "Starting customer service"
    );

    // === 1. Database ===
    let pool = connect(&config).await?;
    persistence::schema::migrate(&pool).await?;

    if std::env::args().nth(1).as_deref() == Some("migrate") {
        tracing::info!("Migrations applied, exiting");
        return Ok(());
    }

    // === 2. Service wiring ===
    let repository = Arc::new(PgCustomerRepository::new(pool));
    let service = web::Data::new(Service::new(repository));

    let metrics = web::Data::new(metrics::Metrics::new()?);
    tracing::info!(
        metric_families = metrics.registry().gather().len(),
        "Metrics registry created"
    );

    // === 3. HTTP server ===
    let (host, port) = config.server_address();
    tracing::info!(host = %host, port = port, "HTTP server listening");

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(service.clone())
            .app_data(metrics.clone())
            .configure(api::configure::<Service>)
    })
    .bind((host.as_str(), port))
    .with_context(|| format!("Failed to bind {host}:{port}"))?
    .run()
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Open the pool, waiting for the database to come up
async fn connect(config: &Config) -> anyhow::Result<PgPool> {
    let db = &config.database;
    tracing::info!(host = %db.host, port = db.port, database = %db.name, "Connecting to PostgreSQL");

    let result = retry_with_backoff(RetryConfig::fixed(CONNECT_ATTEMPTS, CONNECT_DELAY), |_| {
        PgPoolOptions::new()
            .max_connections(db.max_connections)
            .connect_with(db.connect_options())
    })
    .await;

    match result {
        RetryResult::Success(pool) => {
            tracing::info!("Connected to PostgreSQL");
            Ok(pool)
        }
        RetryResult::Failed { attempts, error } => Err(anyhow::Error::new(error)
            .context(format!("Database unreachable after {attempts} attempts"))),
    }
}
