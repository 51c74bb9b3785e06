//! HTTP server initialization and runtime setup.
//!
//! Handles the database pool, migrations, payment gateway selection, upload
//! storage and the Axum server lifecycle.

use crate::config::Config;
use crate::infrastructure::otp::{LogOtpSender, OtpSender};
use crate::infrastructure::payment::{
    DisabledPaymentGateway, HostedPaymentGateway, PaymentGateway,
};
use crate::routes::app_router;
use crate::state::{AppState, ServiceSettings};

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Opens the PostgreSQL pool with the configured limits.
pub async fn connect_pool(config: &Config) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")
}

/// Picks the hosted gateway when credentials are configured.
///
/// # Errors
///
/// Returns an error if the hosted client cannot be built.
pub fn build_payment_gateway(config: &Config) -> Result<Arc<dyn PaymentGateway>> {
    match &config.payment {
        Some(payment) => {
            let gateway = HostedPaymentGateway::new(
                payment.api_url.clone(),
                payment.key_id.clone(),
                payment.key_secret.clone(),
                config.payment_currency.clone(),
            )
            .context("Failed to build payment client")?;
            tracing::info!("Online payments enabled");
            Ok(Arc::new(gateway))
        }
        None => {
            tracing::info!("Online payments disabled");
            Ok(Arc::new(DisabledPaymentGateway::new(
                config.payment_currency.clone(),
            )))
        }
    }
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Apply migrations
/// - Payment gateway (hosted or disabled)
/// - Upload directory
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - The upload directory cannot be created
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = connect_pool(&config).await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations applied");

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| format!("Failed to create upload directory {}", config.upload_dir))?;

    let payment_gateway = build_payment_gateway(&config)?;
    let otp_sender: Arc<dyn OtpSender> = Arc::new(LogOtpSender);

    let state = AppState::new(
        Arc::new(pool),
        ServiceSettings::from(&config),
        payment_gateway,
        otp_sender,
    );

    let app = app_router(state, config.behind_proxy);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid LISTEN address {}", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
