use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::watch;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rsvp_mailer::api;
use rsvp_mailer::config::{Config, LogFormat};
use rsvp_mailer::mail::relay_from_config;
use rsvp_mailer::notify::InvitationNotifier;
use rsvp_mailer::redis::{create_pool, GuestEventStream, GuestRepository};
use rsvp_mailer::state::AppState;
use rsvp_mailer::store::GuestStore;
use rsvp_mailer::trigger::TriggerRuntime;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init(),
    }

    tracing::info!("Starting RSVP mailer...");
    tracing::info!(
        host = %config.server_host,
        port = %config.server_port,
        rsvp_base_url = %config.rsvp_base_url,
        "Configuration loaded"
    );

    // Create Redis connection pool
    let redis_pool = create_pool(&config)?;
    let guests = Arc::new(GuestRepository::new(redis_pool.clone()));

    // Test Redis connection
    match guests.health_check().await {
        Ok(true) => tracing::info!("Redis connection established"),
        Ok(false) => tracing::warn!("Redis health check returned false"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to Redis");
            // Continue anyway, might recover later
        }
    }

    // Invitation notifier fed by the guest creation stream
    let relay = relay_from_config(&config)?;
    let notifier = InvitationNotifier::new(
        relay,
        config.mail_from.clone(),
        config.rsvp_base_url.clone(),
    );
    let events = Arc::new(GuestEventStream::new(
        redis_pool,
        config.trigger_consumer.clone(),
    ));
    let trigger = TriggerRuntime::new(events, notifier, &config);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let trigger_task = tokio::spawn(trigger.run(shutdown_rx));

    let state = AppState::new(config.clone(), guests);

    // Build router
    let app = Router::new()
        .merge(api::create_router(state))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_seconds,
        )))
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr: SocketAddr = config.server_addr().parse()?;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(address = %addr, "Server listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let _ = shutdown_tx.send(true);
    trigger_task.await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

/// Handle shutdown signals
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal, shutting down...");
        },
    }
}
