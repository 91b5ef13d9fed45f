//! pulse-gateway server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints and spawns
//! the two automation tick loops.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use pulse_gateway::api;
use pulse_gateway::app_state::AppState;
use pulse_gateway::config::GatewayConfig;
use pulse_gateway::domain::{EventBus, VenueRegistry};
use pulse_gateway::persistence::PostgresPersistence;
use pulse_gateway::service::{AutomationService, OfferService, VenueService};
use pulse_gateway::ws::handler::ws_handler;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = GatewayConfig::from_env().map_err(|e| anyhow::anyhow!(e.to_string()))?;
    tracing::info!(addr = %config.listen_addr, "starting pulse-gateway");

    // Optional persistence mirror
    let mirror = if config.persistence_enabled {
        match sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await
        {
            Ok(pool) => {
                tracing::info!("persistence mirror connected");
                Some(PostgresPersistence::new(pool))
            }
            Err(e) => {
                // The registry is the source of truth; run without the
                // mirror rather than refusing to start.
                tracing::warn!(error = %e, "persistence mirror unavailable, continuing without it");
                None
            }
        }
    } else {
        None
    };

    // Build domain layer
    let registry = Arc::new(VenueRegistry::new());
    let event_bus = EventBus::new(config.event_bus_capacity);
    let offset = config.venue_offset();

    // Build service layer
    let venue_service = Arc::new(VenueService::new(
        Arc::clone(&registry),
        event_bus.clone(),
        offset,
        mirror.clone(),
    ));
    let offer_service = Arc::new(OfferService::new(
        Arc::clone(&registry),
        event_bus.clone(),
        mirror.clone(),
    ));
    let automation_service = Arc::new(AutomationService::new(
        Arc::clone(&registry),
        event_bus.clone(),
        offset,
        mirror.clone(),
    ));

    // Spawn the periodic tick loops
    let (_vibe_handle, _busyness_handle) = Arc::clone(&automation_service).spawn(
        Duration::from_secs(config.vibe_tick_interval_secs),
        Duration::from_secs(config.busyness_tick_interval_secs),
    );
    tracing::info!(
        vibe_interval_secs = config.vibe_tick_interval_secs,
        busyness_interval_secs = config.busyness_tick_interval_secs,
        "automation loops started"
    );

    // Periodic history retention cleanup
    if let Some(mirror) = mirror.clone()
        && config.cleanup_after_days > 0
    {
        let cleanup_after_days = config.cleanup_after_days;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(24 * 3600));
            loop {
                ticker.tick().await;
                match mirror.delete_old_history(cleanup_after_days).await {
                    Ok(deleted) if deleted > 0 => {
                        tracing::info!(deleted, "old live-state history removed");
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!(error = %e, "history cleanup failed"),
                }
            }
        });
    }

    // Build application state
    let app_state = AppState {
        venue_service,
        offer_service,
        automation_service,
        event_bus,
    };

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(TimeoutLayer::new(Duration::from_secs(
                    config.request_timeout_secs,
                ))),
        )
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
