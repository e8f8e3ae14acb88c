// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};
use anyhow::Context;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_service::DashboardService;
use crate::application::poller::Poller;
use crate::application::snapshot::SnapshotStore;
use crate::domain::catalog::{Palette, SensorCatalog};
use crate::domain::features::ActiveMetricSet;
use crate::domain::series::SeriesProjector;
use crate::infrastructure::config::load_config;
use crate::infrastructure::http_backend::HttpSensorBackend;
use crate::presentation::app_state::AppState;
use crate::presentation::router::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = load_config()?;

    // Initialize tracing; RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    tracing::debug!("Loaded configuration: {:?}", config);

    // Metric catalog, built once for the session
    let catalog = SensorCatalog::new(config.sensors.units, &Palette::new(config.palette.clone()));
    let active = ActiveMetricSet::resolve(&catalog, config.capabilities());
    tracing::info!(
        "{} metrics active ({} units): {}",
        active.len(),
        if catalog.units().is_metric() { "metric" } else { "imperial" },
        active.ids().map(|id| id.as_str()).collect::<Vec<_>>().join(", ")
    );

    // Backend client (infrastructure layer)
    let backend = Arc::new(HttpSensorBackend::new(
        &config.backend.base_url,
        config.backend.request_timeout_secs.map(Duration::from_secs),
    )?);

    // Service and poller (application layer)
    let store = Arc::new(SnapshotStore::new());
    let service = Arc::new(DashboardService::new(
        backend,
        active,
        SeriesProjector::new(config.naive_zone()?),
        store,
        config.sensors.fan_gpio,
    ));

    let (window_tx, window_rx) = watch::channel(config.polling.default_window);
    let poller = Poller::new(
        service.clone(),
        window_rx,
        config.poll_interval(),
        config.polling.pause_without_viewers,
    );
    tokio::spawn(poller.run());

    // Build router (presentation layer)
    let state = Arc::new(AppState {
        service,
        window_tx: Arc::new(window_tx),
    });
    let router = build_router(state);

    // Start server
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("invalid server.bind '{}'", config.server.bind))?;
    tracing::info!(
        "Starting enviro-dashboard on {} (backend {})",
        addr,
        config.backend.base_url
    );

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
