// Main entry point - Dependency injection and server setup
use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use aquaponics_monitor::application::chart_service::ChartService;
use aquaponics_monitor::application::streaming_service::StreamingDashboardService;
use aquaponics_monitor::application::tank_service::TankService;
use aquaponics_monitor::infrastructure::config::{load_dashboard_config, load_influx_config};
use aquaponics_monitor::infrastructure::influx_repository::InfluxRepository;
use aquaponics_monitor::presentation::app_state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let influx_config = load_influx_config().context("Failed to load config/influx")?;
    let dashboard_config = load_dashboard_config().context("Failed to load config/dashboard")?;
    let addr: SocketAddr = dashboard_config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address {}", dashboard_config.server.bind))?;

    tracing::info!(
        "Chart settings: max_points={}, sampling_floor={}, target_ticks={}, {} sensors, {} threshold bands",
        dashboard_config.chart.max_points,
        dashboard_config.chart.sampling_floor,
        dashboard_config.chart.target_ticks,
        dashboard_config.sensors.len(),
        dashboard_config.thresholds.len()
    );

    // Create repository (infrastructure layer)
    let repository = Arc::new(InfluxRepository::new(
        influx_config.influx.host,
        influx_config.influx.token,
        influx_config.influx.database,
        influx_config.influx.retention_policy,
    ));

    // Create services (application layer)
    let tank_service = TankService::new(repository.clone());
    let chart_service = ChartService::new(repository, dashboard_config)
        .context("Invalid chart settings")?;
    let streaming_service = StreamingDashboardService::new(chart_service.clone());

    let state = Arc::new(AppState {
        tank_service,
        chart_service,
        streaming_service,
    });

    // Build router (presentation layer)
    let router = aquaponics_monitor::presentation::router(state);

    tracing::info!("Starting aquaponics-monitor service on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
