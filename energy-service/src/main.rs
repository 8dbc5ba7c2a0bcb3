use anyhow::Result;
use energy_service::{
    api::{self, AppState},
    cache::CacheFill,
    config::AppConfig,
    metrics_server, observability,
    store::PgGenerationStore,
    upstream::EiaClient,
};
use sqlx::postgres::PgPoolOptions;
use std::{net::SocketAddr, sync::Arc};

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    // Load configuration
    let cfg = AppConfig::load()?;

    // Start metrics server if configured
    if let Some(metrics_cfg) = &cfg.metrics {
        metrics_server::init(&metrics_cfg.bind_addr).await?;
    }

    // Schema is expected to be applied out-of-band via `sql/schema/*.sql`.
    let pool = PgPoolOptions::new()
        .max_connections(cfg.database.max_connections)
        .connect(&cfg.database.uri)
        .await?;

    let store = Arc::new(PgGenerationStore::new(pool));
    let upstream = Arc::new(EiaClient::new(&cfg.upstream)?);
    let cache = CacheFill::new(
        store.clone(),
        upstream,
        cfg.cache.history_window,
        cfg.cache.refresh_policy(),
    );

    let app = api::router(AppState {
        cache: Arc::new(cache),
        store,
        renewable_fuel_types: Arc::new(cfg.forecast.renewable_fuel_types.clone()),
        min_history_points: cfg.forecast.min_history_points,
    });

    let addr: SocketAddr = cfg
        .server
        .bind_addr
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid server.bind_addr: {e}"))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        %addr,
        refresh = ?cfg.cache.refresh_policy(),
        history_window = cfg.cache.history_window,
        "energy service listening"
    );

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
