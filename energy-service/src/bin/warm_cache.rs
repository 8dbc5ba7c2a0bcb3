use anyhow::{bail, Result};
use energy_service::{
    cache::CacheFill, config::AppConfig, observability, store::PgGenerationStore,
    upstream::EiaClient, validation::validate_regions,
};
use sqlx::postgres::PgPoolOptions;
use std::{env, sync::Arc};

/// Fill the cache for each region named on the command line, one at a time.
#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        bail!("usage: warm_cache <region> [<region> ...]");
    }

    // Reject every malformed argument before touching the database.
    let regions = validate_regions(&args)?;

    let cfg = AppConfig::load()?;

    let pool = PgPoolOptions::new()
        .max_connections(cfg.database.max_connections)
        .connect(&cfg.database.uri)
        .await?;

    let cache = CacheFill::new(
        Arc::new(PgGenerationStore::new(pool)),
        Arc::new(EiaClient::new(&cfg.upstream)?),
        cfg.cache.history_window,
        cfg.cache.refresh_policy(),
    );

    let mut failed = 0usize;
    for region in &regions {
        match cache.fetch_region(region).await {
            Ok(records) => tracing::info!(region = %region, records = records.len(), "region warmed"),
            Err(e) => {
                failed += 1;
                tracing::error!(region = %region, error = %e, "failed to warm region");
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} region(s) failed to warm", regions.len());
    }

    Ok(())
}
