use energy_client::{
    db::generation_queries,
    domain::{GenerationRecord, PeriodTotal},
};
use sqlx::postgres::PgPool;
use time::OffsetDateTime;

use super::GenerationStore;
use crate::error::EnergyError;

pub struct PgGenerationStore {
    pool: PgPool,
}

impl PgGenerationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn store_err(op: &'static str) -> impl FnOnce(anyhow::Error) -> EnergyError {
    move |e| {
        tracing::error!(error = %e, op, "energy_data query failed");
        metrics::counter!("energy_store_errors_total").increment(1);
        EnergyError::Store(format!("{op}: {e}"))
    }
}

#[async_trait::async_trait]
impl GenerationStore for PgGenerationStore {
    async fn recent_for_region(
        &self,
        region_code: &str,
        limit: i64,
    ) -> Result<Vec<GenerationRecord>, EnergyError> {
        generation_queries::recent_for_region(&self.pool, region_code, limit)
            .await
            .map_err(store_err("recent_for_region"))
    }

    async fn oldest_fetch(&self, region_code: &str) -> Result<Option<OffsetDateTime>, EnergyError> {
        generation_queries::oldest_fetch_for_region(&self.pool, region_code)
            .await
            .map_err(store_err("oldest_fetch"))
    }

    async fn insert_records(&self, records: &[GenerationRecord]) -> Result<u64, EnergyError> {
        let inserted = generation_queries::insert_records(&self.pool, records)
            .await
            .map_err(store_err("insert_records"))?;
        metrics::counter!("energy_store_rows_written_total").increment(inserted);
        Ok(inserted)
    }

    async fn replace_region(
        &self,
        region_code: &str,
        records: &[GenerationRecord],
    ) -> Result<u64, EnergyError> {
        let inserted = generation_queries::replace_region(&self.pool, region_code, records)
            .await
            .map_err(store_err("replace_region"))?;
        metrics::counter!("energy_store_rows_written_total").increment(inserted);
        Ok(inserted)
    }

    async fn delete_region(&self, region_code: &str) -> Result<u64, EnergyError> {
        generation_queries::delete_region(&self.pool, region_code)
            .await
            .map_err(store_err("delete_region"))
    }

    async fn period_totals(&self, fuel_types: &[String]) -> Result<Vec<PeriodTotal>, EnergyError> {
        generation_queries::period_totals(&self.pool, fuel_types)
            .await
            .map_err(store_err("period_totals"))
    }

    async fn all_records(&self) -> Result<Vec<GenerationRecord>, EnergyError> {
        generation_queries::all_records(&self.pool)
            .await
            .map_err(store_err("all_records"))
    }
}
