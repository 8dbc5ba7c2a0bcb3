pub mod postgres;
#[cfg(test)]
pub(crate) mod memory;

pub use postgres::PgGenerationStore;

use energy_client::domain::{GenerationRecord, PeriodTotal};
use time::OffsetDateTime;

use crate::error::EnergyError;

/// Relational store of cached generation records.
///
/// Writes that take a slice of records are atomic: either every record is
/// persisted or none is.
#[async_trait::async_trait]
pub trait GenerationStore: Send + Sync {
    /// Up to `limit` records for a region, newest period first.
    async fn recent_for_region(
        &self,
        region_code: &str,
        limit: i64,
    ) -> Result<Vec<GenerationRecord>, EnergyError>;

    /// Write time of the oldest cached row for a region.
    async fn oldest_fetch(&self, region_code: &str) -> Result<Option<OffsetDateTime>, EnergyError>;

    async fn insert_records(&self, records: &[GenerationRecord]) -> Result<u64, EnergyError>;

    /// Swap a region's rows for `records` in one unit of work.
    async fn replace_region(
        &self,
        region_code: &str,
        records: &[GenerationRecord],
    ) -> Result<u64, EnergyError>;

    async fn delete_region(&self, region_code: &str) -> Result<u64, EnergyError>;

    /// Per-period sums for the given fuel types, oldest period first.
    async fn period_totals(&self, fuel_types: &[String]) -> Result<Vec<PeriodTotal>, EnergyError>;

    async fn all_records(&self) -> Result<Vec<GenerationRecord>, EnergyError>;
}
