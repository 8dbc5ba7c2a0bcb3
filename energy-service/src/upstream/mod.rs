pub mod eia;

pub use eia::EiaClient;

use energy_client::domain::GenerationRecord;

use crate::error::EnergyError;

/// Source of truth behind the cache: one page of generation records for a
/// region, most recent period first.
#[async_trait::async_trait]
pub trait GenerationUpstream: Send + Sync {
    async fn fetch_region(&self, region_code: &str) -> Result<Vec<GenerationRecord>, EnergyError>;
}
