use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex,
    },
    time::Duration,
};

use energy_client::domain::{GenerationRecord, PeriodTotal};
use time::OffsetDateTime;

use super::GenerationStore;
use crate::error::EnergyError;

struct StoredRow {
    record: GenerationRecord,
    fetched_at: OffsetDateTime,
}

/// In-process stand-in for `energy_data` with the same ordering and
/// atomicity rules as the Postgres store.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<StoredRow>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn with_records(records: Vec<GenerationRecord>) -> Self {
        let now = OffsetDateTime::now_utc();
        let rows = records
            .into_iter()
            .map(|record| StoredRow { record, fetched_at: now })
            .collect();
        Self {
            rows: Mutex::new(rows),
            ..Default::default()
        }
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Pretend every row of a region was written `age` ago.
    pub fn backdate(&self, region_code: &str, age: Duration) {
        let at = OffsetDateTime::now_utc() - age;
        for row in self.rows.lock().unwrap().iter_mut() {
            if row.record.region_code == region_code {
                row.fetched_at = at;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn count_region(&self, region_code: &str) -> usize {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.record.region_code == region_code)
            .count()
    }

    fn check_read(&self) -> Result<(), EnergyError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(EnergyError::Store("connection refused".to_string()));
        }
        Ok(())
    }

    fn check_write(&self) -> Result<(), EnergyError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(EnergyError::Store("insert failed".to_string()));
        }
        Ok(())
    }

    fn push_all(rows: &mut Vec<StoredRow>, records: &[GenerationRecord]) -> u64 {
        let now = OffsetDateTime::now_utc();
        rows.extend(records.iter().cloned().map(|record| StoredRow { record, fetched_at: now }));
        records.len() as u64
    }
}

#[async_trait::async_trait]
impl GenerationStore for MemoryStore {
    async fn recent_for_region(
        &self,
        region_code: &str,
        limit: i64,
    ) -> Result<Vec<GenerationRecord>, EnergyError> {
        self.check_read()?;
        let rows = self.rows.lock().unwrap();
        let mut out: Vec<GenerationRecord> = rows
            .iter()
            .filter(|r| r.record.region_code == region_code)
            .map(|r| r.record.clone())
            .collect();
        out.sort_by(|a, b| b.period.cmp(&a.period));
        out.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(out)
    }

    async fn oldest_fetch(&self, region_code: &str) -> Result<Option<OffsetDateTime>, EnergyError> {
        self.check_read()?;
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.record.region_code == region_code)
            .map(|r| r.fetched_at)
            .min())
    }

    async fn insert_records(&self, records: &[GenerationRecord]) -> Result<u64, EnergyError> {
        self.check_write()?;
        let mut rows = self.rows.lock().unwrap();
        Ok(Self::push_all(&mut rows, records))
    }

    async fn replace_region(
        &self,
        region_code: &str,
        records: &[GenerationRecord],
    ) -> Result<u64, EnergyError> {
        self.check_write()?;
        let mut rows = self.rows.lock().unwrap();
        rows.retain(|r| r.record.region_code != region_code);
        Ok(Self::push_all(&mut rows, records))
    }

    async fn delete_region(&self, region_code: &str) -> Result<u64, EnergyError> {
        self.check_write()?;
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| r.record.region_code != region_code);
        Ok((before - rows.len()) as u64)
    }

    async fn period_totals(&self, fuel_types: &[String]) -> Result<Vec<PeriodTotal>, EnergyError> {
        self.check_read()?;
        let rows = self.rows.lock().unwrap();
        let mut totals: BTreeMap<String, Option<f64>> = BTreeMap::new();
        for row in rows.iter().filter(|r| fuel_types.contains(&r.record.fuel_type)) {
            let slot = totals.entry(row.record.period.clone()).or_insert(None);
            if let Some(v) = row.record.generation_mwh {
                *slot = Some(slot.unwrap_or(0.0) + v);
            }
        }
        Ok(totals
            .into_iter()
            .map(|(period, value)| PeriodTotal { period, value })
            .collect())
    }

    async fn all_records(&self) -> Result<Vec<GenerationRecord>, EnergyError> {
        self.check_read()?;
        Ok(self.rows.lock().unwrap().iter().map(|r| r.record.clone()).collect())
    }
}
