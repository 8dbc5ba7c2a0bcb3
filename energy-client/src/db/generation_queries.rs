use anyhow::Result;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use time::OffsetDateTime;

use crate::domain::{GenerationRecord, PeriodTotal};

/// Postgres caps a statement at 65535 bind parameters; five per row.
const INSERT_CHUNK_ROWS: usize = 1000;

/// Most recent records for one region, newest period first.
pub async fn recent_for_region(
    pool: &PgPool,
    region_code: &str,
    limit: i64,
) -> Result<Vec<GenerationRecord>> {
    let rows = sqlx::query_as::<_, GenerationRecord>(
        r#"
        SELECT
            state_code,
            period,
            sector,
            fuel_type,
            generation_mwh
        FROM energy_data
        WHERE state_code = $1
        ORDER BY period DESC
        LIMIT $2
        "#,
    )
    .bind(region_code)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// When the oldest row currently cached for a region was written.
pub async fn oldest_fetch_for_region(
    pool: &PgPool,
    region_code: &str,
) -> Result<Option<OffsetDateTime>> {
    let ts = sqlx::query_scalar::<_, Option<OffsetDateTime>>(
        "SELECT MIN(fetched_at) FROM energy_data WHERE state_code = $1",
    )
    .bind(region_code)
    .fetch_one(pool)
    .await?;

    Ok(ts)
}

/// Insert all records in a single transaction.
pub async fn insert_records(pool: &PgPool, records: &[GenerationRecord]) -> Result<u64> {
    if records.is_empty() {
        return Ok(0);
    }

    let mut tx = pool.begin().await?;
    let inserted = insert_batch(&mut tx, records).await?;
    tx.commit().await?;

    Ok(inserted)
}

/// Delete a region's rows and insert `records` in their place, atomically.
pub async fn replace_region(
    pool: &PgPool,
    region_code: &str,
    records: &[GenerationRecord],
) -> Result<u64> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM energy_data WHERE state_code = $1")
        .bind(region_code)
        .execute(&mut *tx)
        .await?;

    let inserted = insert_batch(&mut tx, records).await?;
    tx.commit().await?;

    Ok(inserted)
}

pub async fn delete_region(pool: &PgPool, region_code: &str) -> Result<u64> {
    let result = sqlx::query("DELETE FROM energy_data WHERE state_code = $1")
        .bind(region_code)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Sum generation for the given fuel types across all regions, by period
/// ascending.
pub async fn period_totals(pool: &PgPool, fuel_types: &[String]) -> Result<Vec<PeriodTotal>> {
    let rows = sqlx::query_as::<_, PeriodTotal>(
        r#"
        SELECT
            period,
            SUM(generation_mwh) AS value
        FROM energy_data
        WHERE fuel_type = ANY($1)
        GROUP BY period
        ORDER BY period ASC
        "#,
    )
    .bind(fuel_types)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Every stored record in insertion order.
pub async fn all_records(pool: &PgPool) -> Result<Vec<GenerationRecord>> {
    let rows = sqlx::query_as::<_, GenerationRecord>(
        r#"
        SELECT
            state_code,
            period,
            sector,
            fuel_type,
            generation_mwh
        FROM energy_data
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

async fn insert_batch(conn: &mut PgConnection, records: &[GenerationRecord]) -> Result<u64> {
    let mut inserted = 0;

    for chunk in records.chunks(INSERT_CHUNK_ROWS) {
        let mut builder = QueryBuilder::<Postgres>::new(
            "INSERT INTO energy_data (state_code, period, sector, fuel_type, generation_mwh) ",
        );

        builder.push_values(chunk, |mut b, r| {
            b.push_bind(&r.region_code)
                .push_bind(&r.period)
                .push_bind(&r.sector)
                .push_bind(&r.fuel_type)
                .push_bind(r.generation_mwh);
        });

        let result = builder.build().execute(&mut *conn).await?;
        inserted += result.rows_affected();
    }

    Ok(inserted)
}
