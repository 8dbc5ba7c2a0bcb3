/// One observed generation data point, as stored in `energy_data`.
///
/// JSON field names follow the table's column names so cached and freshly
/// fetched responses share one shape.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenerationRecord {
    #[sqlx(rename = "state_code")]
    #[cfg_attr(feature = "serde", serde(rename = "state_code"))]
    pub region_code: String,
    pub period: String,
    pub sector: String,
    pub fuel_type: String,
    pub generation_mwh: Option<f64>,
}

/// Summed generation for one period across regions.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct PeriodTotal {
    pub period: String,
    pub value: Option<f64>,
}
