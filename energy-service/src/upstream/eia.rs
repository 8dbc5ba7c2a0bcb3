use std::time::{Duration, Instant};

use energy_client::domain::GenerationRecord;
use serde::Deserialize;

use super::GenerationUpstream;
use crate::{config::UpstreamConfig, error::EnergyError};

/// Client for the EIA v2 electric-power-operational-data endpoint.
pub struct EiaClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    frequency: String,
    page_size: u32,
}

#[derive(Deserialize)]
struct EiaEnvelope {
    response: EiaResponse,
}

#[derive(Deserialize)]
struct EiaResponse {
    data: Vec<EiaRow>,
}

#[derive(Deserialize)]
struct EiaRow {
    location: String,
    period: String,
    #[serde(rename = "sectorDescription")]
    sector_description: String,
    fueltypeid: String,
    #[serde(default)]
    generation: Option<NumberOrText>,
}

/// EIA serialises quantities as strings in most responses, numbers in some.
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

impl NumberOrText {
    fn into_f64(self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(v),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl From<EiaRow> for GenerationRecord {
    fn from(r: EiaRow) -> Self {
        GenerationRecord {
            region_code: r.location,
            period: r.period,
            sector: r.sector_description,
            fuel_type: r.fueltypeid,
            generation_mwh: r.generation.and_then(NumberOrText::into_f64),
        }
    }
}

impl EiaClient {
    pub fn new(cfg: &UpstreamConfig) -> Result<Self, EnergyError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = cfg.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(EnergyError::upstream)?;

        Ok(Self {
            client,
            base_url: cfg.base_url.clone(),
            api_key: cfg.api_key.clone(),
            frequency: cfg.frequency.clone(),
            page_size: cfg.page_size,
        })
    }

    /// Query string for the newest page of generation data for a region.
    fn query_params(&self, region_code: &str) -> Vec<(&'static str, String)> {
        vec![
            ("api_key", self.api_key.clone()),
            ("frequency", self.frequency.clone()),
            ("data[0]", "generation".to_string()),
            ("facets[location][]", region_code.to_string()),
            ("sort[0][column]", "period".to_string()),
            ("sort[0][direction]", "desc".to_string()),
            ("offset", "0".to_string()),
            ("length", self.page_size.to_string()),
        ]
    }
}

/// Parse an EIA response body into records, preserving upstream order.
pub fn parse_response(body: &[u8]) -> Result<Vec<GenerationRecord>, EnergyError> {
    let envelope: EiaEnvelope = serde_json::from_slice(body)
        .map_err(|e| EnergyError::Upstream(format!("malformed EIA payload: {e}")))?;

    Ok(envelope.response.data.into_iter().map(Into::into).collect())
}

#[async_trait::async_trait]
impl GenerationUpstream for EiaClient {
    async fn fetch_region(&self, region_code: &str) -> Result<Vec<GenerationRecord>, EnergyError> {
        metrics::counter!("energy_upstream_requests_total").increment(1);
        let started = Instant::now();

        let result = async {
            let resp = self
                .client
                .get(&self.base_url)
                .query(&self.query_params(region_code))
                .send()
                .await
                .map_err(|e| EnergyError::Upstream(format!("EIA request failed: {e}")))?;

            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                let snippet: String = body.chars().take(500).collect();
                return Err(EnergyError::Upstream(format!("EIA returned {status}: {snippet}")));
            }

            let body = resp
                .bytes()
                .await
                .map_err(|e| EnergyError::Upstream(format!("EIA body read failed: {e}")))?;

            parse_response(&body)
        }
        .await;

        metrics::histogram!("energy_upstream_latency_seconds").record(started.elapsed().as_secs_f64());

        match &result {
            Ok(records) => {
                tracing::debug!(region = region_code, records = records.len(), "EIA page fetched");
            }
            Err(e) => {
                metrics::counter!("energy_upstream_errors_total").increment(1);
                tracing::warn!(region = region_code, error = %e, "EIA fetch failed");
            }
        }

        result
    }
}
