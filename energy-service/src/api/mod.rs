use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use energy_client::domain::GenerationRecord;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::{
    cache::CacheFill,
    config::DEFAULT_REGION,
    error::EnergyError,
    export::{self, CSV_FILENAME},
    forecast::{self, ForecastPoint},
    store::GenerationStore,
    validation::validate_region,
};

#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<CacheFill>,
    pub store: Arc<dyn GenerationStore>,
    pub renewable_fuel_types: Arc<Vec<String>>,
    pub min_history_points: usize,
}

#[derive(Deserialize)]
struct RegionQuery {
    state: Option<String>,
}

impl RegionQuery {
    fn region(&self) -> Result<String, EnergyError> {
        validate_region(self.state.as_deref().unwrap_or(DEFAULT_REGION))
    }
}

#[derive(Serialize)]
struct ForecastResponse {
    history: Vec<ForecastPoint>,
    forecast: Vec<ForecastPoint>,
}

#[derive(Serialize)]
struct InvalidateResponse {
    state: String,
    deleted: u64,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/energy", get(get_energy).delete(invalidate_energy))
        .route("/api/forecast", get(get_forecast))
        .route("/api/export", get(export_csv))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn get_energy(
    State(state): State<AppState>,
    Query(query): Query<RegionQuery>,
) -> Result<Json<Vec<GenerationRecord>>, EnergyError> {
    let region = query.region()?;
    let records = state.cache.fetch_region(&region).await?;
    Ok(Json(records))
}

async fn invalidate_energy(
    State(state): State<AppState>,
    Query(query): Query<RegionQuery>,
) -> Result<Json<InvalidateResponse>, EnergyError> {
    let region = query.region()?;
    let deleted = state.cache.invalidate(&region).await?;
    Ok(Json(InvalidateResponse { state: region, deleted }))
}

async fn get_forecast(State(state): State<AppState>) -> Result<Json<ForecastResponse>, EnergyError> {
    let totals = state.store.period_totals(&state.renewable_fuel_types).await?;
    let history = forecast::history_from_totals(totals);
    let forecast = forecast::forecast_checked(&history, state.min_history_points)?;

    Ok(Json(ForecastResponse { history, forecast }))
}

async fn export_csv(State(state): State<AppState>) -> Result<Response, EnergyError> {
    let records = state.store.all_records().await?;
    let body = export::records_to_csv(&records)?;
    tracing::debug!(rows = records.len(), "csv export rendered");

    let disposition = format!("attachment; filename=\"{CSV_FILENAME}\"");
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

impl IntoResponse for EnergyError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            EnergyError::Store(_) => (StatusCode::SERVICE_UNAVAILABLE, "Server Error"),
            EnergyError::Upstream(_) => (StatusCode::BAD_GATEWAY, "Server Error"),
            EnergyError::Export(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server Error"),
            EnergyError::Validation(_) => (StatusCode::BAD_REQUEST, "Bad Request"),
            EnergyError::InsufficientData(_) => (StatusCode::UNPROCESSABLE_ENTITY, "Insufficient Data"),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, kind = self.kind(), "request failed");
        } else {
            tracing::warn!(error = %self, kind = self.kind(), "request rejected");
        }
        metrics::counter!("energy_http_errors_total", "kind" => self.kind()).increment(1);

        (status, body).into_response()
    }
}
