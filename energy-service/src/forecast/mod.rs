//! Least-squares trend over renewable generation.

use energy_client::domain::PeriodTotal;
use serde::Serialize;

use crate::error::EnergyError;

/// Number of periods projected past the end of the history.
pub const FORECAST_HORIZON: usize = 5;

/// A labelled value: either an observed period or a projected one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub period: String,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Ordinary least-squares line through `(i, values[i])`.
///
/// Returns `None` for an empty series. A single point makes the slope
/// denominator zero, so the fit is non-finite; that is passed through.
pub fn fit_line(values: &[f64]) -> Option<LinearFit> {
    if values.is_empty() {
        return None;
    }

    let n = values.len() as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_xx) = (0.0, 0.0, 0.0, 0.0);
    for (i, y) in values.iter().enumerate() {
        let x = i as f64;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_xx += x * x;
    }

    let slope = (n * sum_xy - sum_x * sum_y) / (n * sum_xx - sum_x * sum_x);
    let intercept = (sum_y - slope * sum_x) / n;

    Some(LinearFit { slope, intercept })
}

/// Project [`FORECAST_HORIZON`] points past `history`, labelled
/// `Forecast 1` .. `Forecast 5`. Empty history yields no points.
pub fn forecast(history: &[ForecastPoint]) -> Vec<ForecastPoint> {
    let values: Vec<f64> = history.iter().map(|p| p.value).collect();
    let Some(fit) = fit_line(&values) else {
        return Vec::new();
    };

    let n = values.len();
    (1..=FORECAST_HORIZON)
        .map(|k| ForecastPoint {
            period: format!("Forecast {k}"),
            value: fit.at((n + k - 1) as f64),
        })
        .collect()
}

/// Like [`forecast`], but refuses a non-empty history shorter than
/// `min_points` instead of returning non-finite values.
pub fn forecast_checked(
    history: &[ForecastPoint],
    min_points: usize,
) -> Result<Vec<ForecastPoint>, EnergyError> {
    if !history.is_empty() && history.len() < min_points {
        return Err(EnergyError::InsufficientData(format!(
            "{} history point(s), at least {min_points} required",
            history.len()
        )));
    }
    Ok(forecast(history))
}

/// Turn per-period totals into forecast history, skipping periods with no
/// reported generation.
pub fn history_from_totals(totals: Vec<PeriodTotal>) -> Vec<ForecastPoint> {
    totals
        .into_iter()
        .filter_map(|t| t.value.map(|value| ForecastPoint { period: t.period, value }))
        .collect()
}
