use crate::core::holt::{HoltModel, ModelFitError};
use crate::core::optimize::NelderMeadConfig;
use crate::domain::model::{ForecastMethod, ForecastPoint, ForecastResult, Subseries};
use chrono::{Local, NaiveDate};

/// Below this many observations the trend estimate is too unstable to use.
pub const DEFAULT_MIN_HISTORY: usize = 10;

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `horizon` consecutive calendar days starting at `start`.
pub fn future_dates(start: NaiveDate, horizon: usize) -> Vec<NaiveDate> {
    start.iter_days().take(horizon).collect()
}

#[derive(Debug, Clone)]
pub struct ForecastEngine {
    min_history: usize,
    optimizer: NelderMeadConfig,
}

impl Default for ForecastEngine {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_HISTORY)
    }
}

impl ForecastEngine {
    pub fn new(min_history: usize) -> Self {
        Self {
            min_history,
            optimizer: NelderMeadConfig::default(),
        }
    }

    /// Forecasts `horizon` days starting today (local calendar date).
    pub fn forecast(&self, subseries: &Subseries, horizon: usize) -> ForecastResult {
        self.forecast_from(subseries, horizon, Local::now().date_naive())
    }

    pub fn forecast_from(
        &self,
        subseries: &Subseries,
        horizon: usize,
        start: NaiveDate,
    ) -> ForecastResult {
        let (method, values) = self.predict(subseries, horizon);

        let points = future_dates(start, horizon)
            .into_iter()
            .zip(values)
            .map(|(date, value)| ForecastPoint {
                date,
                predicted_sales: round2(value),
            })
            .collect();

        ForecastResult { method, points }
    }

    fn predict(&self, subseries: &Subseries, horizon: usize) -> (ForecastMethod, Vec<f64>) {
        let mean_fallback = || {
            (
                ForecastMethod::MeanFallback,
                vec![subseries.mean_sales(); horizon],
            )
        };

        if subseries.len() < self.min_history {
            tracing::debug!(
                "{}/{}: {} records below minimum of {}, using mean fallback",
                subseries.store_id(),
                subseries.product_id(),
                subseries.len(),
                self.min_history
            );
            return mean_fallback();
        }

        match self.fit_and_predict(&subseries.sales(), horizon) {
            Ok(values) => (ForecastMethod::Holt, values),
            Err(e) => {
                tracing::warn!(
                    "Forecast failed for {}/{}: {}; using mean fallback",
                    subseries.store_id(),
                    subseries.product_id(),
                    e
                );
                mean_fallback()
            }
        }
    }

    fn fit_and_predict(&self, sales: &[f64], horizon: usize) -> Result<Vec<f64>, ModelFitError> {
        let model = HoltModel::fit_with(sales, &self.optimizer)?;
        let params = model.parameters();
        tracing::debug!(
            "Fitted Holt model: alpha={:.4}, beta={:.4}, sse={:.4}, converged={}",
            params.alpha,
            params.beta,
            model.sse(),
            model.converged()
        );
        model.forecast(horizon)
    }
}
