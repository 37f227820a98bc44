//! Holt's linear trend method (additive trend, no seasonality).
//!
//! Smoothing weights and the initial level/trend are estimated together by
//! minimising the one-step-ahead sum of squared errors. Fitting returns a
//! `ModelFitError` instead of panicking so callers can pick a fallback.

use crate::core::optimize::{nelder_mead, NelderMeadConfig};
use thiserror::Error;

pub const MIN_OBSERVATIONS: usize = 2;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelFitError {
    #[error("need at least {required} observations, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("observation {index} is not a finite number")]
    NonFiniteObservation { index: usize },

    #[error("parameter search ended without a finite error (sse = {sse})")]
    NonFiniteObjective { sse: f64 },

    #[error("prediction for step {step} is not a finite number")]
    NonFinitePrediction { step: usize },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoltParameters {
    pub alpha: f64,
    pub beta: f64,
    pub initial_level: f64,
    pub initial_trend: f64,
}

impl HoltParameters {
    fn from_vector(v: &[f64]) -> Self {
        Self {
            alpha: v[0].clamp(0.0, 1.0),
            beta: v[1].clamp(0.0, 1.0),
            initial_level: v[2],
            initial_trend: v[3],
        }
    }
}

#[derive(Debug, Clone)]
pub struct HoltModel {
    params: HoltParameters,
    level: f64,
    trend: f64,
    sse: f64,
    converged: bool,
}

struct FilterState {
    level: f64,
    trend: f64,
    sse: f64,
}

fn run_filter(data: &[f64], params: &HoltParameters) -> FilterState {
    let HoltParameters {
        alpha,
        beta,
        initial_level,
        initial_trend,
    } = *params;

    let mut level = initial_level;
    let mut trend = initial_trend;
    let mut sse = 0.0;

    for &y in data {
        let error = y - (level + trend);
        sse += error * error;

        let prev_level = level;
        level = alpha * y + (1.0 - alpha) * (level + trend);
        trend = beta * (level - prev_level) + (1.0 - beta) * trend;
    }

    FilterState { level, trend, sse }
}

fn check_observations(data: &[f64]) -> Result<(), ModelFitError> {
    if data.len() < MIN_OBSERVATIONS {
        return Err(ModelFitError::InsufficientData {
            required: MIN_OBSERVATIONS,
            actual: data.len(),
        });
    }
    if let Some(index) = data.iter().position(|v| !v.is_finite()) {
        return Err(ModelFitError::NonFiniteObservation { index });
    }
    Ok(())
}

impl HoltModel {
    pub fn fit(data: &[f64]) -> Result<Self, ModelFitError> {
        Self::fit_with(data, &NelderMeadConfig::default())
    }

    /// Estimates `alpha`, `beta`, initial level and initial trend from `data`.
    pub fn fit_with(data: &[f64], config: &NelderMeadConfig) -> Result<Self, ModelFitError> {
        check_observations(data)?;

        let level0 = data[0];
        let trend0 = data[1] - data[0];
        let initial = [0.5, 0.1, level0, trend0];
        let steps = [
            0.1,
            0.05,
            (level0.abs() * 0.1).max(1.0),
            (trend0.abs() * 0.1).max(0.1),
        ];

        let result = nelder_mead(
            |v| run_filter(data, &HoltParameters::from_vector(v)).sse,
            &initial,
            &steps,
            config,
        );

        if !result.value.is_finite() {
            return Err(ModelFitError::NonFiniteObjective { sse: result.value });
        }
        if !result.converged {
            tracing::debug!(
                "Holt parameter search stopped after {} iterations without converging",
                result.iterations
            );
        }

        let params = HoltParameters::from_vector(&result.point);
        let mut model = Self::with_parameters(data, params)?;
        model.converged = result.converged;
        Ok(model)
    }

    /// Runs the smoothing recursion with fixed parameters.
    pub fn with_parameters(data: &[f64], params: HoltParameters) -> Result<Self, ModelFitError> {
        check_observations(data)?;

        let state = run_filter(data, &params);
        if !state.sse.is_finite() {
            return Err(ModelFitError::NonFiniteObjective { sse: state.sse });
        }

        Ok(Self {
            params,
            level: state.level,
            trend: state.trend,
            sse: state.sse,
            converged: true,
        })
    }

    pub fn forecast(&self, horizon: usize) -> Result<Vec<f64>, ModelFitError> {
        (1..=horizon)
            .map(|h| {
                let value = self.level + h as f64 * self.trend;
                if value.is_finite() {
                    Ok(value)
                } else {
                    Err(ModelFitError::NonFinitePrediction { step: h })
                }
            })
            .collect()
    }

    pub fn parameters(&self) -> &HoltParameters {
        &self.params
    }

    pub fn components(&self) -> (f64, f64) {
        (self.level, self.trend)
    }

    pub fn sse(&self) -> f64 {
        self.sse
    }

    pub fn converged(&self) -> bool {
        self.converged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_series_extrapolates_trend() {
        let data: Vec<f64> = (0..20).map(|t| 10.0 + 2.0 * t as f64).collect();
        let model = HoltModel::fit(&data).unwrap();
        let forecast = model.forecast(3).unwrap();

        assert_eq!(forecast.len(), 3);
        for (i, value) in forecast.iter().enumerate() {
            let expected = 10.0 + 2.0 * (20 + i) as f64;
            assert!(
                (value - expected).abs() < 0.5,
                "step {}: expected ~{}, got {}",
                i + 1,
                expected,
                value
            );
        }
    }

    #[test]
    fn test_constant_series_stays_flat() {
        let data = vec![5.0; 15];
        let model = HoltModel::fit(&data).unwrap();

        for value in model.forecast(4).unwrap() {
            assert!((value - 5.0).abs() < 1e-6);
        }
        assert!(model.sse() < 1e-9);
    }

    #[test]
    fn test_fixed_parameters_recursion() {
        let params = HoltParameters {
            alpha: 0.5,
            beta: 0.5,
            initial_level: 10.0,
            initial_trend: 0.0,
        };
        let model = HoltModel::with_parameters(&[12.0, 14.0], params).unwrap();
        // l1 = 11, b1 = 0.5; l2 = 0.5*14 + 0.5*11.5 = 12.75, b2 = 0.5*1.75 + 0.5*0.5 = 1.125
        let (level, trend) = model.components();
        assert!((level - 12.75).abs() < 1e-12);
        assert!((trend - 1.125).abs() < 1e-12);
        assert_eq!(model.forecast(2).unwrap(), vec![13.875, 15.0]);
    }

    #[test]
    fn test_rejects_non_finite_observations() {
        let data = [1.0, 2.0, f64::NAN, 4.0];
        assert_eq!(
            HoltModel::fit(&data).unwrap_err(),
            ModelFitError::NonFiniteObservation { index: 2 }
        );
    }

    #[test]
    fn test_rejects_single_observation() {
        assert!(matches!(
            HoltModel::fit(&[3.0]),
            Err(ModelFitError::InsufficientData { required: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_estimated_smoothing_weights_are_bounded() {
        let data = [3.0, 8.0, 2.0, 9.0, 1.0, 7.0, 4.0, 6.0, 5.0, 10.0, 2.0, 8.0];
        let params = *HoltModel::fit(&data).unwrap().parameters();
        assert!((0.0..=1.0).contains(&params.alpha));
        assert!((0.0..=1.0).contains(&params.beta));
    }
}
