use crate::utils::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row of the historical sales table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalRecord {
    pub date: NaiveDate,
    pub store_id: String,
    pub product_id: String,
    pub sales: f64,
}

/// Historical records for a single (store, product) pair, ascending by date.
///
/// Never empty: construction fails with `NotFoundError` when no record matched,
/// so the forecasting code always has at least one observation to work with.
#[derive(Debug, Clone, PartialEq)]
pub struct Subseries {
    store_id: String,
    product_id: String,
    records: Vec<HistoricalRecord>,
}

impl Subseries {
    pub fn new(
        store_id: impl Into<String>,
        product_id: impl Into<String>,
        records: Vec<HistoricalRecord>,
    ) -> Result<Self> {
        let store_id = store_id.into();
        let product_id = product_id.into();
        if records.is_empty() {
            return Err(ForecastError::NotFoundError {
                store_id,
                product_id,
            });
        }
        Ok(Self {
            store_id,
            product_id,
            records,
        })
    }

    pub fn store_id(&self) -> &str {
        &self.store_id
    }

    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    pub fn records(&self) -> &[HistoricalRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn sales(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.sales).collect()
    }

    pub fn mean_sales(&self) -> f64 {
        let total: f64 = self.records.iter().map(|r| r.sales).sum();
        total / self.records.len() as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub predicted_sales: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastMethod {
    /// Additive-trend exponential smoothing with estimated parameters.
    Holt,
    /// Historical mean repeated for every future day.
    MeanFallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub method: ForecastMethod,
    pub points: Vec<ForecastPoint>,
}

impl ForecastResult {
    pub fn horizon(&self) -> usize {
        self.points.len()
    }

    pub fn total_predicted(&self) -> f64 {
        self.points.iter().map(|p| p.predicted_sales).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InventoryStatus {
    Sufficient,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub store_id: String,
    pub product_id: String,
    pub total_historical_sales: i64,
    pub recommended_inventory: i64,
    pub status: InventoryStatus,
    pub horizon_days: usize,
}

/// A validated forecast request. Store comes from configuration, not the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastRequest {
    pub product_number: u32,
    pub days: u32,
}

impl ForecastRequest {
    pub fn product_id(&self) -> String {
        crate::core::ids::product_id_from_number(self.product_number)
    }
}

/// Everything a forecast request produces.
#[derive(Debug, Clone)]
pub struct ForecastOutcome {
    pub subseries: Subseries,
    pub forecast: ForecastResult,
    pub summary: Summary,
}
