use crate::core::dataset::SalesDataset;
use crate::core::export::{self, export_filename};
use crate::core::forecast::ForecastEngine;
use crate::core::summary::summarize;
use crate::domain::model::{ForecastOutcome, ForecastRequest};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::parse_bounded_field;
use chrono::NaiveDate;
use std::sync::Arc;

/// Highest product number that still fits the `P####` id format.
pub const MAX_PRODUCT_NUMBER: u32 = 9999;

#[derive(Debug, Clone)]
pub struct RequestLimits {
    pub default_days: u32,
    pub max_days: u32,
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self {
            default_days: 30,
            max_days: 365,
        }
    }
}

impl RequestLimits {
    /// Validates raw form fields. A missing or blank `days` uses the default.
    pub fn parse(&self, product: Option<&str>, days: Option<&str>) -> Result<ForecastRequest> {
        let product = product.unwrap_or("");
        let product_number = parse_bounded_field("product_id", product, 1, MAX_PRODUCT_NUMBER)?;

        let days = match days.map(str::trim) {
            None | Some("") => self.default_days,
            Some(raw) => parse_bounded_field("days", raw, 1, self.max_days)?,
        };

        Ok(ForecastRequest {
            product_number,
            days,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CsvExport {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Request flow for a single fixed store.
///
/// Holds the dataset behind an `Arc`; every call builds its own subseries and
/// forecast, so the service can be shared across concurrent handlers.
pub struct ForecastService {
    dataset: Arc<SalesDataset>,
    engine: ForecastEngine,
    store_id: String,
    limits: RequestLimits,
}

impl ForecastService {
    pub fn new(
        dataset: Arc<SalesDataset>,
        engine: ForecastEngine,
        store_id: impl Into<String>,
        limits: RequestLimits,
    ) -> Self {
        Self {
            dataset,
            engine,
            store_id: store_id.into(),
            limits,
        }
    }

    pub fn from_config<C: ConfigProvider>(dataset: Arc<SalesDataset>, config: &C) -> Self {
        Self::new(
            dataset,
            ForecastEngine::new(config.min_history()),
            config.store_id(),
            RequestLimits {
                default_days: config.default_days(),
                max_days: config.max_days(),
            },
        )
    }

    pub fn store_id(&self) -> &str {
        &self.store_id
    }

    pub fn limits(&self) -> &RequestLimits {
        &self.limits
    }

    pub fn dataset(&self) -> &SalesDataset {
        &self.dataset
    }

    pub fn run(&self, request: &ForecastRequest) -> Result<ForecastOutcome> {
        self.run_from(request, chrono::Local::now().date_naive())
    }

    pub fn run_from(&self, request: &ForecastRequest, start: NaiveDate) -> Result<ForecastOutcome> {
        let product_id = request.product_id();
        tracing::info!(
            "Forecast requested for {}/{} over {} days",
            self.store_id,
            product_id,
            request.days
        );

        let subseries = self.dataset.subseries(&self.store_id, &product_id)?;
        let forecast = self
            .engine
            .forecast_from(&subseries, request.days as usize, start);
        let summary = summarize(&subseries, &forecast);

        tracing::debug!(
            "{}/{}: method={:?}, history={}, recommended={}, status={:?}",
            self.store_id,
            product_id,
            forecast.method,
            summary.total_historical_sales,
            summary.recommended_inventory,
            summary.status
        );

        Ok(ForecastOutcome {
            subseries,
            forecast,
            summary,
        })
    }

    pub fn export_csv(&self, request: &ForecastRequest) -> Result<CsvExport> {
        self.export_csv_from(request, chrono::Local::now().date_naive())
    }

    pub fn export_csv_from(&self, request: &ForecastRequest, start: NaiveDate) -> Result<CsvExport> {
        let outcome = self.run_from(request, start)?;
        let bytes = export::to_table(&outcome.forecast)?;
        Ok(CsvExport {
            filename: export_filename(&self.store_id, outcome.subseries.product_id()),
            bytes,
        })
    }
}
