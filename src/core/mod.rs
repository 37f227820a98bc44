pub mod dataset;
pub mod export;
pub mod forecast;
pub mod holt;
pub mod ids;
pub mod optimize;
pub mod service;
pub mod summary;

pub use crate::domain::model::{
    ForecastOutcome, ForecastPoint, ForecastRequest, ForecastResult, HistoricalRecord, Subseries,
    Summary,
};
pub use crate::domain::ports::{
    ChartRenderer, ConfigProvider, CredentialStore, SessionStore, Storage,
};
pub use crate::utils::error::Result;
