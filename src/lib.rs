pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::http::{router, AppState};
pub use config::{cli::LocalStorage, toml_config::TomlConfig};
pub use core::{
    dataset::{LoadOptions, SalesDataset},
    forecast::ForecastEngine,
    service::ForecastService,
};
pub use utils::error::{ForecastError, Result};
