pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use toml_config::TomlConfig;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "retail-forecast")]
#[command(about = "Sales forecasting service for a single retail store")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Sales dataset CSV (overrides dataset.path)
    #[arg(long)]
    pub dataset: Option<String>,

    /// Credential CSV (overrides auth.users_path)
    #[arg(long)]
    pub users: Option<String>,

    /// Listen address (overrides server.bind)
    #[arg(long)]
    pub bind: Option<String>,

    /// Store to forecast for (overrides forecast.store_id)
    #[arg(long)]
    pub store_id: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Loads the TOML file (if any) and applies command line overrides on top.
    pub fn resolve(&self) -> Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };

        if let Some(dataset) = &self.dataset {
            config.dataset.path = dataset.clone();
        }
        if let Some(users) = &self.users {
            config.auth.users_path = users.clone();
        }
        if let Some(bind) = &self.bind {
            config.server.bind = bind.clone();
        }
        if let Some(store_id) = &self.store_id {
            config.forecast.store_id = store_id.clone();
        }

        Ok(config)
    }
}
