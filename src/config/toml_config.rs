use crate::core::forecast::DEFAULT_MIN_HISTORY;
use crate::core::ConfigProvider;
use crate::utils::error::{ForecastError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub server: ServerConfig,
    pub dataset: DatasetConfig,
    pub forecast: ForecastConfig,
    pub auth: AuthConfig,
    pub chart: ChartConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub path: String,
    pub normalize_ids: bool,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: "retail_store_inventory.csv".to_string(),
            normalize_ids: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub store_id: String,
    pub default_days: u32,
    pub max_days: u32,
    pub min_history: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            store_id: "S005".to_string(),
            default_days: 30,
            max_days: 365,
            min_history: DEFAULT_MIN_HISTORY,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub users_path: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            users_path: "users.csv".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub enabled: bool,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ForecastError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ForecastError::ConfigParseError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATASET_PATH})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ForecastError::ConfigParseError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_socket_addr("server.bind", &self.server.bind)?;
        validation::validate_path("dataset.path", &self.dataset.path)?;
        validation::validate_path("auth.users_path", &self.auth.users_path)?;
        validation::validate_non_empty_string("forecast.store_id", &self.forecast.store_id)?;
        validation::validate_positive_number("forecast.min_history", self.forecast.min_history, 2)?;
        validation::validate_range("forecast.max_days", self.forecast.max_days, 1, 3650)?;
        validation::validate_range(
            "forecast.default_days",
            self.forecast.default_days,
            1,
            self.forecast.max_days,
        )?;
        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn dataset_path(&self) -> &str {
        &self.dataset.path
    }

    fn users_path(&self) -> &str {
        &self.auth.users_path
    }

    fn bind_address(&self) -> &str {
        &self.server.bind
    }

    fn store_id(&self) -> &str {
        &self.forecast.store_id
    }

    fn default_days(&self) -> u32 {
        self.forecast.default_days
    }

    fn max_days(&self) -> u32 {
        self.forecast.max_days
    }

    fn min_history(&self) -> usize {
        self.forecast.min_history
    }

    fn normalize_ids(&self) -> bool {
        self.dataset.normalize_ids
    }

    fn chart_enabled(&self) -> bool {
        self.chart.enabled
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[server]
bind = "0.0.0.0:8080"

[dataset]
path = "data/inventory.csv"
normalize_ids = true

[forecast]
store_id = "S001"
default_days = 14
max_days = 90
min_history = 12

[auth]
users_path = "data/users.csv"

[chart]
enabled = false
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.dataset_path(), "data/inventory.csv");
        assert!(config.normalize_ids());
        assert_eq!(config.store_id(), "S001");
        assert_eq!(config.default_days(), 14);
        assert_eq!(config.max_days(), 90);
        assert_eq!(config.min_history(), 12);
        assert_eq!(config.users_path(), "data/users.csv");
        assert!(!config.chart_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = TomlConfig::from_toml_str("[forecast]\nstore_id = \"S002\"\n").unwrap();

        assert_eq!(config.store_id(), "S002");
        assert_eq!(config.default_days(), 30);
        assert_eq!(config.min_history(), DEFAULT_MIN_HISTORY);
        assert_eq!(config.dataset_path(), "retail_store_inventory.csv");
        assert!(config.chart_enabled());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("RETAIL_FORECAST_TEST_DATASET", "/tmp/sales.csv");

        let toml_content = r#"
[dataset]
path = "${RETAIL_FORECAST_TEST_DATASET}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.dataset.path, "/tmp/sales.csv");

        std::env::remove_var("RETAIL_FORECAST_TEST_DATASET");
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[server]
bind = "not-an-address"
"#;
        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());

        let toml_content = r#"
[forecast]
default_days = 120
max_days = 60
"#;
        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ForecastError::InvalidConfigValueError { .. })
        ));
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let err = TomlConfig::from_toml_str("[forecast\nstore_id =").unwrap_err();
        assert!(matches!(err, ForecastError::ConfigParseError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[auth]\nusers_path = \"accounts.csv\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.users_path(), "accounts.csv");
    }
}
