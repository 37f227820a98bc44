use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to parse configuration '{field}': {message}")]
    ConfigParseError { field: String, message: String },

    #[error("No data found for Store {store_id} and Product {product_id}")]
    NotFoundError {
        store_id: String,
        product_id: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Invalid username or password")]
    AuthenticationError,

    #[error("Login required")]
    UnauthorizedError,

    #[error("Username '{username}' already exists")]
    DuplicateUserError { username: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Request,
    Authentication,
    Storage,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ForecastError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ConfigParseError { .. } => ErrorCategory::Configuration,
            Self::NotFoundError { .. } | Self::ValidationError { .. } => ErrorCategory::Request,
            Self::AuthenticationError
            | Self::UnauthorizedError
            | Self::DuplicateUserError { .. } => ErrorCategory::Authentication,
            Self::CsvError(_) | Self::IoError(_) => ErrorCategory::Storage,
            Self::SerializationError(_) | Self::ProcessingError { .. } => {
                ErrorCategory::Processing
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Request | ErrorCategory::Authentication => ErrorSeverity::Low,
            ErrorCategory::Processing => ErrorSeverity::Medium,
            ErrorCategory::Storage => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    /// Per-request errors keep their own message; everything else is wrapped.
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::NotFoundError { .. }
            | Self::ValidationError { .. }
            | Self::AuthenticationError
            | Self::UnauthorizedError
            | Self::DuplicateUserError { .. } => self.to_string(),
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ConfigParseError { .. } => {
                format!("The service is misconfigured: {}", self)
            }
            Self::CsvError(_) | Self::IoError(_) => {
                format!("Could not read or write data files: {}", self)
            }
            Self::SerializationError(_) | Self::ProcessingError { .. } => {
                format!("Internal processing failure: {}", self)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::ConfigError { .. } => {
                "Check that the dataset has Date, Store ID, Product ID and a sales column"
            }
            Self::InvalidConfigValueError { .. } | Self::ConfigParseError { .. } => {
                "Fix the offending value in the TOML file or command line flags"
            }
            Self::NotFoundError { .. } => "Pick a product number that exists for this store",
            Self::ValidationError { .. } => "Enter positive whole numbers for product and days",
            Self::AuthenticationError => "Check the username and password",
            Self::UnauthorizedError => "Log in and send the session token with the request",
            Self::DuplicateUserError { .. } => "Choose a different username",
            Self::CsvError(_) | Self::IoError(_) => "Verify the file paths and permissions",
            Self::SerializationError(_) | Self::ProcessingError { .. } => {
                "Retry the request; report it if the failure persists"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ForecastError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_errors_are_low_severity() {
        let err = ForecastError::NotFoundError {
            store_id: "S005".to_string(),
            product_id: "P0001".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Request);
        assert_eq!(err.severity(), ErrorSeverity::Low);
        assert_eq!(
            err.user_friendly_message(),
            "No data found for Store S005 and Product P0001"
        );
    }

    #[test]
    fn test_configuration_errors_are_critical() {
        let err = ForecastError::config("No usable sales column found");
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.user_friendly_message().contains("misconfigured"));
    }
}
