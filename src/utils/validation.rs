use crate::utils::error::{ForecastError, Result};
use std::net::SocketAddr;

/// Implemented by configuration sections that can check themselves before use.
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, value: impl ToString, reason: impl Into<String>) -> ForecastError {
    ForecastError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

pub fn validate_path(field: &str, path: &str) -> Result<()> {
    match path {
        "" => Err(invalid(field, path, "path is empty")),
        p if p.contains('\0') => Err(invalid(field, path, "path contains a NUL byte")),
        _ => Ok(()),
    }
}

pub fn validate_socket_addr(field: &str, addr: &str) -> Result<()> {
    addr.parse::<SocketAddr>()
        .map(|_| ())
        .map_err(|e| invalid(field, addr, format!("not a socket address: {}", e)))
}

pub fn validate_positive_number(field: &str, value: usize, min: usize) -> Result<()> {
    if value >= min {
        Ok(())
    } else {
        Err(invalid(field, value, format!("must be at least {}", min)))
    }
}

pub fn validate_non_empty_string(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(invalid(field, value, "must not be blank"))
    } else {
        Ok(())
    }
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(invalid(field, value, format!("must lie in {}..={}", min, max)))
    }
}

/// Parses a user-supplied whole number and checks it against `[min, max]`.
///
/// Unlike the config validators above this reports a request-level
/// `ValidationError`, since it runs on form input.
pub fn parse_bounded_field(field_name: &str, raw: &str, min: u32, max: u32) -> Result<u32> {
    let trimmed = raw.trim();
    let value: u32 = trimmed.parse().map_err(|_| {
        ForecastError::validation(format!(
            "{} must be a whole number, got '{}'",
            field_name, trimmed
        ))
    })?;

    if value < min || value > max {
        return Err(ForecastError::validation(format!(
            "{} must be between {} and {}, got {}",
            field_name, min, max, value
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("dataset.path", "retail_store_inventory.csv").is_ok());
        assert!(validate_path("dataset.path", "").is_err());
        assert!(validate_path("dataset.path", "bad\0path").is_err());
    }

    #[test]
    fn test_validate_socket_addr() {
        assert!(validate_socket_addr("server.bind", "127.0.0.1:8080").is_ok());
        assert!(validate_socket_addr("server.bind", "localhost").is_err());
    }

    #[test]
    fn test_validate_min_history() {
        assert!(validate_positive_number("forecast.min_history", 10, 2).is_ok());
        assert!(validate_positive_number("forecast.min_history", 1, 2).is_err());
    }

    #[test]
    fn test_parse_bounded_field() {
        assert_eq!(parse_bounded_field("days", " 30 ", 1, 365).unwrap(), 30);
        assert!(matches!(
            parse_bounded_field("days", "abc", 1, 365),
            Err(ForecastError::ValidationError { .. })
        ));
        assert!(parse_bounded_field("days", "0", 1, 365).is_err());
        assert!(parse_bounded_field("days", "-4", 1, 365).is_err());
        assert!(parse_bounded_field("days", "366", 1, 365).is_err());
    }
}
