use crate::core::dataset::parse_date;
use crate::domain::model::{ForecastPoint, ForecastResult};
use crate::utils::error::{ForecastError, Result};

pub const DATE_HEADER: &str = "Date";
pub const PREDICTED_HEADER: &str = "Predicted_Sales";
pub const CONTENT_TYPE: &str = "text/csv";

pub fn export_filename(store_id: &str, product_id: &str) -> String {
    format!("forecast_{}_{}.csv", store_id, product_id)
}

/// Serializes a forecast as `Date,Predicted_Sales` CSV.
pub fn to_table(forecast: &ForecastResult) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([DATE_HEADER, PREDICTED_HEADER])?;

    for point in &forecast.points {
        writer.write_record([
            point.date.format("%Y-%m-%d").to_string(),
            format!("{:.2}", point.predicted_sales),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| ForecastError::IoError(e.into_error()))
}

/// Reads back a table produced by [`to_table`].
pub fn from_table(bytes: &[u8]) -> Result<Vec<ForecastPoint>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = reader.headers()?;
    if headers.get(0) != Some(DATE_HEADER) || headers.get(1) != Some(PREDICTED_HEADER) {
        return Err(ForecastError::ProcessingError {
            message: format!("Unexpected forecast table header: {:?}", headers),
        });
    }

    let mut points = Vec::new();
    for (line, row) in reader.records().enumerate() {
        let row = row?;
        let raw_date = row.get(0).unwrap_or("");
        let raw_value = row.get(1).unwrap_or("");

        let date = parse_date(raw_date).ok_or_else(|| ForecastError::ProcessingError {
            message: format!("Invalid date '{}' at line {}", raw_date, line + 2),
        })?;
        let predicted_sales = raw_value
            .parse::<f64>()
            .map_err(|e| ForecastError::ProcessingError {
                message: format!("Invalid value '{}' at line {}: {}", raw_value, line + 2, e),
            })?;

        points.push(ForecastPoint {
            date,
            predicted_sales,
        });
    }

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ForecastMethod;
    use chrono::NaiveDate;

    fn sample() -> ForecastResult {
        let start = NaiveDate::from_ymd_opt(2025, 12, 30).unwrap();
        ForecastResult {
            method: ForecastMethod::Holt,
            points: start
                .iter_days()
                .zip([101.5, 98.0, -3.25])
                .map(|(date, predicted_sales)| ForecastPoint {
                    date,
                    predicted_sales,
                })
                .collect(),
        }
    }

    #[test]
    fn test_table_layout() {
        let bytes = to_table(&sample()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines,
            vec![
                "Date,Predicted_Sales",
                "2025-12-30,101.50",
                "2025-12-31,98.00",
                "2026-01-01,-3.25",
            ]
        );
    }

    #[test]
    fn test_table_parses_back() {
        let forecast = sample();
        let parsed = from_table(&to_table(&forecast).unwrap()).unwrap();
        assert_eq!(parsed, forecast.points);
    }

    #[test]
    fn test_empty_forecast_is_header_only() {
        let empty = ForecastResult {
            method: ForecastMethod::MeanFallback,
            points: vec![],
        };
        let text = String::from_utf8(to_table(&empty).unwrap()).unwrap();
        assert_eq!(text, "Date,Predicted_Sales\n");
    }

    #[test]
    fn test_from_table_rejects_foreign_header() {
        let err = from_table(b"day,value\n2025-01-01,3\n").unwrap_err();
        assert!(matches!(err, ForecastError::ProcessingError { .. }));
    }

    #[test]
    fn test_export_filename() {
        assert_eq!(export_filename("S005", "P0007"), "forecast_S005_P0007.csv");
    }
}
