use crate::domain::model::{ForecastResult, InventoryStatus, Subseries, Summary};

/// Compares forecast demand with the historical total.
///
/// Both sums are truncated toward zero. A forecast that reaches the
/// historical total (equality included) is reported as `Low`.
pub fn summarize(subseries: &Subseries, forecast: &ForecastResult) -> Summary {
    let total_historical_sales = subseries.records().iter().map(|r| r.sales).sum::<f64>() as i64;
    let recommended_inventory = forecast.total_predicted() as i64;

    let status = if recommended_inventory >= total_historical_sales {
        InventoryStatus::Low
    } else {
        InventoryStatus::Sufficient
    };

    Summary {
        store_id: subseries.store_id().to_string(),
        product_id: subseries.product_id().to_string(),
        total_historical_sales,
        recommended_inventory,
        status,
        horizon_days: forecast.horizon(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ForecastMethod, ForecastPoint, HistoricalRecord};
    use chrono::NaiveDate;

    fn series(sales: &[f64]) -> Subseries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let records = start
            .iter_days()
            .zip(sales)
            .map(|(date, &sales)| HistoricalRecord {
                date,
                store_id: "S005".to_string(),
                product_id: "P0003".to_string(),
                sales,
            })
            .collect();
        Subseries::new("S005", "P0003", records).unwrap()
    }

    fn forecast(values: &[f64]) -> ForecastResult {
        let start = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        ForecastResult {
            method: ForecastMethod::Holt,
            points: start
                .iter_days()
                .zip(values)
                .map(|(date, &predicted_sales)| ForecastPoint {
                    date,
                    predicted_sales,
                })
                .collect(),
        }
    }

    #[test]
    fn test_forecast_above_history_is_low() {
        let summary = summarize(&series(&[100.0, 100.0, 100.0]), &forecast(&[150.0, 160.0]));
        assert_eq!(summary.total_historical_sales, 300);
        assert_eq!(summary.recommended_inventory, 310);
        assert_eq!(summary.status, InventoryStatus::Low);
        assert_eq!(summary.horizon_days, 2);
        assert_eq!(summary.store_id, "S005");
        assert_eq!(summary.product_id, "P0003");
    }

    #[test]
    fn test_forecast_below_history_is_sufficient() {
        let summary = summarize(&series(&[100.0, 100.0, 100.0]), &forecast(&[150.0, 149.0]));
        assert_eq!(summary.recommended_inventory, 299);
        assert_eq!(summary.status, InventoryStatus::Sufficient);
    }

    #[test]
    fn test_equal_totals_count_as_low() {
        let summary = summarize(&series(&[50.0, 50.0]), &forecast(&[60.0, 40.0]));
        assert_eq!(summary.status, InventoryStatus::Low);
    }

    #[test]
    fn test_sums_truncate_toward_zero() {
        let summary = summarize(&series(&[10.6, 10.6]), &forecast(&[1.99, 1.99, -0.5]));
        assert_eq!(summary.total_historical_sales, 21);
        assert_eq!(summary.recommended_inventory, 3);

        let negative = summarize(&series(&[1.0]), &forecast(&[-2.75]));
        assert_eq!(negative.recommended_inventory, -2);
        assert_eq!(negative.status, InventoryStatus::Sufficient);
    }

    #[test]
    fn test_summarize_is_idempotent() {
        let history = series(&[12.0, 7.5, 9.25]);
        let predicted = forecast(&[10.11, 9.87, 11.02]);
        assert_eq!(summarize(&history, &predicted), summarize(&history, &predicted));
    }
}
