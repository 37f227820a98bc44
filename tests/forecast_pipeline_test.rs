use anyhow::Result;
use chrono::NaiveDate;
use retail_forecast::core::export::{from_table, to_table};
use retail_forecast::core::summary::summarize;
use retail_forecast::domain::model::{ForecastMethod, ForecastRequest, InventoryStatus};
use retail_forecast::{
    ForecastError, ForecastService, LoadOptions, LocalStorage, SalesDataset, TomlConfig,
};
use std::sync::Arc;
use tempfile::TempDir;

/// Writes a dataset in the shape of the retail inventory export, with dates in
/// day-month-year order and a few rows that cannot be parsed.
fn write_dataset(dir: &TempDir) -> Result<()> {
    let mut csv = String::from(
        "Date,Store ID,Product ID,Category,Region,Inventory Level,Units Sold,Units Ordered,Price\n",
    );
    let start = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
    for (i, date) in start.iter_days().take(40).enumerate() {
        let sales = 100 + (i % 7) * 3 + i;
        csv.push_str(&format!(
            "{},5,12,Groceries,North,{},{},60,33.5\n",
            date.format("%d-%m-%Y"),
            400 - i,
            sales
        ));
    }
    csv.push_str("31-02-2022,5,12,Groceries,North,10,999,60,33.5\n");
    csv.push_str(",5,12,Groceries,North,10,999,60,33.5\n");
    for date in start.iter_days().take(4) {
        csv.push_str(&format!(
            "{},5,13,Toys,North,50,8,10,9.99\n",
            date.format("%Y-%m-%d")
        ));
    }
    std::fs::write(dir.path().join("retail_store_inventory.csv"), csv)?;
    Ok(())
}

async fn load(dir: &TempDir) -> Result<SalesDataset> {
    let storage = LocalStorage::new(dir.path().to_str().unwrap());
    Ok(SalesDataset::load(
        &storage,
        "retail_store_inventory.csv",
        LoadOptions {
            normalize_ids: true,
        },
    )
    .await?)
}

#[tokio::test]
async fn test_load_dataset_from_disk() -> Result<()> {
    let dir = TempDir::new()?;
    write_dataset(&dir)?;
    let dataset = load(&dir).await?;

    assert_eq!(dataset.sales_column(), "Units Sold");
    assert_eq!(dataset.len(), 44);
    assert_eq!(dataset.dropped_rows(), 2);
    assert!(dataset
        .records()
        .windows(2)
        .all(|pair| pair[0].date <= pair[1].date));
    Ok(())
}

#[tokio::test]
async fn test_end_to_end_forecast_and_export() -> Result<()> {
    let dir = TempDir::new()?;
    write_dataset(&dir)?;
    std::fs::write(
        dir.path().join("forecast.toml"),
        "[forecast]\nstore_id = \"S005\"\ndefault_days = 14\n",
    )?;

    let config = TomlConfig::from_file(dir.path().join("forecast.toml"))?;
    let service = ForecastService::from_config(Arc::new(load(&dir).await?), &config);

    let request = service.limits().parse(Some("12"), None)?;
    assert_eq!(request.days, 14);

    let start = NaiveDate::from_ymd_opt(2030, 12, 25).unwrap();
    let outcome = service.run_from(&request, start)?;

    assert_eq!(outcome.forecast.method, ForecastMethod::Holt);
    assert_eq!(outcome.forecast.horizon(), 14);
    assert_eq!(outcome.forecast.points[0].date, start);
    assert_eq!(
        outcome.forecast.points[13].date,
        NaiveDate::from_ymd_opt(2031, 1, 7).unwrap()
    );
    assert_eq!(outcome.summary, summarize(&outcome.subseries, &outcome.forecast));
    // 40 days of history dwarfs two weeks of demand
    assert_eq!(outcome.summary.status, InventoryStatus::Sufficient);

    let export = service.export_csv_from(&request, start)?;
    assert_eq!(export.filename, "forecast_S005_P0012.csv");
    assert_eq!(from_table(&export.bytes)?, outcome.forecast.points);
    Ok(())
}

#[tokio::test]
async fn test_short_history_scenario() -> Result<()> {
    let dir = TempDir::new()?;
    write_dataset(&dir)?;
    let service = ForecastService::from_config(Arc::new(load(&dir).await?), &TomlConfig::default());

    let outcome = service.run(&ForecastRequest {
        product_number: 13,
        days: 5,
    })?;

    assert_eq!(outcome.forecast.method, ForecastMethod::MeanFallback);
    assert!(outcome
        .forecast
        .points
        .iter()
        .all(|p| p.predicted_sales == 8.0));
    assert_eq!(outcome.summary.total_historical_sales, 32);
    assert_eq!(outcome.summary.recommended_inventory, 40);
    assert_eq!(outcome.summary.status, InventoryStatus::Low);

    let parsed = from_table(&to_table(&outcome.forecast)?)?;
    assert_eq!(parsed, outcome.forecast.points);
    Ok(())
}

#[tokio::test]
async fn test_absent_product_is_not_found() -> Result<()> {
    let dir = TempDir::new()?;
    write_dataset(&dir)?;
    let service = ForecastService::from_config(Arc::new(load(&dir).await?), &TomlConfig::default());

    let err = service
        .run(&ForecastRequest {
            product_number: 99,
            days: 5,
        })
        .unwrap_err();
    assert!(matches!(err, ForecastError::NotFoundError { .. }));
    Ok(())
}

#[tokio::test]
async fn test_dataset_without_sales_column_fails_to_load() -> Result<()> {
    let dir = TempDir::new()?;
    std::fs::write(
        dir.path().join("retail_store_inventory.csv"),
        "Date,Store ID,Product ID,Price\n2022-01-01,S005,P0001,3.5\n",
    )?;

    let err = load(&dir).await.unwrap_err();
    let err = err.downcast::<ForecastError>()?;
    assert!(matches!(err, ForecastError::ConfigError { .. }));
    Ok(())
}
