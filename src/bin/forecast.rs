use clap::Parser;
use retail_forecast::core::export::export_filename;
use retail_forecast::core::{ConfigProvider, Storage};
use retail_forecast::domain::model::{ForecastOutcome, InventoryStatus};
use retail_forecast::utils::{logger, validation::Validate};
use retail_forecast::{ForecastService, LoadOptions, LocalStorage, SalesDataset, TomlConfig};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "forecast")]
#[command(about = "One-shot sales forecast for a single product")]
struct Args {
    /// Optional TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Sales dataset CSV (overrides dataset.path)
    #[arg(long)]
    dataset: Option<String>,

    /// Store to forecast for (overrides forecast.store_id)
    #[arg(long)]
    store_id: Option<String>,

    /// Product number, formatted as P####
    #[arg(short, long)]
    product: String,

    /// Days to forecast (defaults to forecast.default_days)
    #[arg(short, long)]
    days: Option<String>,

    /// Write the forecast table here; defaults to forecast_<store>_<product>.csv
    #[arg(short, long)]
    output: Option<String>,

    /// Print the summary without writing a CSV
    #[arg(long)]
    no_export: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose);

    let mut config = match &args.config {
        Some(path) => TomlConfig::from_file(path)?,
        None => TomlConfig::default(),
    };
    if let Some(dataset) = &args.dataset {
        config.dataset.path = dataset.clone();
    }
    if let Some(store_id) = &args.store_id {
        config.forecast.store_id = store_id.clone();
    }
    config.validate()?;

    let storage = LocalStorage::new(".");
    let dataset = SalesDataset::load(
        &storage,
        config.dataset_path(),
        LoadOptions {
            normalize_ids: config.normalize_ids(),
        },
    )
    .await?;

    let service = ForecastService::from_config(Arc::new(dataset), &config);
    let request = service
        .limits()
        .parse(Some(args.product.as_str()), args.days.as_deref())?;

    let outcome = match service.run(&request) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());
            std::process::exit(2);
        }
    };

    display_summary(&outcome);

    if !args.no_export {
        let path = args.output.clone().unwrap_or_else(|| {
            export_filename(service.store_id(), outcome.subseries.product_id())
        });
        let table = retail_forecast::core::export::to_table(&outcome.forecast)?;
        storage.write_file(&path, &table).await?;
        println!("📁 Forecast saved to: {}", path);
    }

    Ok(())
}

fn display_summary(outcome: &ForecastOutcome) {
    let summary = &outcome.summary;
    println!("📋 Forecast Summary:");
    println!("  Store: {}", summary.store_id);
    println!("  Product: {}", summary.product_id);
    println!("  History: {} records", outcome.subseries.len());
    println!("  Method: {:?}", outcome.forecast.method);
    println!("  Horizon: {} days", summary.horizon_days);
    println!("  Total historical sales: {}", summary.total_historical_sales);
    println!("  Recommended inventory: {}", summary.recommended_inventory);
    match summary.status {
        InventoryStatus::Sufficient => println!("  Status: ✅ Sufficient"),
        InventoryStatus::Low => println!("  Status: ⚠️ Low"),
    }
    println!();
    for point in &outcome.forecast.points {
        println!("  {}  {:>10.2}", point.date, point.predicted_sales);
    }
    println!();
}
