use clap::Parser;
use retail_forecast::adapters::chart::SvgChartRenderer;
use retail_forecast::adapters::credentials::CsvCredentialStore;
use retail_forecast::adapters::http::{self, AppState};
use retail_forecast::adapters::sessions::InMemorySessionStore;
use retail_forecast::core::{ChartRenderer, ConfigProvider};
use retail_forecast::utils::error::ErrorSeverity;
use retail_forecast::utils::{logger, validation::Validate};
use retail_forecast::{
    CliConfig, ForecastError, ForecastService, LoadOptions, LocalStorage, SalesDataset,
};
use std::sync::Arc;

fn exit_with(e: &ForecastError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low | ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("🚀 Starting retail-forecast");

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };
    if cli.verbose {
        tracing::debug!("Resolved config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        exit_with(&e);
    }

    // 資料集只在啟動時載入一次，之後唯讀共享
    let storage = LocalStorage::new(".");
    let options = LoadOptions {
        normalize_ids: config.normalize_ids(),
    };
    let dataset = match SalesDataset::load(&storage, config.dataset_path(), options).await {
        Ok(dataset) => dataset,
        Err(e) => exit_with(&e),
    };
    tracing::info!(
        "📊 {} records loaded, sales column '{}'",
        dataset.len(),
        dataset.sales_column()
    );

    let credentials = CsvCredentialStore::new(storage.clone(), config.users_path());
    if let Err(e) = credentials.ensure_exists().await {
        exit_with(&e);
    }

    let chart: Option<Arc<dyn ChartRenderer>> = if config.chart_enabled() {
        Some(Arc::new(SvgChartRenderer::default()))
    } else {
        None
    };

    let state = AppState {
        service: Arc::new(ForecastService::from_config(Arc::new(dataset), &config)),
        credentials: Arc::new(credentials),
        sessions: Arc::new(InMemorySessionStore::new()),
        chart,
    };

    tracing::info!("🏬 Forecasting for store {}", config.store_id());
    if let Err(e) = http::serve(state, config.bind_address()).await {
        exit_with(&e);
    }

    Ok(())
}
