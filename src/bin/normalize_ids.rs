use clap::Parser;
use retail_forecast::core::dataset::{PRODUCT_COLUMN, STORE_COLUMN};
use retail_forecast::core::ids::{normalize_product_id, normalize_store_id};
use retail_forecast::core::Storage;
use retail_forecast::utils::logger;
use retail_forecast::{ForecastError, LocalStorage};

#[derive(Parser)]
#[command(name = "normalize-ids")]
#[command(about = "Rewrite Store ID / Product ID columns as S### / P####")]
struct Args {
    /// Dataset to read
    #[arg(short, long, default_value = "retail_store_inventory.csv")]
    input: String,

    /// Where to write the result; defaults to rewriting the input in place
    #[arg(short, long)]
    output: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Rewrites the id columns of a CSV table, leaving every other field untouched.
fn normalize_table(input: &[u8]) -> retail_forecast::Result<(Vec<u8>, usize)> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(input);
    let headers = reader.headers()?.clone();

    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
            .ok_or_else(|| ForecastError::config(format!("Column '{}' not found", name)))
    };
    let store_idx = column(STORE_COLUMN)?;
    let product_idx = column(PRODUCT_COLUMN)?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&headers)?;

    let mut rows = 0;
    for row in reader.records() {
        let row = row?;
        let mut fields: Vec<String> = row.iter().map(str::to_string).collect();
        if let Some(store) = fields.get_mut(store_idx) {
            *store = normalize_store_id(store)?;
        }
        if let Some(product) = fields.get_mut(product_idx) {
            *product = normalize_product_id(product)?;
        }
        writer.write_record(&fields)?;
        rows += 1;
    }

    let data = writer
        .into_inner()
        .map_err(|e| ForecastError::IoError(e.into_error()))?;
    Ok((data, rows))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let storage = LocalStorage::new(".");
    let input = storage.read_file(&args.input).await?;
    let (output, rows) = normalize_table(&input)?;

    let target = args.output.as_deref().unwrap_or(&args.input);
    storage.write_file(target, &output).await?;

    tracing::info!("Normalized {} rows into {}", rows, target);
    println!("✅ Store and Product IDs are now formatted as S### / P#### ({} rows)", rows);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_table_rewrites_only_id_columns() {
        let input = b"Date,Store ID,Product ID,Units Sold\n01-01-2022,5,12,127\n02-01-2022,S001,p0003,40\n";
        let (output, rows) = normalize_table(input).unwrap();

        assert_eq!(rows, 2);
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Date,Store ID,Product ID,Units Sold\n01-01-2022,S005,P0012,127\n02-01-2022,S001,P0003,40\n"
        );
    }

    #[test]
    fn test_normalize_table_requires_id_columns() {
        let err = normalize_table(b"Date,Units Sold\n2022-01-01,3\n").unwrap_err();
        assert!(matches!(err, ForecastError::ConfigError { .. }));
    }
}
