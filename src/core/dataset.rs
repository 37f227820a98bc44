//! Historical sales table.
//!
//! Loaded once at startup and never mutated afterwards; request handlers
//! share it through an `Arc` and only ever borrow subseries out of it.

use crate::core::ids;
use crate::domain::model::{HistoricalRecord, Subseries};
use crate::domain::ports::Storage;
use crate::utils::error::{ForecastError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use std::io::Read;

pub const DATE_COLUMN: &str = "Date";
pub const STORE_COLUMN: &str = "Store ID";
pub const PRODUCT_COLUMN: &str = "Product ID";

/// Substrings that mark a column as the unit sales quantity.
pub const SALES_KEYWORDS: [&str; 4] = ["sale", "quantity", "unit sold", "units sold"];

// Day-first wins when a date is ambiguous.
const DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d",
    "%d-%m-%Y",
    "%m-%d-%Y",
    "%d/%m/%Y",
    "%Y/%m/%d",
    "%m/%d/%Y",
];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Fold store/product ids into `S###` / `P####` while loading.
    pub normalize_ids: bool,
}

#[derive(Debug, Clone)]
pub struct SalesDataset {
    sales_column: String,
    records: Vec<HistoricalRecord>,
    dropped_rows: usize,
}

/// Index of the first header that looks like a sales quantity column.
pub fn detect_sales_column<S: AsRef<str>>(headers: &[S]) -> Option<usize> {
    headers.iter().position(|header| {
        let lower = header.as_ref().to_lowercase();
        SALES_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
    })
}

/// Accepts ISO dates, day-month-year dates, and ISO timestamps (time dropped).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}

fn find_column(headers: &[String], name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(name))
        .ok_or_else(|| {
            ForecastError::config(format!(
                "Required column '{}' is missing. Columns: {:?}",
                name, headers
            ))
        })
}

impl SalesDataset {
    pub async fn load<S: Storage>(storage: &S, path: &str, options: LoadOptions) -> Result<Self> {
        tracing::info!("Loading sales dataset from {}", path);
        let bytes = storage.read_file(path).await?;
        Self::from_reader(bytes.as_slice(), options)
    }

    pub fn from_reader<R: Read>(reader: R, options: LoadOptions) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();

        let sales_idx = detect_sales_column(&headers).ok_or_else(|| {
            ForecastError::config(format!(
                "No usable sales column found. Columns: {:?}",
                headers
            ))
        })?;
        let date_idx = find_column(&headers, DATE_COLUMN)?;
        let store_idx = find_column(&headers, STORE_COLUMN)?;
        let product_idx = find_column(&headers, PRODUCT_COLUMN)?;

        tracing::debug!(
            "Using '{}' as the sales column (index {})",
            headers[sales_idx],
            sales_idx
        );

        let mut records = Vec::new();
        let mut bad_dates = 0usize;
        let mut bad_sales = 0usize;
        let mut bad_ids = 0usize;

        for row in csv_reader.records() {
            let row = row?;
            let field = |idx: usize| row.get(idx).unwrap_or("");

            let Some(date) = parse_date(field(date_idx)) else {
                bad_dates += 1;
                continue;
            };

            let sales = match field(sales_idx).parse::<f64>() {
                Ok(v) if v.is_finite() && v >= 0.0 => v,
                _ => {
                    bad_sales += 1;
                    continue;
                }
            };

            let (store_id, product_id) = if options.normalize_ids {
                match (
                    ids::normalize_store_id(field(store_idx)),
                    ids::normalize_product_id(field(product_idx)),
                ) {
                    (Ok(s), Ok(p)) => (s, p),
                    _ => {
                        bad_ids += 1;
                        continue;
                    }
                }
            } else {
                (field(store_idx).to_string(), field(product_idx).to_string())
            };

            records.push(HistoricalRecord {
                date,
                store_id,
                product_id,
                sales,
            });
        }

        // 穩定排序，同日資料保持原始順序
        records.sort_by_key(|r| r.date);

        let dropped_rows = bad_dates + bad_sales + bad_ids;
        if dropped_rows > 0 {
            tracing::warn!(
                "Dropped {} rows ({} unparseable dates, {} invalid sales, {} invalid ids)",
                dropped_rows,
                bad_dates,
                bad_sales,
                bad_ids
            );
        }
        tracing::info!("Loaded {} sales records", records.len());

        Ok(Self {
            sales_column: headers[sales_idx].clone(),
            records,
            dropped_rows,
        })
    }

    pub fn sales_column(&self) -> &str {
        &self.sales_column
    }

    pub fn records(&self) -> &[HistoricalRecord] {
        &self.records
    }

    pub fn dropped_rows(&self) -> usize {
        self.dropped_rows
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records for one store/product pair, in date order.
    pub fn subseries(&self, store_id: &str, product_id: &str) -> Result<Subseries> {
        let records: Vec<HistoricalRecord> = self
            .records
            .iter()
            .filter(|r| r.store_id == store_id && r.product_id == product_id)
            .cloned()
            .collect();
        Subseries::new(store_id, product_id, records)
    }
}
