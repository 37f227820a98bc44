//! Store and product identifier formatting.
//!
//! Datasets arrive with a mix of bare numbers (`5`, `17`) and tagged ids
//! (`S005`, `p0017`). Everything downstream compares ids as strings, so both
//! forms are folded into `S###` / `P####`.

use crate::utils::error::{ForecastError, Result};

const STORE_PREFIX: char = 'S';
const PRODUCT_PREFIX: char = 'P';
const STORE_WIDTH: usize = 3;
const PRODUCT_WIDTH: usize = 4;

pub fn product_id_from_number(number: u32) -> String {
    format!("{}{:0width$}", PRODUCT_PREFIX, number, width = PRODUCT_WIDTH)
}

pub fn normalize_store_id(raw: &str) -> Result<String> {
    normalize(raw, STORE_PREFIX, STORE_WIDTH, "Store ID")
}

pub fn normalize_product_id(raw: &str) -> Result<String> {
    normalize(raw, PRODUCT_PREFIX, PRODUCT_WIDTH, "Product ID")
}

fn normalize(raw: &str, prefix: char, width: usize, field: &str) -> Result<String> {
    let trimmed = raw.trim();

    // 已經是標準格式，只統一大小寫
    if trimmed
        .chars()
        .next()
        .is_some_and(|c| c.eq_ignore_ascii_case(&prefix))
    {
        return Ok(trimmed.to_uppercase());
    }

    let number: u64 = trimmed.parse().map_err(|_| {
        ForecastError::validation(format!(
            "{} '{}' is neither tagged with '{}' nor a number",
            field, trimmed, prefix
        ))
    })?;
    Ok(format!("{}{:0width$}", prefix, number, width = width))
}
