//! Tabular export of aggregate lists.
//!
//! Display layers that work with data frames can call [`aggregate_frame`] to get
//! one row per aggregate entry. Columns from an absent partner are null.

use polars::prelude::*;

use crate::error::{Result, TwseError};
use crate::types::{AggregateRecord, DetailRecord};

/// Column names, in output order.
pub const COLUMNS: [&str; 15] = [
    "code",
    "name",
    "pe_ratio",
    "dividend_yield",
    "pb_ratio",
    "change",
    "monthly_average_price",
    "closing_price",
    "average_closing_price",
    "average_monthly_price",
    "trade_volume",
    "trade_value",
    "transaction_count",
    "detail_closing_price",
    "detail_change",
];

/// Flattens an aggregate list into a [`DataFrame`], preserving its order.
pub fn aggregate_frame(records: &[AggregateRecord]) -> Result<DataFrame> {
    let code: Vec<&str> = records.iter().map(|r| r.code().as_str()).collect();
    let name: Vec<&str> = records.iter().map(|r| r.valuation.name.as_str()).collect();
    let pe_ratio: Vec<f64> = records.iter().map(|r| r.valuation.pe_ratio.value()).collect();
    let dividend_yield: Vec<f64> = records
        .iter()
        .map(|r| r.valuation.dividend_yield.value())
        .collect();
    let pb_ratio: Vec<&str> = records.iter().map(|r| r.valuation.pb_ratio.as_str()).collect();
    let change: Vec<f64> = records.iter().map(|r| r.valuation.change.value()).collect();
    let monthly_average_price: Vec<f64> = records
        .iter()
        .map(|r| r.valuation.monthly_average_price.value())
        .collect();
    let closing_price: Vec<f64> = records
        .iter()
        .map(|r| r.valuation.closing_price.value())
        .collect();

    let average_closing_price: Vec<Option<f64>> = records
        .iter()
        .map(|r| r.average.as_ref().map(|a| a.closing_price.value()))
        .collect();
    let average_monthly_price: Vec<Option<f64>> = records
        .iter()
        .map(|r| r.average.as_ref().map(|a| a.monthly_average_price.value()))
        .collect();

    let trade_volume = detail_text(records, |d| d.trade_volume.as_str());
    let trade_value = detail_text(records, |d| d.trade_value.as_str());
    let transaction_count = detail_text(records, |d| d.transaction_count.as_str());
    let detail_closing_price = detail_text(records, |d| d.closing_price.as_str());
    let detail_change: Vec<Option<f64>> = records
        .iter()
        .map(|r| r.detail.as_ref().map(|d| d.change.value()))
        .collect();

    DataFrame::new(vec![
        Column::new(COLUMNS[0].into(), code),
        Column::new(COLUMNS[1].into(), name),
        Column::new(COLUMNS[2].into(), pe_ratio),
        Column::new(COLUMNS[3].into(), dividend_yield),
        Column::new(COLUMNS[4].into(), pb_ratio),
        Column::new(COLUMNS[5].into(), change),
        Column::new(COLUMNS[6].into(), monthly_average_price),
        Column::new(COLUMNS[7].into(), closing_price),
        Column::new(COLUMNS[8].into(), average_closing_price),
        Column::new(COLUMNS[9].into(), average_monthly_price),
        Column::new(COLUMNS[10].into(), trade_volume),
        Column::new(COLUMNS[11].into(), trade_value),
        Column::new(COLUMNS[12].into(), transaction_count),
        Column::new(COLUMNS[13].into(), detail_closing_price),
        Column::new(COLUMNS[14].into(), detail_change),
    ])
    .map_err(|e| TwseError::Frame(e.to_string()))
}

fn detail_text<'a>(
    records: &'a [AggregateRecord],
    field: fn(&DetailRecord) -> &str,
) -> Vec<Option<&'a str>> {
    records
        .iter()
        .map(|r| r.detail.as_ref().map(field))
        .collect()
}
