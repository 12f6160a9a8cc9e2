//! Joining the three datasets into aggregate records.

use std::collections::HashMap;

use crate::types::{AggregateRecord, AverageRecord, DetailRecord, ValuationRecord};

/// Joins the three datasets by security code.
///
/// The valuation list drives the join: the output has exactly one entry per
/// valuation record, in valuation order. For each entry the first average and
/// first detail record with an identical code are attached; when there is none
/// the partner is `None`. The result depends only on the inputs, so repeated
/// calls on the same lists produce equal outputs.
#[must_use]
pub fn aggregate(
    valuations: &[ValuationRecord],
    averages: &[AverageRecord],
    details: &[DetailRecord],
) -> Vec<AggregateRecord> {
    let averages = first_by_code(averages, |r| r.code.as_str());
    let details = first_by_code(details, |r| r.code.as_str());

    valuations
        .iter()
        .map(|valuation| {
            let code = valuation.code.as_str();
            AggregateRecord {
                valuation: valuation.clone(),
                average: averages.get(code).map(|r| (*r).clone()),
                detail: details.get(code).map(|r| (*r).clone()),
            }
        })
        .collect()
}

/// Indexes records by code, keeping the first record seen for each code.
fn first_by_code<'a, T>(records: &'a [T], code: impl Fn(&T) -> &str) -> HashMap<&'a str, &'a T> {
    let mut index = HashMap::with_capacity(records.len());
    for record in records {
        index.entry(code(record)).or_insert(record);
    }
    index
}
