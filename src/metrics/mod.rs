// src/metrics/mod.rs
use crate::normalize::YearTable;
use anyhow::{Context, Result};
use arrow::{
    array::{new_null_array, Array, ArrayRef, AsArray, Float64Array, Int64Array, UInt32Array},
    compute::{kernels::arity::binary, take},
    datatypes::{DataType, Float64Type},
};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Arrest rate in percent, same shape as the inputs but with a complete
/// (non-null) year index.
pub type RateTable = YearTable;

/// `arrests / occurrences * 100`, aligned on year and category label.
///
/// Years are the sorted union of both tables' years; categories are the
/// occurrence columns followed by any arrest-only columns. A cell is null
/// when either side is missing or the quotient is not finite.
#[tracing::instrument(level = "info", skip_all)]
pub fn arrest_rate(occurrences: &YearTable, arrests: &YearTable) -> Result<RateTable> {
    let years: Vec<i64> = occurrences
        .available_years()
        .into_iter()
        .chain(arrests.available_years())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut categories = occurrences.categories();
    for c in arrests.categories() {
        if !categories.contains(&c) {
            debug!(category = %c, "category only present in arrest table");
            categories.push(c);
        }
    }

    let occ_rows = row_indices(occurrences, &years);
    let arr_rows = row_indices(arrests, &years);

    let mut columns = Vec::with_capacity(categories.len());
    for category in categories {
        let occ = aligned(occurrences, &category, &occ_rows)?;
        let arr = aligned(arrests, &category, &arr_rows)?;

        let pct: Float64Array = binary(
            arr.as_primitive::<Float64Type>(),
            occ.as_primitive::<Float64Type>(),
            |a, o| a / o * 100.0,
        )
        .with_context(|| format!("computing arrest rate for '{}'", category))?;
        // x/0 is ±inf and 0/0 is NaN; both are undefined rates
        let pct = pct.unary_opt::<_, Float64Type>(|v| v.is_finite().then_some(v));

        columns.push((category, pct));
    }

    let rate = YearTable::from_columns(Int64Array::from(years), columns)?;
    info!(
        years = rate.num_rows(),
        categories = rate.batch().num_columns(),
        "computed arrest rate"
    );
    Ok(rate)
}

/// For each target year, the row holding it in `table` (null when absent).
fn row_indices(table: &YearTable, years: &[i64]) -> UInt32Array {
    years
        .iter()
        .map(|&y| table.row_of(y).map(|r| r as u32))
        .collect()
}

/// Reorder one category column onto the target years; a column the table
/// does not have comes back all-null.
fn aligned(table: &YearTable, category: &str, rows: &UInt32Array) -> Result<ArrayRef> {
    match table.column(category) {
        Some(col) => take(col, rows, None)
            .with_context(|| format!("aligning column '{}' by year", category)),
        None => Ok(new_null_array(&DataType::Float64, rows.len())),
    }
}
