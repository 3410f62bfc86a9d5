// src/normalize/mod.rs
pub mod convert;
pub mod year_table;

pub use year_table::YearTable;

use crate::config::ColumnConfig;
use crate::ingest::RawTable;
use anyhow::Result;
use convert::{clean_str, coerce_year, numeric_column, year_column};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("required column '{name}' not found (columns: {found:?})")]
    MissingColumn { name: String, found: Vec<String> },
}

/// The two row groups of the input, each keyed by year.
#[derive(Debug, Clone)]
pub struct CrimeTables {
    pub occurrences: YearTable,
    pub arrests: YearTable,
}

/// Trim every header and disambiguate repeats as `name.1`, `name.2`, ...
pub fn normalize_headers(headers: &[String]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(headers.len());
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::with_capacity(headers.len());

    for h in headers {
        let base = h.trim().to_string();
        let mut name = base.clone();
        while seen.contains(&name) {
            let n = counts.entry(base.clone()).or_insert(0);
            *n += 1;
            name = format!("{}.{}", base, n);
        }
        seen.insert(name.clone());
        out.push(name);
    }
    out
}

/// Split the raw table into occurrence and arrest tables.
///
/// The year and label columns are consumed; every other column becomes a
/// numeric category column. Labels that match neither marker are ignored, so
/// a file without the expected labels yields two empty tables.
#[tracing::instrument(level = "info", skip_all, fields(rows = raw.num_rows()))]
pub fn normalize(raw: &RawTable, columns: &ColumnConfig) -> Result<CrimeTables> {
    let headers = normalize_headers(&raw.headers);
    let find = |name: &str| -> Result<usize, NormalizeError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| NormalizeError::MissingColumn {
                name: name.to_string(),
                found: headers.clone(),
            })
    };
    let year_idx = find(&columns.year)?;
    let label_idx = find(&columns.label)?;

    let categories: Vec<(usize, &str)> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != year_idx && *i != label_idx)
        .map(|(i, h)| (i, h.as_str()))
        .collect();
    debug!(categories = categories.len(), "category columns");

    let occurrences = build_group(
        raw,
        year_idx,
        label_idx,
        &categories,
        &columns.occurrence_marker,
    )?;
    let arrests = build_group(raw, year_idx, label_idx, &categories, &columns.arrest_marker)?;

    if occurrences.is_empty() && arrests.is_empty() {
        warn!(
            occurrence = %columns.occurrence_marker,
            arrest = %columns.arrest_marker,
            "no rows carry either row-type label"
        );
    }
    info!(
        occurrence_rows = occurrences.num_rows(),
        arrest_rows = arrests.num_rows(),
        "normalized tables"
    );

    Ok(CrimeTables {
        occurrences,
        arrests,
    })
}

fn build_group(
    raw: &RawTable,
    year_idx: usize,
    label_idx: usize,
    categories: &[(usize, &str)],
    marker: &str,
) -> Result<YearTable> {
    // (year, row) in file order; a repeated year replaces the earlier row in place.
    let mut keyed: Vec<(Option<i64>, &[String])> = Vec::new();
    let mut position: HashMap<i64, usize> = HashMap::new();

    for row in &raw.rows {
        if clean_str(cell(row, label_idx)) != marker {
            continue;
        }
        let year = coerce_year(cell(row, year_idx));
        match year.and_then(|y| position.get(&y).copied().map(|p| (y, p))) {
            Some((y, p)) => {
                warn!(year = y, label = marker, "duplicate year, later row wins");
                keyed[p].1 = row.as_slice();
            }
            None => {
                if let Some(y) = year {
                    position.insert(y, keyed.len());
                } else {
                    debug!(raw = %cell(row, year_idx), label = marker, "year not numeric, kept as missing");
                }
                keyed.push((year, row.as_slice()));
            }
        }
    }

    let years = year_column(keyed.iter().map(|(y, _)| *y));
    let columns = categories
        .iter()
        .map(|&(idx, name)| {
            let values = numeric_column(keyed.iter().map(|(_, row)| cell(row, idx)));
            (name.to_string(), values)
        })
        .collect();

    YearTable::from_columns(years, columns)
}

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{read_csv_safely, TextEncoding};
    use arrow::array::Array;

    fn raw(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
            encoding: TextEncoding::Utf8Sig,
            delimiter: b',',
        }
    }

    #[test]
    fn headers_are_trimmed_before_lookup() -> Result<()> {
        let t = raw(
            &[" 연도 ", "구분 ", " 해킹"],
            &[&["2022", "발생건수", "10"], &["2022", "검거건수", "4"]],
        );
        let tables = normalize(&t, &ColumnConfig::default())?;
        assert_eq!(tables.occurrences.categories(), vec!["해킹"]);
        assert_eq!(tables.occurrences.value(2022, "해킹"), Some(10.0));
        assert_eq!(tables.arrests.value(2022, "해킹"), Some(4.0));
        Ok(())
    }

    #[test]
    fn duplicate_headers_are_disambiguated() {
        let names = normalize_headers(&["A".into(), " A".into(), "A ".into(), "B".into()]);
        assert_eq!(names, vec!["A", "A.1", "A.2", "B"]);
    }

    #[test]
    fn splits_rows_by_label_and_coerces_cells() -> Result<()> {
        let t = raw(
            &["연도", "구분", "A", "B"],
            &[
                &["2021", "발생건수", "100", "-"],
                &["2021", "검거건수", "40", "3"],
                &["2022", "발생건수", "120", "8"],
                &["2022", "기타", "1", "1"],
            ],
        );
        let tables = normalize(&t, &ColumnConfig::default())?;
        assert_eq!(tables.occurrences.num_rows(), 2);
        assert_eq!(tables.arrests.num_rows(), 1);
        assert_eq!(tables.occurrences.value(2021, "B"), None);
        assert_eq!(tables.occurrences.value(2022, "B"), Some(8.0));
        assert_eq!(tables.arrests.available_years(), vec![2021]);
        Ok(())
    }

    #[test]
    fn padded_labels_still_select_their_table() -> Result<()> {
        let t = raw(
            &["연도", "구분", "A"],
            &[
                &["2022", " 발생건수 ", "10"],
                &["2022", "검거건수\t", "4"],
                &[" 2023", "\"발생건수\"", "12"],
            ],
        );
        let tables = normalize(&t, &ColumnConfig::default())?;
        assert_eq!(tables.occurrences.available_years(), vec![2022, 2023]);
        assert_eq!(tables.occurrences.value(2022, "A"), Some(10.0));
        assert_eq!(tables.occurrences.value(2023, "A"), Some(12.0));
        assert_eq!(tables.arrests.value(2022, "A"), Some(4.0));
        Ok(())
    }

    #[test]
    fn non_numeric_year_is_kept_as_missing() -> Result<()> {
        let t = raw(
            &["연도", "구분", "A"],
            &[
                &["N/A", "발생건수", "5"],
                &["2022", "발생건수", "7"],
                &["N/A", "발생건수", "9"],
            ],
        );
        let tables = normalize(&t, &ColumnConfig::default())?;
        let occ = &tables.occurrences;
        assert_eq!(occ.num_rows(), 3);
        assert_eq!(occ.years().null_count(), 2);
        assert_eq!(occ.available_years(), vec![2022]);
        assert_eq!(occ.value(2022, "A"), Some(7.0));
        Ok(())
    }

    #[test]
    fn duplicate_year_last_row_wins() -> Result<()> {
        let t = raw(
            &["연도", "구분", "A"],
            &[
                &["2022", "발생건수", "1"],
                &["2023", "발생건수", "2"],
                &["2022", "발생건수", "3"],
            ],
        );
        let occ = normalize(&t, &ColumnConfig::default())?.occurrences;
        assert_eq!(occ.num_rows(), 2);
        assert_eq!(occ.year_at(0), Some(2022));
        assert_eq!(occ.value(2022, "A"), Some(3.0));
        assert_eq!(occ.value(2023, "A"), Some(2.0));
        Ok(())
    }

    #[test]
    fn absent_labels_give_empty_tables() -> Result<()> {
        let t = raw(&["연도", "구분", "A"], &[&["2022", "occurred", "1"]]);
        let tables = normalize(&t, &ColumnConfig::default())?;
        assert!(tables.occurrences.is_empty());
        assert!(tables.arrests.is_empty());
        assert_eq!(tables.occurrences.categories(), vec!["A"]);
        Ok(())
    }

    #[test]
    fn missing_label_column_is_reported() {
        let t = raw(&["연도", "A"], &[&["2022", "1"]]);
        let err = normalize(&t, &ColumnConfig::default()).unwrap_err();
        match err.downcast_ref::<NormalizeError>() {
            Some(NormalizeError::MissingColumn { name, .. }) => assert_eq!(name, "구분"),
            None => panic!("unexpected error: {err:#}"),
        }
    }

    #[test]
    fn custom_markers_from_config() -> Result<()> {
        let columns = ColumnConfig {
            year: "year".into(),
            label: "kind".into(),
            occurrence_marker: "occurred".into(),
            arrest_marker: "arrested".into(),
        };
        let t = raw(
            &["year", "kind", "fraud"],
            &[&["2020", "occurred", "10"], &["2020", "arrested", "5"]],
        );
        let tables = normalize(&t, &columns)?;
        assert_eq!(tables.arrests.value(2020, "fraud"), Some(5.0));
        Ok(())
    }

    #[test]
    fn end_to_end_from_bytes() -> Result<()> {
        let text = " 연도 , 구분 ,해킹,비고\n2022,발생건수,100,메모\n2022,검거건수,50,\n";
        let raw = read_csv_safely(text.as_bytes())?;
        let tables = normalize(&raw, &ColumnConfig::default())?;
        assert_eq!(tables.occurrences.categories(), vec!["해킹", "비고"]);
        assert_eq!(tables.occurrences.value(2022, "비고"), None);
        assert_eq!(tables.arrests.value(2022, "해킹"), Some(50.0));
        Ok(())
    }
}
