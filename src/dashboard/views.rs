// src/dashboard/views.rs
use crate::normalize::YearTable;
use arrow::array::Array;
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq)]
pub struct TrendPoint {
    pub year: i64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub category: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonPoint {
    pub year: i64,
    pub occurrences: Option<f64>,
    pub arrests: Option<f64>,
}

/// Year × category grid; `cells[row][col]` follows `years` and `categories`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Heatmap {
    pub years: Vec<i64>,
    pub categories: Vec<String>,
    pub cells: Vec<Vec<Option<f64>>>,
}

impl Heatmap {
    /// Smallest and largest present value, if any cell has one.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.cells
            .iter()
            .flatten()
            .flatten()
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// Row-wise sum across every category, one point per year, ascending.
/// Missing cells add nothing; rows without a year are left out.
pub fn total_trend(occurrences: &YearTable) -> Vec<TrendPoint> {
    let categories = occurrences.categories();
    let columns: Vec<_> = categories
        .iter()
        .filter_map(|c| occurrences.column(c))
        .collect();

    let mut points: Vec<TrendPoint> = (0..occurrences.num_rows())
        .filter_map(|row| {
            let year = occurrences.year_at(row)?;
            let total = columns
                .iter()
                .filter(|col| col.is_valid(row))
                .map(|col| col.value(row))
                .sum();
            Some(TrendPoint { year, total })
        })
        .collect();
    points.sort_by_key(|p| p.year);
    points
}

/// The `top_n` largest categories for `year`, descending. Missing values are
/// skipped; an unknown year gives an empty breakdown.
pub fn year_breakdown(occurrences: &YearTable, year: i64, top_n: usize) -> Vec<Slice> {
    let mut slices: Vec<Slice> = occurrences
        .categories()
        .into_iter()
        .filter_map(|category| {
            let value = occurrences.value(year, &category)?;
            Some(Slice { category, value })
        })
        .collect();
    // stable sort keeps column order among ties
    slices.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal));
    slices.truncate(top_n);
    slices
}

pub fn heatmap(rate: &YearTable) -> Heatmap {
    let years = rate.available_years();
    let categories = rate.categories();
    let cells = years
        .iter()
        .map(|&y| categories.iter().map(|c| rate.value(y, c)).collect())
        .collect();
    Heatmap {
        years,
        categories,
        cells,
    }
}

/// Occurrence and arrest series of one category, matched by year over the
/// occurrence table's years.
pub fn category_trend(
    occurrences: &YearTable,
    arrests: &YearTable,
    category: &str,
) -> Vec<ComparisonPoint> {
    occurrences
        .available_years()
        .into_iter()
        .map(|year| ComparisonPoint {
            year,
            occurrences: occurrences.value(year, category),
            arrests: arrests.value(year, category),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use arrow::array::{Float64Array, Int64Array};

    fn table(years: Vec<Option<i64>>, cols: Vec<(&str, Vec<Option<f64>>)>) -> Result<YearTable> {
        YearTable::from_columns(
            Int64Array::from(years),
            cols.into_iter()
                .map(|(n, v)| (n.to_string(), Float64Array::from(v)))
                .collect(),
        )
    }

    #[test]
    fn total_trend_sums_exactly_the_category_columns() -> Result<()> {
        let occ = table(
            vec![Some(2021), Some(2020), None],
            vec![
                ("A", vec![Some(1.0), Some(10.0), Some(100.0)]),
                ("B", vec![Some(2.0), None, Some(100.0)]),
                ("C", vec![Some(3.0), Some(30.0), Some(100.0)]),
            ],
        )?;
        let trend = total_trend(&occ);
        assert_eq!(
            trend,
            vec![
                TrendPoint { year: 2020, total: 40.0 },
                TrendPoint { year: 2021, total: 6.0 },
            ]
        );
        Ok(())
    }

    #[test]
    fn all_missing_row_sums_to_zero() -> Result<()> {
        let occ = table(vec![Some(2020)], vec![("A", vec![None])])?;
        assert_eq!(total_trend(&occ)[0].total, 0.0);
        Ok(())
    }

    #[test]
    fn breakdown_is_sorted_and_truncated() -> Result<()> {
        let cols: Vec<(String, Vec<Option<f64>>)> = (0..12)
            .map(|i| (format!("c{i}"), vec![Some(i as f64)]))
            .collect();
        let occ = table(
            vec![Some(2022)],
            cols.iter().map(|(n, v)| (n.as_str(), v.clone())).collect(),
        )?;
        let top = year_breakdown(&occ, 2022, 10);
        assert_eq!(top.len(), 10);
        assert_eq!(top[0].category, "c11");
        assert_eq!(top[9].category, "c2");
        assert!(year_breakdown(&occ, 1999, 10).is_empty());
        Ok(())
    }

    #[test]
    fn breakdown_skips_missing_values() -> Result<()> {
        let occ = table(
            vec![Some(2022)],
            vec![("A", vec![None]), ("B", vec![Some(5.0)]), ("C", vec![Some(7.0)])],
        )?;
        let top = year_breakdown(&occ, 2022, 10);
        let names: Vec<&str> = top.iter().map(|s| s.category.as_str()).collect();
        assert_eq!(names, vec!["C", "B"]);
        Ok(())
    }

    #[test]
    fn heatmap_keeps_missing_cells() -> Result<()> {
        let rate = table(
            vec![Some(2021), Some(2022)],
            vec![("A", vec![Some(50.0), None]), ("B", vec![Some(80.0), Some(20.0)])],
        )?;
        let h = heatmap(&rate);
        assert_eq!(h.years, vec![2021, 2022]);
        assert_eq!(h.cells[1], vec![None, Some(20.0)]);
        assert_eq!(h.value_range(), Some((20.0, 80.0)));
        assert_eq!(Heatmap::default().value_range(), None);
        Ok(())
    }

    #[test]
    fn category_trend_matches_by_year() -> Result<()> {
        let occ = table(
            vec![Some(2020), Some(2021)],
            vec![("A", vec![Some(10.0), Some(20.0)])],
        )?;
        let arr = table(vec![Some(2021)], vec![("A", vec![Some(8.0)])])?;
        let series = category_trend(&occ, &arr, "A");
        assert_eq!(
            series,
            vec![
                ComparisonPoint { year: 2020, occurrences: Some(10.0), arrests: None },
                ComparisonPoint { year: 2021, occurrences: Some(20.0), arrests: Some(8.0) },
            ]
        );
        Ok(())
    }
}
