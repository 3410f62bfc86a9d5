// src/dashboard/mod.rs
pub mod views;

pub use views::{category_trend, heatmap, total_trend, year_breakdown};
pub use views::{ComparisonPoint, Heatmap, Slice, TrendPoint};

use crate::config::DashboardConfig;
use crate::metrics::RateTable;
use crate::normalize::CrimeTables;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// What the user asked to look at. `None` means "use the default".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub year: Option<i64>,
    pub category: Option<String>,
}

impl Selection {
    /// Resolve against what the data offers: the latest year and the first
    /// category by default, and the default again for anything unavailable.
    /// Fields stay `None` only when there is nothing to choose from.
    pub fn resolve(&self, years_desc: &[i64], categories: &[String]) -> Selection {
        let year = match self.year {
            Some(y) if years_desc.contains(&y) => Some(y),
            Some(y) => {
                warn!(year = y, "selected year not in data, using latest");
                years_desc.first().copied()
            }
            None => years_desc.first().copied(),
        };
        let category = match &self.category {
            Some(c) if categories.contains(c) => Some(c.clone()),
            Some(c) => {
                warn!(category = %c, "selected category not in data, using first");
                categories.first().cloned()
            }
            None => categories.first().cloned(),
        };
        Selection { year, category }
    }
}

/// Everything the page shows, computed once per input file.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub title: String,
    /// Selectable years, latest first.
    pub years: Vec<i64>,
    /// Selectable categories, in column order.
    pub categories: Vec<String>,
    pub selection: Selection,
    /// Size of each per-year breakdown.
    pub top_n: usize,
    pub trend: Vec<TrendPoint>,
    /// Top-N breakdown for every selectable year.
    pub breakdowns: BTreeMap<i64, Vec<Slice>>,
    pub heatmap: Heatmap,
    /// Occurrence/arrest comparison for every category, in column order.
    pub comparisons: Vec<(String, Vec<ComparisonPoint>)>,
}

impl Dashboard {
    #[tracing::instrument(level = "info", skip_all)]
    pub fn build(
        tables: &CrimeTables,
        rate: &RateTable,
        selection: &Selection,
        config: &DashboardConfig,
    ) -> Dashboard {
        let occ = &tables.occurrences;
        let mut years = occ.available_years();
        years.reverse();
        let categories = occ.categories();
        let selection = selection.resolve(&years, &categories);

        let breakdowns = years
            .iter()
            .map(|&y| (y, year_breakdown(occ, y, config.top_n)))
            .collect();
        let comparisons = categories
            .iter()
            .map(|c| (c.clone(), category_trend(occ, &tables.arrests, c)))
            .collect();

        info!(
            years = years.len(),
            categories = categories.len(),
            year = ?selection.year,
            category = ?selection.category,
            "built dashboard"
        );

        Dashboard {
            title: config.title.clone(),
            years,
            categories,
            selection,
            top_n: config.top_n,
            trend: total_trend(occ),
            breakdowns,
            heatmap: heatmap(rate),
            comparisons,
        }
    }

    pub fn breakdown(&self, year: i64) -> &[Slice] {
        self.breakdowns.get(&year).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn comparison(&self, category: &str) -> &[ComparisonPoint] {
        self.comparisons
            .iter()
            .find(|(c, _)| c == category)
            .map(|(_, s)| s.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColumnConfig;
    use crate::ingest::read_csv_safely;
    use crate::metrics::arrest_rate;
    use crate::normalize::normalize;
    use anyhow::Result;

    const CSV: &str = "연도,구분,해킹,사이버사기,사이버도박\n\
        2021,발생건수,100,200,0\n\
        2021,검거건수,40,150,3\n\
        2022,발생건수,120,,10\n\
        2022,검거건수,60,90,5\n";

    fn build(selection: Selection) -> Result<Dashboard> {
        let raw = read_csv_safely(CSV.as_bytes())?;
        let tables = normalize(&raw, &ColumnConfig::default())?;
        let rate = arrest_rate(&tables.occurrences, &tables.arrests)?;
        Ok(Dashboard::build(
            &tables,
            &rate,
            &selection,
            &DashboardConfig::default(),
        ))
    }

    #[test]
    fn defaults_to_latest_year_and_first_category() -> Result<()> {
        let d = build(Selection::default())?;
        assert_eq!(d.years, vec![2022, 2021]);
        assert_eq!(d.selection.year, Some(2022));
        assert_eq!(d.selection.category.as_deref(), Some("해킹"));
        Ok(())
    }

    #[test]
    fn unavailable_selection_falls_back() -> Result<()> {
        let d = build(Selection {
            year: Some(1999),
            category: Some("없는유형".into()),
        })?;
        assert_eq!(d.selection.year, Some(2022));
        assert_eq!(d.selection.category.as_deref(), Some("해킹"));

        let d = build(Selection {
            year: Some(2021),
            category: Some("사이버도박".into()),
        })?;
        assert_eq!(d.selection.year, Some(2021));
        assert_eq!(d.selection.category.as_deref(), Some("사이버도박"));
        Ok(())
    }

    #[test]
    fn views_reflect_the_tables() -> Result<()> {
        let d = build(Selection::default())?;

        let totals: Vec<(i64, f64)> = d.trend.iter().map(|p| (p.year, p.total)).collect();
        assert_eq!(totals, vec![(2021, 300.0), (2022, 130.0)]);

        let names: Vec<&str> = d.breakdown(2022).iter().map(|s| s.category.as_str()).collect();
        assert_eq!(names, vec!["해킹", "사이버도박"]);

        let col = d.heatmap.categories.iter().position(|c| c == "사이버도박").unwrap();
        assert_eq!(d.heatmap.cells[0][col], None); // 3 arrests / 0 occurrences
        assert_eq!(d.heatmap.cells[1][col], Some(50.0));

        let fraud = d.comparison("사이버사기");
        assert_eq!(fraud[1].occurrences, None);
        assert_eq!(fraud[1].arrests, Some(90.0));
        assert!(d.comparison("nope").is_empty());
        Ok(())
    }

    #[test]
    fn empty_data_resolves_to_nothing() {
        let s = Selection {
            year: Some(2022),
            category: None,
        }
        .resolve(&[], &[]);
        assert_eq!(s, Selection::default());
    }
}
