// src/config.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Column names and row-type markers expected in the uploaded CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    /// Year column, used as the row key of both tables.
    pub year: String,
    /// Row-type label column that discriminates occurrences from arrests.
    pub label: String,
    pub occurrence_marker: String,
    pub arrest_marker: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            year: "연도".into(),
            label: "구분".into(),
            occurrence_marker: "발생건수".into(),
            arrest_marker: "검거건수".into(),
        }
    }
}

/// Everything the dashboard can be tuned with. Every field has a default, so
/// an empty YAML document is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub columns: ColumnConfig,
    /// Number of categories shown in the per-year breakdown.
    pub top_n: usize,
    pub title: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            columns: ColumnConfig::default(),
            top_n: 10,
            title: "경찰청 연도별 사이버 범죄 통계 대시보드".into(),
        }
    }
}

impl DashboardConfig {
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        if s.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(s).context("parsing dashboard config YAML")
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_yaml_str(&text)
            .with_context(|| format!("invalid config in {}", path.display()))
    }
}
