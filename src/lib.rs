pub mod config;
pub mod dashboard;
pub mod ingest;
pub mod metrics;
pub mod normalize;
pub mod render;

pub use config::{ColumnConfig, DashboardConfig};
pub use dashboard::{Dashboard, Selection};
pub use ingest::{read_csv_safely, ReadError};
pub use metrics::arrest_rate;
pub use normalize::{normalize, CrimeTables, NormalizeError};

use anyhow::Result;

/// Bytes in, dashboard out: read, normalize, derive the arrest rate and build
/// every view. Nothing is cached between calls.
#[tracing::instrument(level = "info", skip_all, fields(bytes = raw.len()))]
pub fn build_dashboard(
    raw: &[u8],
    config: &DashboardConfig,
    selection: &Selection,
) -> Result<Dashboard> {
    let table = read_csv_safely(raw)?;
    let tables = normalize(&table, &config.columns)?;
    let rate = arrest_rate(&tables.occurrences, &tables.arrests)?;
    Ok(Dashboard::build(&tables, &rate, selection, config))
}
