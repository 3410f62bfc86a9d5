use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use cyberstats::{build_dashboard, render::render_html, DashboardConfig, ReadError, Selection};
use std::{fs, path::PathBuf, process::ExitCode};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

/// Render a yearly cybercrime statistics dashboard from a CSV file.
#[derive(Parser, Debug)]
#[command(name = "cyberstats", version)]
struct Cli {
    /// CSV with 연도/구분 columns and one column per crime category
    input: PathBuf,

    /// Where to write the HTML page
    #[arg(long, short, default_value = "dashboard.html")]
    out: PathBuf,

    /// Year shown first in the category breakdown (default: latest)
    #[arg(long)]
    year: Option<i64>,

    /// Category shown first in the trend comparison (default: first column)
    #[arg(long)]
    category: Option<String>,

    /// YAML file overriding column names, row labels, top-N and title
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of categories in the per-year breakdown
    #[arg(long)]
    top: Option<usize>,
}

fn main() -> Result<ExitCode> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    run(Cli::parse())
}

fn run(cli: Cli) -> Result<ExitCode> {
    // ─── 2) config ───────────────────────────────────────────────────
    let mut config = match &cli.config {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::default(),
    };
    if let Some(n) = cli.top {
        config.top_n = n;
    }
    let selection = Selection {
        year: cli.year,
        category: cli.category.clone(),
    };

    // ─── 3) read + build ─────────────────────────────────────────────
    let raw = fs::read(&cli.input)
        .with_context(|| format!("reading {}", cli.input.display()))?;
    info!(path = %cli.input.display(), bytes = raw.len(), "loaded input");

    let dashboard = match build_dashboard(&raw, &config, &selection) {
        Ok(d) => d,
        Err(e) if e.downcast_ref::<ReadError>().is_some() => {
            error!("{:#}", e);
            eprintln!("파일을 읽는 중 오류가 발생했습니다: {}", e);
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(e),
    };

    // ─── 4) render ───────────────────────────────────────────────────
    let html = render_html(&dashboard, Local::now().naive_local())?;
    fs::write(&cli.out, html).with_context(|| format!("writing {}", cli.out.display()))?;
    info!(
        out = %cli.out.display(),
        years = dashboard.years.len(),
        categories = dashboard.categories.len(),
        "dashboard written"
    );
    Ok(ExitCode::SUCCESS)
}
