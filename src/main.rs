mod chart;
mod color;
mod config;
mod data;
mod page;
mod payload;
mod trend;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;

use config::{BIO_REFERENCES, DEFAULT_DATA_PATH, DEFAULT_OUTPUT_DIR};

/// `neurotrends [CSV_PATH] [OUTPUT_DIR]` – one full rebuild per invocation.
fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let csv_path = PathBuf::from(args.next().unwrap_or_else(|| DEFAULT_DATA_PATH.to_string()));
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string()));

    let index = build(&csv_path, &out_dir)?;
    println!("Wrote {}", index.display());
    Ok(())
}

/// The whole pipeline: load rows, fit trends, assemble the payload, render
/// and write the page. Row-level problems are logged and skipped inside the
/// loader; anything that reaches here as Err aborts the build with no
/// partial output.
fn build(csv_path: &Path, out_dir: &Path) -> Result<PathBuf> {
    let dataset = data::loader::load_csv(csv_path)?;
    info!(
        "{} records, {} methods",
        dataset.len(),
        dataset.methods.len()
    );

    let payload = payload::assemble(&dataset, BIO_REFERENCES)?;
    let summary = payload::summarize(&dataset).context("empty dataset")?;

    let csv_name = csv_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(DEFAULT_DATA_PATH);
    let html = page::render_page(&payload, &summary, csv_name)?;

    page::write_site(&html, csv_path, out_dir)
}
