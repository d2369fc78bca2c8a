mod config;
mod error;
mod normalizer;
mod output;
mod parsers;
mod stats;

use anyhow::{Context, Result};
use clap::Parser;
use memmap2::Mmap;
use std::fs::File;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::ColumnMap;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Delimiter preset: csv, tsv or ssv
    #[arg(short, long, default_value = "csv")]
    format: String,

    #[arg(short, long, default_value = "stdout")]
    output: String,

    #[arg(value_name = "FILE")]
    file: String,

    /// The first column holds data, not row labels
    #[arg(long)]
    no_index: bool,

    /// Columns to convert to seconds (default: every canonical time column present)
    #[arg(long, value_delimiter = ',')]
    time_columns: Option<Vec<String>>,

    /// Print descriptive statistics to stderr
    #[arg(long)]
    summary: bool,

    /// Write descriptive statistics as JSON to this path
    #[arg(long, value_name = "PATH")]
    report: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let start_time = Instant::now();

    let file = File::open(&args.file).with_context(|| format!("opening {}", args.file))?;
    let file_size = file.metadata()?.len();

    // mmap the file; zero-length maps are rejected on some platforms
    let mmap = if file_size > 0 {
        Some(unsafe { Mmap::map(&file)? })
    } else {
        None
    };
    let bytes: &[u8] = mmap.as_deref().unwrap_or(&[]);

    let raw = parsers::parse(&args.format, bytes, !args.no_index)?;
    info!(
        rows = raw.rows.len(),
        columns = raw.headers.len(),
        "loaded {}",
        args.file
    );

    let renamed = normalizer::rename_columns(&raw, &ColumnMap::default());
    let time_columns = match args.time_columns {
        Some(cols) => cols,
        None => normalizer::default_time_columns(&renamed.headers),
    };
    let table = normalizer::normalize(&renamed, &time_columns)?;
    let (rows, columns) = table.shape();
    info!(
        rows,
        columns,
        time_columns = time_columns.len(),
        filled = raw.missing_count(),
        "normalized, no missing values remain"
    );

    let mut writer = output::create_writer(&args.output)?;
    writer.write_table(&table)?;
    writer.finish()?;

    if args.summary || args.report.is_some() {
        let records = normalizer::into_records(&table)
            .context("statistics need every canonical time column converted")?;
        let report = stats::report(&records, columns);
        if args.summary {
            output::write_summary(&mut std::io::stderr().lock(), &report)?;
        }
        if let Some(path) = &args.report {
            output::write_report_json(path, &report)?;
            info!(path = %path, "wrote report");
        }
    }

    info!(
        bytes = file_size,
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "done"
    );
    Ok(())
}
