use std::path::PathBuf;
use std::sync::Arc;
use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use salesgrid::core::config::{Config, SourceMode};
use salesgrid::reader::inspect::{self, DataReport};
use salesgrid::search::executor::QueryEngine;
use salesgrid::writer::CsvSplitter;
use salesgrid::api;

#[derive(Parser)]
#[command(version, about = "Retail sales query server and CSV tooling")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = "SALES_CONFIG")]
    config: Option<PathBuf>,
    /// Overrides data.data_dir
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Serve the sales API
    Serve {
        #[arg(long)]
        addr: Option<String>,
        /// in_memory or streaming
        #[arg(long)]
        mode: Option<String>,
    },
    /// Split one large CSV into numbered chunk files
    Split {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        chunk_size: Option<usize>,
        /// Defaults to the data directory
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Report the data files the server would load
    Verify {
        #[arg(long, default_value_t = 3)]
        preview: usize,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };
    config.apply_env()?;
    if let Some(dir) = &cli.data_dir {
        config.data.data_dir = dir.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let mut config = load_config(&cli)?;

    match cli.cmd {
        Cmd::Serve { addr, mode } => {
            if let Some(addr) = addr {
                config.server.addr = addr;
            }
            if let Some(mode) = mode {
                config.data.mode = match SourceMode::parse(&mode) {
                    Some(mode) => mode,
                    None => bail!("unknown mode '{}', expected in_memory or streaming", mode),
                };
            }
            config.validate()?;
            run_serve(config).await
        }
        Cmd::Split { input, chunk_size, output_dir } => {
            if let Some(size) = chunk_size {
                config.data.split_chunk_size = size;
            }
            let input = input.unwrap_or_else(|| config.data.data_dir.join(&config.data.file_name));
            run_split(&config, &input, output_dir)
        }
        Cmd::Verify { preview } => run_verify(&config, preview),
    }
}

async fn run_serve(config: Config) -> anyhow::Result<()> {
    let loader_config = config.clone();
    let engine = tokio::task::spawn_blocking(move || QueryEngine::open(&loader_config))
        .await?
        .context("opening record source")?;

    let stats = engine.stats();
    tracing::info!(
        mode = ?stats.source_mode,
        files = stats.source_files,
        records = ?stats.total_records,
        "record source ready"
    );

    api::serve(Arc::new(engine), &config).await?;
    Ok(())
}

fn run_split(config: &Config, input: &std::path::Path, output_dir: Option<PathBuf>) -> anyhow::Result<()> {
    let mut splitter_config = config.data.clone();
    if let Some(dir) = output_dir {
        splitter_config.data_dir = dir;
    }
    let report = CsvSplitter::from_config(&splitter_config).split(input)?;

    println!("split {} rows into {} files", report.rows, report.chunks.len());
    for chunk in &report.chunks {
        println!("  {}\t{} rows\t{} bytes", chunk.path.display(), chunk.rows, chunk.size_bytes);
    }
    Ok(())
}

fn run_verify(config: &Config, preview: usize) -> anyhow::Result<()> {
    let report = inspect::verify(&config.data, preview)?;
    print_report(&report);
    if !report.is_ok() {
        bail!("data directory {} is not ready to serve", report.data_dir.display());
    }
    Ok(())
}

fn print_report(report: &DataReport) {
    println!("data directory: {}", report.data_dir.display());
    if report.files.is_empty() {
        println!("no data files found; directory contains:");
        for name in &report.listing {
            println!("  {}", name);
        }
        return;
    }

    for file in &report.files {
        let modified = file
            .modified
            .map(|m| m.to_rfc3339())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{}\t{:.2} MB\t{} rows\tmodified {}",
            file.path.display(),
            file.size_bytes as f64 / (1024.0 * 1024.0),
            file.rows,
            modified
        );
        if !file.header.missing.is_empty() {
            println!("  missing columns: {:?}", file.header.missing);
        }
        if !file.header.unknown.is_empty() {
            println!("  unknown columns: {:?}", file.header.unknown);
        }
        for [name, date, amount] in &file.preview {
            println!("  {} | {} | {}", name, date, amount);
        }
    }
    println!("total rows: {}", report.total_rows());
}
