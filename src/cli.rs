//! Command-line interface components.

use crate::config::{HfrConfig, ReportFormat};
use crate::models::{ProcessingStats, ProductType};
use crate::processor::discovery::FileDiscovery;
use crate::processor::{BatchProcessor, FileProcessor, MetadataSources, ReportWriter};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::*;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Product selector on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProductArg {
    Radial,
    Total,
}

impl From<ProductArg> for ProductType {
    fn from(arg: ProductArg) -> Self {
        match arg {
            ProductArg::Radial => ProductType::Radial,
            ProductArg::Total => ProductType::Total,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "hfr_processor")]
#[command(about = "Grid-map and quality-control HF radar radial and total files")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Input file, directory or glob pattern of .ruv/.tuv files
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output directory for QC reports (defaults to <INPUT>/qc or ./qc)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Only process one product type
    #[arg(long, value_enum)]
    pub product: Option<ProductArg>,

    /// Station/network metadata JSON, takes precedence over file headers
    #[arg(long, value_name = "FILE")]
    pub metadata: Option<PathBuf>,

    /// Fallback metadata profile JSON for fields missing elsewhere
    #[arg(long, value_name = "FILE")]
    pub profile: Option<PathBuf>,

    /// QC configuration JSON
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Report format (parquet, csv)
    #[arg(long)]
    pub format: Option<ReportFormat>,

    /// Maximum files processed concurrently
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Skip the temporal derivative sibling lookup
    #[arg(long)]
    pub no_temporal_derivative: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Output directory, defaulting to `qc/` next to the input
    pub fn get_output_dir(&self) -> PathBuf {
        match &self.output_dir {
            Some(path) => path.clone(),
            None if self.input.is_dir() => self.input.join("qc"),
            None => self
                .input
                .parent()
                .filter(|p| !p.as_os_str().is_empty() && p.is_dir())
                .unwrap_or(Path::new("."))
                .join("qc"),
        }
    }

    /// Configuration file merged with command-line overrides
    pub fn build_config(&self) -> Result<HfrConfig> {
        let mut config = match &self.config {
            Some(path) => HfrConfig::from_file(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?,
            None => HfrConfig::default(),
        };

        if let Some(workers) = self.workers {
            config = config.with_workers(workers);
        }
        if let Some(format) = self.format {
            config = config.with_report_format(format);
        }
        if self.no_temporal_derivative {
            config = config.without_temporal_derivative();
        }

        config.validate()?;
        Ok(config)
    }
}

/// Set up structured logging on stderr
pub fn setup_logging(verbose: bool) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hfr_processor={}", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .init();

    debug!("Logging initialized at level: {}", log_level);
}

/// Discover, process and report every input file
pub async fn run(args: Args) -> Result<ProcessingStats> {
    let config = args.build_config()?;
    let metadata = MetadataSources::from_files(args.metadata.as_deref(), args.profile.as_deref())
        .context("Failed to load station metadata")?;
    let output_dir = args.get_output_dir();

    println!("{}", "Starting HF radar QC".bright_green().bold());
    println!("  {} {}", "Input:".bright_cyan(), args.input.display());
    println!("  {} {}", "Output:".bright_cyan(), output_dir.display());

    let files = FileDiscovery::new(args.input.clone())
        .with_product(args.product.map(ProductType::from))
        .discover()
        .with_context(|| format!("Failed to discover input files in {}", args.input.display()))?;

    println!(
        "  {} {} input files",
        "Found".bright_green(),
        files.len().to_string().bright_white().bold()
    );

    let writer = ReportWriter::new(output_dir, config.report_format);
    let batch = BatchProcessor::new(FileProcessor::new(config, metadata), writer);
    let stats = batch.process(files).await?;

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_arguments() {
        let args = Args::try_parse_from([
            "hfr_processor",
            "/data/radials",
            "--product",
            "radial",
            "--format",
            "csv",
            "-w",
            "3",
            "-v",
        ])
        .unwrap();

        assert_eq!(args.input, PathBuf::from("/data/radials"));
        assert_eq!(args.product, Some(ProductArg::Radial));
        assert_eq!(args.format, Some(ReportFormat::Csv));
        assert!(args.verbose);

        let config = args.build_config().unwrap();
        assert_eq!(config.workers, 3);
        assert_eq!(config.report_format, ReportFormat::Csv);
    }

    #[test]
    fn test_rejects_unknown_format() {
        assert!(Args::try_parse_from(["hfr_processor", "in", "--format", "netcdf"]).is_err());
    }

    #[test]
    fn test_output_dir_defaults() {
        let args = Args::try_parse_from(["hfr_processor", "in.ruv", "-o", "/tmp/qc"]).unwrap();
        assert_eq!(args.get_output_dir(), PathBuf::from("/tmp/qc"));

        let temp_dir = tempfile::TempDir::new().unwrap();
        let input = temp_dir.path().to_string_lossy().into_owned();
        let args = Args::try_parse_from(["hfr_processor", input.as_str()]).unwrap();
        assert_eq!(args.get_output_dir(), temp_dir.path().join("qc"));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let args = Args::try_parse_from(["hfr_processor", "in", "-w", "0"]).unwrap();
        assert!(args.build_config().is_err());
    }
}
