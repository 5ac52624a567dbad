//! Command-line interface components.

use crate::config::AnalysisConfig;
use crate::constants::DEFAULT_OUTPUT_DIR;
use crate::pipeline::SourceInputs;
use crate::processor::{ReportProcessor, ReportSummary};
use clap::Parser;
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "downtime-processor")]
#[command(about = "Reconcile machine downtime and utilization exports into weekly OEE reports")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Downtime event export (one row per stoppage)
    #[arg(long, value_name = "FILE")]
    pub downtime: PathBuf,

    /// Daily utilization export (one row per machine and day)
    #[arg(long, value_name = "FILE")]
    pub utilization: PathBuf,

    /// Newline-separated list of fault-flagged machine ids
    #[arg(long, value_name = "FILE")]
    pub faulty: Option<PathBuf>,

    /// Output directory for report tables
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output: PathBuf,

    /// Configuration file (defaults to the user config file when present)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Also write the current week's fact rows
    #[arg(long)]
    pub export_latest_week: bool,

    /// Causes kept per entity in trend tables
    #[arg(long)]
    pub top_n: Option<usize>,

    /// Field separator of both exports
    #[arg(long)]
    pub separator: Option<char>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log warnings and errors, no progress output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }

    /// Layered configuration with command-line overrides applied last
    pub fn load_config(&self) -> crate::Result<AnalysisConfig> {
        let mut config = AnalysisConfig::load(self.config.as_deref())?;
        if let Some(top_n) = self.top_n {
            config = config.with_top_n(top_n);
        }
        if let Some(separator) = self.separator {
            config = config.with_separator(separator);
        }
        config.validate()?;
        Ok(config)
    }
}

/// Set up structured logging based on CLI arguments
pub fn setup_logging(args: &Args) -> anyhow::Result<()> {
    use anyhow::Context;
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.log_level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("downtime_processor={}", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Run one report from parsed arguments
pub async fn run(args: Args) -> anyhow::Result<ReportSummary> {
    setup_logging(&args)?;
    debug!("Command line arguments: {:?}", args);

    let inputs = input_check::verify_inputs(&args)?;
    let config = args.load_config()?;

    let mut processor = ReportProcessor::new(inputs, args.output.clone())?
        .with_config(config)
        .with_latest_week_export(args.export_latest_week)
        .with_progress(!args.quiet);

    Ok(processor.process().await?)
}

/// Checks on the input files before any parsing starts
pub mod input_check {
    use super::*;
    use anyhow::{Context, Result, bail};
    use colored::*;
    use std::path::Path;

    /// Verify both exports are readable files and collect the run inputs
    ///
    /// A missing fault list only produces a warning; the run continues
    /// without excluding any machine.
    pub fn verify_inputs(args: &Args) -> Result<SourceInputs> {
        verify_export(&args.downtime, "Downtime export")?;
        verify_export(&args.utilization, "Utilization export")?;

        let faulty = match &args.faulty {
            Some(path) if !path.is_file() => {
                eprintln!(
                    "{} fault list {} not found, no machines will be excluded",
                    "Warning:".bright_yellow().bold(),
                    path.display()
                );
                None
            }
            other => other.clone(),
        };

        Ok(SourceInputs {
            downtime: args.downtime.clone(),
            utilization: args.utilization.clone(),
            faulty,
        })
    }

    fn verify_export(path: &Path, label: &str) -> Result<()> {
        let metadata = std::fs::metadata(path)
            .with_context(|| format!("{} not found at {}", label, path.display()))?;

        if !metadata.is_file() {
            bail!("{} at {} is not a file", label, path.display());
        }
        if metadata.len() == 0 {
            bail!("{} at {} is empty", label, path.display());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec![
            "downtime-processor",
            "--downtime",
            "downtime.csv",
            "--utilization",
            "utilization.csv",
        ];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        assert_eq!(args.output, PathBuf::from(DEFAULT_OUTPUT_DIR));
        assert!(!args.export_latest_week);
        assert_eq!(args.top_n, None);
        assert_eq!(args.log_level(), "info");
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        assert_eq!(parse(&["-v"]).log_level(), "debug");
        assert_eq!(parse(&["--quiet"]).log_level(), "warn");
        let result = Args::try_parse_from([
            "downtime-processor",
            "--downtime",
            "a.csv",
            "--utilization",
            "b.csv",
            "-v",
            "-q",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides_apply_over_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "top_n = 4\nseparator = \";\"\n").unwrap();
        let config_arg = config_path.to_string_lossy().to_string();

        let config = parse(&["--config", &config_arg]).load_config().unwrap();
        assert_eq!(config.top_n, 4);
        assert_eq!(config.separator, ';');

        let config = parse(&["--config", &config_arg, "--top-n", "7"])
            .load_config()
            .unwrap();
        assert_eq!(config.top_n, 7);
    }

    #[test]
    fn test_verify_inputs() {
        let temp_dir = TempDir::new().unwrap();
        let downtime = temp_dir.path().join("downtime.csv");
        let utilization = temp_dir.path().join("utilization.csv");
        fs::write(&downtime, "header\n").unwrap();
        fs::write(&utilization, "").unwrap();

        let mut args = parse(&["--faulty", "absent.txt"]);
        args.downtime = downtime;
        args.utilization = utilization.clone();

        let error = input_check::verify_inputs(&args).unwrap_err();
        assert!(error.to_string().contains("is empty"));

        fs::write(&utilization, "header\n").unwrap();
        let inputs = input_check::verify_inputs(&args).unwrap();
        assert_eq!(inputs.utilization, utilization);
        assert_eq!(inputs.faulty, None);
    }
}
