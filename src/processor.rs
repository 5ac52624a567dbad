//! Report run orchestration.
//!
//! Drives one run end to end: preparation of the fact table, report table
//! assembly and CSV output, with console progress and a closing summary.

use crate::config::AnalysisConfig;
use crate::error::{DowntimeError, Result};
use crate::models::WeekStamp;
use crate::pipeline::{self, PreparationStats, SourceInputs};
use crate::report::{self, ReportTables};

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::fs;
use tokio::task;
use tracing::{debug, info};

#[cfg(test)]
pub mod tests;

/// Outcome of one report run
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSummary {
    /// Current analysis week, `None` when no rows survived preparation
    pub week: Option<WeekStamp>,
    pub stats: PreparationStats,
    pub files_written: Vec<PathBuf>,
    pub output_dir: PathBuf,
    pub processing_time_ms: u128,
}

/// Main processor for downtime report runs
pub struct ReportProcessor {
    inputs: SourceInputs,
    output_dir: PathBuf,
    config: AnalysisConfig,
    export_latest_week: bool,
    show_progress: bool,
}

impl ReportProcessor {
    /// Create a processor for the given inputs
    ///
    /// Both exports must exist. A missing fault list is tolerated and only
    /// reported once the run starts.
    pub fn new(inputs: SourceInputs, output_dir: PathBuf) -> Result<Self> {
        for path in [&inputs.downtime, &inputs.utilization] {
            if !path.exists() {
                return Err(DowntimeError::SourceNotFound { path: path.clone() });
            }
        }

        Ok(Self {
            inputs,
            output_dir,
            config: AnalysisConfig::default(),
            export_latest_week: false,
            show_progress: true,
        })
    }

    pub fn with_config(mut self, config: AnalysisConfig) -> Self {
        self.config = config;
        self
    }

    /// Also write the current week's fact rows
    pub fn with_latest_week_export(mut self, enabled: bool) -> Self {
        self.export_latest_week = enabled;
        self
    }

    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.show_progress = enabled;
        self
    }

    /// Main processing entry point
    pub async fn process(&mut self) -> Result<ReportSummary> {
        let start_time = Instant::now();
        self.config.validate()?;

        if self.show_progress {
            println!("{}", "Starting downtime report run".bright_green().bold());
            println!(
                "  {} {}",
                "Downtime:".bright_cyan(),
                self.inputs.downtime.display()
            );
            println!(
                "  {} {}",
                "Utilization:".bright_cyan(),
                self.inputs.utilization.display()
            );
            if let Some(faulty) = &self.inputs.faulty {
                println!("  {} {}", "Fault list:".bright_cyan(), faulty.display());
            }
            println!(
                "  {} {}",
                "Output:".bright_cyan(),
                self.output_dir.display()
            );
        }

        let spinner = self.spinner("Preparing fact table...");

        let config = self.config.clone();
        let inputs = self.inputs.clone();
        let analysis = task::spawn_blocking(move || -> Result<_> {
            let prepared = pipeline::prepare(&config, &inputs)?;
            let tables = report::build_report(&prepared, &config)?;
            Ok((prepared.stats, prepared.group_counts.total(), tables))
        })
        .await
        .map_err(|e| DowntimeError::Processing {
            reason: format!("Analysis task failed: {}", e),
        })?;

        let (stats, machine_count, tables) = match analysis {
            Ok(result) => result,
            Err(e) => {
                if let Some(pb) = &spinner {
                    pb.abandon_with_message("Analysis failed");
                }
                return Err(e);
            }
        };

        if let Some(pb) = &spinner {
            pb.set_message("Writing report tables...");
        }
        fs::create_dir_all(&self.output_dir).await?;
        let files_written = self.write_tables(tables.clone()).await?;

        if let Some(pb) = &spinner {
            pb.finish_with_message("Report complete");
        }

        let elapsed = start_time.elapsed();
        debug!("Report run finished in {:?}", elapsed);
        info!(
            "Wrote {} report tables to {}",
            files_written.len(),
            self.output_dir.display()
        );

        if self.show_progress {
            print_summary(&tables, &stats, files_written.len(), elapsed, machine_count);
        }

        Ok(ReportSummary {
            week: tables.week,
            stats,
            files_written,
            output_dir: self.output_dir.clone(),
            processing_time_ms: elapsed.as_millis(),
        })
    }

    async fn write_tables(&self, tables: ReportTables) -> Result<Vec<PathBuf>> {
        let output_dir = self.output_dir.clone();
        let export_latest_week = self.export_latest_week;
        task::spawn_blocking(move || report::write_report(&tables, &output_dir, export_latest_week))
            .await
            .map_err(|e| DowntimeError::Processing {
                reason: format!("Report writing task failed: {}", e),
            })?
    }

    fn spinner(&self, message: &str) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message(message.to_string());
        Some(pb)
    }
}

fn print_summary(
    tables: &ReportTables,
    stats: &PreparationStats,
    files_written: usize,
    elapsed: Duration,
    machine_count: usize,
) {
    println!("\n{}", "Report Summary".bright_green().bold());
    println!(
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        elapsed.as_millis().to_string().bright_white()
    );
    if machine_count > 0 {
        println!(
            "  {} {:.2}ms",
            "Time per machine:".bright_cyan(),
            elapsed.as_secs_f64() * 1000.0 / machine_count as f64
        );
    }
    match tables.week {
        Some(week) => println!(
            "  {} {}",
            "Analysis week:".bright_cyan(),
            week.to_string().bright_white().bold()
        ),
        None => println!("  {}", "No rows survived preparation".bright_yellow()),
    }
    println!(
        "  {} {}",
        "Fact rows:".bright_cyan(),
        stats.fact_rows.to_string().bright_white().bold()
    );
    if stats.rows_dropped() > 0 {
        println!(
            "  {} {}",
            "Rows dropped:".bright_yellow(),
            stats.rows_dropped().to_string().bright_yellow()
        );
    }
    if stats.sentinel_applied {
        println!(
            "  {}",
            "No timestamp could be parsed; week is unresolved".bright_red()
        );
    }
    println!(
        "  {} {}",
        "Tables written:".bright_cyan(),
        files_written.to_string().bright_white()
    );
}
