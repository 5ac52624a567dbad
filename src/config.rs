//! Configuration management and validation.
//!
//! Provides the analysis configuration: source column mappings, timestamp
//! formats, cause re-bucketing rules, the machine group table and the
//! numeric knobs of the aggregation engine. The configuration is built once
//! at start-up and passed by reference to every component that needs it.

use crate::aggregation::CauseBuckets;
use crate::constants::{
    self, CAUSE_RULES_VERSION, DEFAULT_GROUPS, DEFAULT_PIE_THRESHOLD_PCT, DEFAULT_RANKING_SIZE,
    DEFAULT_TOP_N, FALLBACK_DATE_FORMATS, FALLBACK_TIMESTAMP_FORMATS, PRIMARY_TIMESTAMP_FORMAT,
    TRAILING_ROW_SCAN_LIMIT, downtime_columns, utilization_columns,
};
use crate::error::{DowntimeError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Column headers of the downtime event export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DowntimeColumns {
    pub machine_id: String,
    pub stop_name: String,
    pub started_at: String,
    pub ended_at: String,
}

impl Default for DowntimeColumns {
    fn default() -> Self {
        Self {
            machine_id: downtime_columns::MACHINE_ID.to_string(),
            stop_name: downtime_columns::STOP_NAME.to_string(),
            started_at: downtime_columns::STARTED_AT.to_string(),
            ended_at: downtime_columns::ENDED_AT.to_string(),
        }
    }
}

impl DowntimeColumns {
    pub fn required(&self) -> [&str; 4] {
        [
            self.machine_id.as_str(),
            self.stop_name.as_str(),
            self.started_at.as_str(),
            self.ended_at.as_str(),
        ]
    }
}

/// Column headers of the daily utilization export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UtilizationColumns {
    pub machine_id: String,
    pub date: String,
    pub total_time: String,
    pub planned_stop: String,
    pub unplanned_stop: String,
    pub oee: String,
    pub performance: String,
    pub availability: String,
    pub quality: String,
}

impl Default for UtilizationColumns {
    fn default() -> Self {
        Self {
            machine_id: utilization_columns::MACHINE_ID.to_string(),
            date: utilization_columns::DATE.to_string(),
            total_time: utilization_columns::TOTAL_TIME.to_string(),
            planned_stop: utilization_columns::PLANNED_STOP.to_string(),
            unplanned_stop: utilization_columns::UNPLANNED_STOP.to_string(),
            oee: utilization_columns::OEE.to_string(),
            performance: utilization_columns::PERFORMANCE.to_string(),
            availability: utilization_columns::AVAILABILITY.to_string(),
            quality: utilization_columns::QUALITY.to_string(),
        }
    }
}

impl UtilizationColumns {
    pub fn required(&self) -> [&str; 9] {
        [
            self.machine_id.as_str(),
            self.date.as_str(),
            self.total_time.as_str(),
            self.planned_stop.as_str(),
            self.unplanned_stop.as_str(),
            self.oee.as_str(),
            self.performance.as_str(),
            self.availability.as_str(),
            self.quality.as_str(),
        ]
    }
}

/// Timestamp formats tried by the parser, primary first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimestampFormats {
    pub primary: String,
    pub fallbacks: Vec<String>,
    pub date_fallbacks: Vec<String>,
    /// Accept spreadsheet serial day numbers as a last resort
    pub spreadsheet_serials: bool,
}

impl Default for TimestampFormats {
    fn default() -> Self {
        Self {
            primary: PRIMARY_TIMESTAMP_FORMAT.to_string(),
            fallbacks: owned_formats(FALLBACK_TIMESTAMP_FORMATS),
            date_fallbacks: owned_formats(FALLBACK_DATE_FORMATS),
            spreadsheet_serials: true,
        }
    }
}

fn owned_formats(formats: &[&str]) -> Vec<String> {
    formats.iter().map(|f| f.to_string()).collect()
}

/// A single re-bucketing rule: causes matching `pattern` collapse into `bucket`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CauseRule {
    /// Case-insensitive regular expression
    pub pattern: String,
    pub bucket: String,
}

impl CauseRule {
    pub fn new(pattern: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            bucket: bucket.into(),
        }
    }
}

/// Versioned cause re-bucketing rules
///
/// `full` is used by cause totals and per-machine cause tables. `trend` is
/// used by the top-N trend tables and does not merge setup stops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CauseRuleSet {
    pub version: u32,
    pub full: Vec<CauseRule>,
    pub trend: Vec<CauseRule>,
}

impl Default for CauseRuleSet {
    fn default() -> Self {
        let meal = CauseRule::new("MEAL BREAK|YEMEK MOLASI", "MEAL BREAK");
        let design = CauseRule::new("DESIGN|TASARIM", "DESIGN STOPPAGES");
        let setup = CauseRule::new("SMED|SETUP|AYAR", "SETUP");
        Self {
            version: CAUSE_RULES_VERSION,
            full: vec![meal.clone(), design.clone(), setup],
            trend: vec![meal, design],
        }
    }
}

/// A registered machine group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDefinition {
    pub name: String,
    pub machines: Vec<String>,
}

/// Which utilization rows survive the merge restriction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageMode {
    /// Keep a row only if its exact (date, machine) pair has downtime records
    #[default]
    DateMachinePairs,
    /// Keep a row if its date and its machine each appear in the downtime table
    DatesAndMachines,
}

/// Global configuration for downtime analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Field separator of both CSV exports
    pub separator: char,

    /// Maximum trailing rows removed from each export
    pub trailing_scan_limit: usize,

    /// Causes kept per entity in trend tables
    pub top_n: usize,

    /// Pie slices below this percentage are merged into one slice
    pub pie_threshold_pct: f64,

    /// Machines shown in highest/lowest rankings
    pub ranking_size: usize,

    /// Merge restriction of utilization rows
    pub coverage: CoverageMode,

    pub downtime_columns: DowntimeColumns,
    pub utilization_columns: UtilizationColumns,
    pub timestamps: TimestampFormats,
    pub cause_rules: CauseRuleSet,

    /// Machine groups, in lookup order
    pub groups: Vec<GroupDefinition>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            separator: ',',
            trailing_scan_limit: TRAILING_ROW_SCAN_LIMIT,
            top_n: DEFAULT_TOP_N,
            pie_threshold_pct: DEFAULT_PIE_THRESHOLD_PCT,
            ranking_size: DEFAULT_RANKING_SIZE,
            coverage: CoverageMode::default(),
            downtime_columns: DowntimeColumns::default(),
            utilization_columns: UtilizationColumns::default(),
            timestamps: TimestampFormats::default(),
            cause_rules: CauseRuleSet::default(),
            groups: default_groups(),
        }
    }
}

/// The plant's built-in group table
pub fn default_groups() -> Vec<GroupDefinition> {
    DEFAULT_GROUPS
        .iter()
        .map(|(name, machines)| GroupDefinition {
            name: name.to_string(),
            machines: machines.iter().map(|m| m.to_string()).collect(),
        })
        .collect()
}

impl AnalysisConfig {
    /// Load configuration with a layered approach
    ///
    /// An explicit file wins; otherwise the user config file is used when it
    /// exists; otherwise the built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config = match explicit {
            Some(path) => Self::from_toml_file(path)?,
            None => match Self::user_config_path().filter(|path| path.exists()) {
                Some(path) => Self::from_toml_file(&path)?,
                None => {
                    debug!("No configuration file found, using built-in defaults");
                    Self::default()
                }
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Read configuration from a TOML file
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(DowntimeError::configuration(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let text = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&text).map_err(|e| {
            DowntimeError::configuration(format!("Invalid TOML in {}: {}", path.display(), e))
        })?;

        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// `<config_dir>/downtime-processor/config.toml`
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| {
            dir.join(constants::CONFIG_DIR_NAME)
                .join(constants::CONFIG_FILE_NAME)
        })
    }

    /// Check the configuration for values the pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        if !self.separator.is_ascii() {
            return Err(DowntimeError::configuration(format!(
                "Separator must be a single ASCII character, got '{}'",
                self.separator
            )));
        }

        if self.top_n == 0 {
            return Err(DowntimeError::configuration("top_n must be at least 1"));
        }

        if !(0.0..=100.0).contains(&self.pie_threshold_pct) {
            return Err(DowntimeError::configuration(format!(
                "pie_threshold_pct must be within 0..=100, got {}",
                self.pie_threshold_pct
            )));
        }

        if self.timestamps.primary.trim().is_empty() {
            return Err(DowntimeError::configuration(
                "Primary timestamp format must not be empty",
            ));
        }

        CauseBuckets::compile(&self.cause_rules.full)?;
        CauseBuckets::compile(&self.cause_rules.trend)?;

        let mut seen = std::collections::HashSet::new();
        for group in &self.groups {
            if !seen.insert(group.name.as_str()) {
                return Err(DowntimeError::configuration(format!(
                    "Group '{}' is defined more than once",
                    group.name
                )));
            }
        }

        Ok(())
    }

    /// Separator as the byte polars expects
    pub fn separator_byte(&self) -> u8 {
        self.separator as u8
    }

    /// Set the CSV separator
    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// Set the number of causes kept per entity in trend tables
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// Set the pie slice threshold
    pub fn with_pie_threshold(mut self, pct: f64) -> Self {
        self.pie_threshold_pct = pct;
        self
    }

    /// Set the merge coverage mode
    pub fn with_coverage(mut self, coverage: CoverageMode) -> Self {
        self.coverage = coverage;
        self
    }

    /// Replace the machine group table
    pub fn with_groups(mut self, groups: Vec<GroupDefinition>) -> Self {
        self.groups = groups;
        self
    }

    /// Replace the downtime column mapping
    pub fn with_downtime_columns(mut self, columns: DowntimeColumns) -> Self {
        self.downtime_columns = columns;
        self
    }

    /// Replace the utilization column mapping
    pub fn with_utilization_columns(mut self, columns: UtilizationColumns) -> Self {
        self.utilization_columns = columns;
        self
    }
}
