//! Application constants for the downtime processor
//!
//! This module contains the fixed markers, default column names, parsing
//! formats and the plant's built-in machine group table used throughout
//! the processor.

// =============================================================================
// Record Markers
// =============================================================================

/// Stop name injected for rows derived from the utilization export.
///
/// These rows represent uptime rather than a discrete downtime cause.
pub const OPERATING_TIME: &str = "OPERATING TIME";

/// Display name for machines outside every registered group
pub const UNASSIGNED_GROUP: &str = "Unassigned";

/// Display form of the unresolved week sentinel (year 0000, week 1)
pub const UNRESOLVED_WEEK_LABEL: &str = "0000-1";

/// Label of the merged slice produced by pie threshold collapsing
pub const OTHER_SLICE: &str = "OTHER";

// =============================================================================
// Processing Limits
// =============================================================================

/// Maximum number of trailing rows dropped by the row sanitizer
pub const TRAILING_ROW_SCAN_LIMIT: usize = 5;

/// Number of causes kept per entity in trend tables
pub const DEFAULT_TOP_N: usize = 10;

/// Pie slices below this share (percent) are merged into `OTHER_SLICE`
pub const DEFAULT_PIE_THRESHOLD_PCT: f64 = 3.0;

/// Number of machines shown in highest/lowest rankings
pub const DEFAULT_RANKING_SIZE: usize = 10;

/// Machines shown on each side of the top/bottom comparison
pub const TOP_BOTTOM_SIZE: usize = 7;

/// Version tag of the built-in cause bucket rules
pub const CAUSE_RULES_VERSION: u32 = 2;

// =============================================================================
// Source Columns
// =============================================================================

/// Default column headers of the downtime event export
pub mod downtime_columns {
    pub const MACHINE_ID: &str = "İş Merkezi Kodu ";
    pub const STOP_NAME: &str = "Duruş Adı";
    pub const STARTED_AT: &str = "Duruş Başlangıç Tarih";
    pub const ENDED_AT: &str = "Duruş Bitiş Tarih";
}

/// Default column headers of the daily utilization export
pub mod utilization_columns {
    pub const MACHINE_ID: &str = "Makina Kodu";
    pub const DATE: &str = "Tarih";
    pub const TOTAL_TIME: &str = "Çalışma Zamanı";
    pub const PLANNED_STOP: &str = "Planlı Duruş";
    pub const UNPLANNED_STOP: &str = "Plansız Duruş";
    pub const OEE: &str = "Oee";
    pub const PERFORMANCE: &str = "Performans";
    pub const AVAILABILITY: &str = "Kullanılabilirlik";
    pub const QUALITY: &str = "Kalite";
}

// =============================================================================
// Timestamp Parsing
// =============================================================================

/// Primary timestamp format of both exports
pub const PRIMARY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Lenient fallbacks tried in order when the primary format fails
pub const FALLBACK_TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Date-only fallbacks, interpreted as midnight
pub const FALLBACK_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y", "%d/%m/%Y"];

/// Plausible range for spreadsheet serial day numbers (1954 to 2119)
pub const SPREADSHEET_SERIAL_RANGE: (f64, f64) = (20_000.0, 80_000.0);

// =============================================================================
// Output Files
// =============================================================================

/// Default output directory for report tables
pub const DEFAULT_OUTPUT_DIR: &str = "reports";

/// Config file location under the user config directory
pub const CONFIG_DIR_NAME: &str = "downtime-processor";
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Report table file names
pub mod report_files {
    pub const CAUSE_TOTALS: &str = "cause_totals.csv";
    pub const CAUSE_TOTALS_PIE: &str = "cause_totals_pie.csv";
    pub const GROUP_TOTALS: &str = "group_totals.csv";
    pub const GROUP_AVERAGES: &str = "group_machine_averages.csv";
    pub const MACHINE_TOTALS: &str = "machine_totals.csv";
    pub const MACHINES_HIGHEST: &str = "machines_highest.csv";
    pub const MACHINES_LOWEST: &str = "machines_lowest.csv";
    pub const MACHINES_MIDDLE: &str = "machines_middle.csv";
    pub const MACHINES_TOP_BOTTOM: &str = "machines_top_bottom.csv";
    pub const MACHINE_CAUSES: &str = "machine_causes.csv";
    pub const MACHINE_BREAKDOWN: &str = "machine_stop_breakdown.csv";
    pub const GROUP_TREND: &str = "group_trend.csv";
    pub const MACHINE_TREND: &str = "machine_trend.csv";
    pub const PART_AVERAGES: &str = "group_part_averages.csv";
    pub const OEE_ROLLUP: &str = "oee_rollup.csv";
    pub const LATEST_WEEK_FACTS: &str = "latest_week_facts.csv";
}

// =============================================================================
// Built-in Group Registry
// =============================================================================

/// The plant's machine groups, in lookup order
pub const DEFAULT_GROUPS: &[(&str, &[&str])] = &[
    (
        "KISIM 2.1",
        &[
            "CT.D01", "CT.D02", "CT.D03", "CT.D04", "CT.D05", "CT.D06", "CT.D07", "CT.D08",
            "CT.D09", "CT.D10", "CT.D11", "CT.D12", "CT.G1", "CT.KO1", "CT.KO2",
        ],
    ),
    (
        "KISIM 2.2",
        &["İM.K01", "İM.K03", "İM.MK1", "İM.T01", "İM.T02", "İM.V01"],
    ),
    (
        "KISIM 3.1",
        &[
            "İM.MV1", "İM.MV2", "İM.MV3", "İM.MV4", "İM.MV5", "İM.MV6", "İM.S01", "İM.S02",
        ],
    ),
    (
        "KISIM 3.2",
        &[
            "İM.OM01", "İM.OM02", "İM.OM03", "İM.OM04", "İM.OM05", "İM.OM06", "İM.OM07", "İM.OM08",
            "İM.OM09", "İM.OM10",
        ],
    ),
    (
        "KISIM 4.1",
        &[
            "İM.M1", "İM.M2", "İM.M3", "İM.M4", "İM.M5", "İM.M6", "İM.M7", "İM.M8", "İM.M9",
            "İM.O05",
        ],
    ),
    (
        "KISIM 4.2",
        &[
            "İM.O01", "İM.O02", "İM.O03", "İM.O04", "İM.O06", "İM.O07", "İM.O08", "İM.O09",
            "İM.O10", "İM.O11",
        ],
    ),
    (
        "KISIM 5.1",
        &[
            "T.B01", "T.J01", "T.J02", "T.K01", "T.S01", "T.S02", "T.S03", "T.S04", "T.S05",
            "T.S06", "T.S07", "T.S08",
        ],
    ),
];
