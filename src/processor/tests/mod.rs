//! Tests for report runs
//!
//! Runs the processor against small downtime and utilization exports
//! written to a temporary directory.


use crate::config::{AnalysisConfig, GroupDefinition};
use crate::pipeline::SourceInputs;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub const DOWNTIME_HEADER: &str =
    "İş Merkezi Kodu ,Duruş Adı,Duruş Başlangıç Tarih,Duruş Bitiş Tarih";

pub const UTILIZATION_HEADER: &str =
    "Makina Kodu,Tarih,Çalışma Zamanı,Planlı Duruş,Plansız Duruş,Oee,Performans,Kullanılabilirlik,Kalite";

/// Three meal breaks (50 minutes) and one tool change (10 minutes) in
/// ISO week 10 of 2024, plus 5 minutes of operating time on M1
pub fn write_inputs(temp_dir: &TempDir) -> SourceInputs {
    let downtime = temp_dir.path().join("downtime.csv");
    fs::write(
        &downtime,
        format!(
            "{DOWNTIME_HEADER}\n\
M1,YEMEK MOLASI 1,2024-03-04 08:00:00,2024-03-04 08:10:00\n\
M1,MEAL BREAK - SHIFT2,2024-03-04 12:00:00,2024-03-04 12:30:00\n\
M2,YEMEK MOLASI 2,2024-03-04 12:00:00,2024-03-04 12:10:00\n\
M2,TOOL CHANGE,2024-03-04 09:00:00,2024-03-04 09:10:00\n"
        ),
    )
    .unwrap();

    let utilization = temp_dir.path().join("utilization.csv");
    fs::write(
        &utilization,
        format!("{UTILIZATION_HEADER}\nM1,2024-03-04,40,20,15,0.6,0.8,0.75,1.0\n"),
    )
    .unwrap();

    SourceInputs {
        downtime,
        utilization,
        faulty: None,
    }
}

/// LINE A holds M1..M3
pub fn test_config() -> AnalysisConfig {
    AnalysisConfig::default().with_groups(vec![GroupDefinition {
        name: "LINE A".to_string(),
        machines: vec!["M1".to_string(), "M2".to_string(), "M3".to_string()],
    }])
}

pub fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| line.to_string())
        .collect()
}
