//! Result aggregation and the tabular report (`global_results.csv`).

use crate::error::Result;
use crate::types::{AttemptRecord, Classification, LevelSummary};
use std::io::Write;
use std::path::Path;
use std::time::Duration;

/// File name of the aggregate report inside a dataset directory
pub const REPORT_FILE: &str = "global_results.csv";

/// Report columns, in order
pub const REPORT_COLUMNS: [&str; 9] = [
    "target",
    "attempts",
    "success_flag",
    "outcome_label",
    "elapsed_seconds",
    "artifact_name",
    "note",
    "concurrency_level",
    "artifact_size_kb",
];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Everything one sweep over one dataset produced
#[derive(Clone, Debug, Default)]
pub struct RunReport {
    /// Dataset name (sanitized input file stem)
    pub dataset: String,
    /// Attempt records, level by level in ladder order
    pub records: Vec<AttemptRecord>,
    /// One summary per completed level, in ladder order
    pub levels: Vec<LevelSummary>,
}

impl RunReport {
    /// Records belonging to one level
    pub fn records_at(&self, level: usize) -> impl Iterator<Item = &AttemptRecord> {
        self.records.iter().filter(move |r| r.level == level)
    }
}

/// Write records to a report file, replacing any previous one
///
/// The file starts with a UTF-8 BOM and a fixed header line; each record is one row.
/// String columns are quoted, numeric columns are rounded to two decimals. Rows are
/// flushed as a block at the end; a crash mid-write loses at most the unflushed tail.
///
/// Returns the number of data rows written.
pub fn write_report(records: &[AttemptRecord], path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
    file.write_all(UTF8_BOM)?;
    file.write_all(REPORT_COLUMNS.join(",").as_bytes())?;
    file.write_all(b"\n")?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .quote_style(csv::QuoteStyle::NonNumeric)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(file);

    for record in records {
        writer.write_record(report_row(record))?;
    }
    writer.flush()?;

    Ok(records.len())
}

fn report_row(record: &AttemptRecord) -> [String; 9] {
    [
        record.url.clone(),
        record.attempts.to_string(),
        u8::from(record.success).to_string(),
        record.outcome.label().to_string(),
        format!("{:.2}", record.elapsed_seconds),
        record.artifact_name.clone(),
        record.note.clone(),
        record.level.to_string(),
        format!("{:.2}", record.artifact_size_kb),
    ]
}

/// Aggregate the records of one level
pub fn summarize_level(level: usize, records: &[AttemptRecord], wall: Duration) -> LevelSummary {
    let tasks = records.len();
    let count = |c: Classification| records.iter().filter(|r| r.classification == c).count();
    let successes = count(Classification::Unlocked);
    let soft_blocks = count(Classification::SoftBlock);

    let mean = |sum: f64, n: usize| if n == 0 { 0.0 } else { sum / n as f64 };
    let elapsed_sum: f64 = records.iter().map(|r| r.elapsed_seconds).sum();
    let success_size_sum: f64 = records
        .iter()
        .filter(|r| r.success)
        .map(|r| r.artifact_size_kb)
        .sum();

    LevelSummary {
        level,
        tasks,
        successes,
        soft_blocks,
        failures: tasks - successes - soft_blocks,
        success_rate: mean(successes as f64, tasks),
        mean_elapsed_seconds: mean(elapsed_sum, tasks),
        mean_success_size_kb: mean(success_size_sum, successes),
        wall_seconds: wall.as_secs_f64(),
    }
}
