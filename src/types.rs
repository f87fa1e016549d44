//! Core types for unlock-bench

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Category assigned to targets whose list has no (or a blank) category
pub const DEFAULT_CATEGORY: &str = "default";

/// One URL to benchmark plus its category label
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Target URL, passed to the provider as-is
    pub url: String,
    /// Category label, used to name artifacts
    pub category: String,
}

impl Target {
    /// Create a target; a blank category falls back to [`DEFAULT_CATEGORY`]
    pub fn new(url: impl Into<String>, category: Option<&str>) -> Self {
        let category = match category.map(str::trim) {
            Some(c) if !c.is_empty() => c.to_string(),
            _ => DEFAULT_CATEGORY.to_string(),
        };
        Self {
            url: url.into(),
            category,
        }
    }
}

/// One fetch attempt: a target, its stable 1-based index, the attempt number and the level
#[derive(Clone, Debug)]
pub struct FetchTask {
    /// The target (shared across all attempts on it)
    pub target: Arc<Target>,
    /// 1-based position of the target in its list, stable across levels
    pub target_index: usize,
    /// 1-based attempt sequence within the level (1..=level)
    pub attempt_seq: usize,
    /// Concurrency level this attempt belongs to
    pub level: usize,
}

impl FetchTask {
    /// Artifact file name for this attempt: `<category>_<index>_<seq>.html`
    pub fn artifact_name(&self) -> String {
        crate::utils::artifact_name(&self.target.category, self.target_index, self.attempt_seq)
    }
}

/// Outcome label of an attempt
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The provider returned a genuinely unblocked page
    Success,
    /// Non-success response, transport fault or soft block
    Failure,
}

impl Outcome {
    /// Report label
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// How an attempt was classified, finer-grained than [`Outcome`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Success status and the artifact met the size threshold
    Unlocked,
    /// Success status but the body was below the size threshold
    SoftBlock,
    /// The provider reported a non-success status
    NonSuccess,
    /// Transport or persistence fault
    Fault,
}

/// The result of exactly one executed [`FetchTask`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// Target URL
    pub url: String,
    /// Always 1: one record per attempt, no in-worker retry
    pub attempts: u32,
    /// True only for an unlocked page that met the size threshold
    pub success: bool,
    /// Outcome label
    pub outcome: Outcome,
    /// Finer classification (not part of the report columns)
    pub classification: Classification,
    /// Wall-clock seconds from dispatch to final outcome
    pub elapsed_seconds: f64,
    /// Artifact file name for successful attempts, empty otherwise
    pub artifact_name: String,
    /// Short machine-stable note ("HTTP 403", "exception: TimeoutError", or empty)
    pub note: String,
    /// Concurrency level of the attempt
    pub level: usize,
    /// Size of the received body in KB (0 when nothing was received)
    pub artifact_size_kb: f64,
}

impl AttemptRecord {
    pub(crate) fn new(
        task: &FetchTask,
        classification: Classification,
        elapsed: Duration,
        artifact_name: String,
        note: String,
        size_bytes: u64,
    ) -> Self {
        let success = classification == Classification::Unlocked;
        Self {
            url: task.target.url.clone(),
            attempts: 1,
            success,
            outcome: if success {
                Outcome::Success
            } else {
                Outcome::Failure
            },
            classification,
            elapsed_seconds: elapsed.as_secs_f64(),
            artifact_name: if success { artifact_name } else { String::new() },
            note,
            level: task.level,
            artifact_size_kb: size_bytes as f64 / 1024.0,
        }
    }
}

/// Aggregate numbers for one completed level
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelSummary {
    /// Concurrency level
    pub level: usize,
    /// Number of attempts (targets * level)
    pub tasks: usize,
    /// Unlocked attempts
    pub successes: usize,
    /// Success-status responses below the size threshold
    pub soft_blocks: usize,
    /// Non-success responses and faults
    pub failures: usize,
    /// successes / tasks (0.0 for an empty level)
    pub success_rate: f64,
    /// Mean elapsed seconds over all attempts
    pub mean_elapsed_seconds: f64,
    /// Mean artifact size in KB over successful attempts
    pub mean_success_size_kb: f64,
    /// Wall-clock seconds the whole level took
    pub wall_seconds: f64,
}

/// Events emitted while a benchmark runs
///
/// Subscribe via [`Benchmark::subscribe`](crate::Benchmark::subscribe). Emission never
/// blocks a fetch; lagging subscribers simply miss events.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A dataset was loaded and its sweep is starting
    DatasetStarted {
        /// Dataset name (sanitized file stem)
        dataset: String,
        /// Number of targets loaded
        targets: usize,
    },

    /// A configured dataset could not be used and was skipped
    DatasetSkipped {
        /// The dataset file
        path: PathBuf,
        /// Why it was skipped
        reason: String,
    },

    /// A concurrency level is starting
    LevelStarted {
        /// Concurrency level
        level: usize,
        /// Number of attempts at this level
        tasks: usize,
    },

    /// One attempt finished
    TaskCompleted {
        /// The attempt's record
        record: AttemptRecord,
    },

    /// Every attempt of a level finished
    LevelCompleted {
        /// Aggregate numbers for the level
        summary: LevelSummary,
    },

    /// A report was written
    ReportWritten {
        /// Report path
        path: PathBuf,
        /// Number of data rows
        rows: usize,
    },
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn task(category: &str, index: usize, seq: usize, level: usize) -> FetchTask {
        FetchTask {
            target: Arc::new(Target::new("https://example.com/p", Some(category))),
            target_index: index,
            attempt_seq: seq,
            level,
        }
    }

    #[test]
    fn target_blank_category_falls_back_to_default() {
        assert_eq!(Target::new("u", None).category, "default");
        assert_eq!(Target::new("u", Some("   ")).category, "default");
        assert_eq!(Target::new("u", Some(" shoes ")).category, "shoes");
    }

    #[test]
    fn artifact_name_combines_category_index_and_sequence() {
        assert_eq!(task("search", 3, 7, 10).artifact_name(), "search_3_7.html");
        assert_eq!(task("a/b:c", 1, 1, 1).artifact_name(), "a_b_c_1_1.html");
    }

    #[test]
    fn record_success_keeps_artifact_name() {
        let record = AttemptRecord::new(
            &task("shop", 1, 2, 5),
            Classification::Unlocked,
            Duration::from_millis(1500),
            "shop_1_2.html".to_string(),
            String::new(),
            20_000,
        );

        assert!(record.success);
        assert_eq!(record.outcome, Outcome::Success);
        assert_eq!(record.attempts, 1);
        assert_eq!(record.level, 5);
        assert_eq!(record.artifact_name, "shop_1_2.html");
        assert!((record.elapsed_seconds - 1.5).abs() < 1e-9);
        assert!((record.artifact_size_kb - 19.53125).abs() < 1e-9);
    }

    #[test]
    fn record_failure_clears_artifact_name() {
        let record = AttemptRecord::new(
            &task("shop", 1, 1, 1),
            Classification::SoftBlock,
            Duration::from_millis(200),
            "shop_1_1.html".to_string(),
            String::new(),
            500,
        );

        assert!(!record.success);
        assert_eq!(record.outcome, Outcome::Failure);
        assert!(record.artifact_name.is_empty());
        assert!(record.note.is_empty());
    }

    #[test]
    fn outcome_labels() {
        assert_eq!(Outcome::Success.to_string(), "success");
        assert_eq!(Outcome::Failure.label(), "failure");
    }

    #[test]
    fn event_serializes_with_type_tag() {
        let event = Event::LevelStarted { level: 5, tasks: 10 };
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "level_started");
        assert_eq!(json["level"], 5);
    }
}
