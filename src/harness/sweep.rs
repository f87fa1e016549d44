//! Sweep controller -- drives the concurrency ladder with a full barrier between levels.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::report::{RunReport, summarize_level};
use crate::types::{Event, FetchTask, Target};

use super::context::FetchContext;
use super::pool::execute_level;

/// Expand targets into the attempts of one level: every target paired with `1..=level`
///
/// Target indices are 1-based and follow list order, so they are stable across levels.
pub(crate) fn expand_tasks(targets: &[Arc<Target>], level: usize) -> Vec<FetchTask> {
    targets
        .iter()
        .enumerate()
        .flat_map(|(idx, target)| {
            (1..=level).map(move |attempt_seq| FetchTask {
                target: Arc::clone(target),
                target_index: idx + 1,
                attempt_seq,
                level,
            })
        })
        .collect()
}

/// Directory holding one level's artifacts: `<dataset dir>/concurrency_<level>`
pub(crate) fn level_dir(dataset_dir: &Path, level: usize) -> PathBuf {
    dataset_dir.join(format!("concurrency_{level}"))
}

/// Sweep the ladder in order over one dataset.
///
/// Level N+1 starts only after every attempt of level N has produced its record.
/// A level full of failures does not stop the sweep.
pub(crate) async fn run_sweep(
    ctx: &Arc<FetchContext>,
    dataset: &str,
    targets: Vec<Target>,
    ladder: &[usize],
    dataset_dir: &Path,
) -> RunReport {
    let targets: Vec<Arc<Target>> = targets.into_iter().map(Arc::new).collect();
    let mut report = RunReport {
        dataset: dataset.to_string(),
        records: Vec::with_capacity(targets.len() * ladder.iter().sum::<usize>()),
        levels: Vec::with_capacity(ladder.len()),
    };

    for &level in ladder {
        let tasks = expand_tasks(&targets, level);
        let dir = level_dir(dataset_dir, level);
        if let Err(e) = tokio::fs::create_dir_all(&dir).await {
            // Workers retry the directory per artifact; failures surface as faults there
            tracing::error!(path = %dir.display(), error = %e, "failed to create level directory");
        }

        tracing::info!(dataset, level, tasks = tasks.len(), "starting concurrency level");
        ctx.event_tx
            .send(Event::LevelStarted {
                level,
                tasks: tasks.len(),
            })
            .ok();

        let level_start = Instant::now();
        let first = report.records.len();
        execute_level(ctx, tasks, level, &dir, &mut report.records).await;

        let summary = summarize_level(level, &report.records[first..], level_start.elapsed());
        tracing::info!(
            dataset,
            level,
            tasks = summary.tasks,
            successes = summary.successes,
            soft_blocks = summary.soft_blocks,
            failures = summary.failures,
            wall_secs = %format!("{:.2}", summary.wall_seconds),
            "concurrency level complete"
        );
        ctx.event_tx
            .send(Event::LevelCompleted {
                summary: summary.clone(),
            })
            .ok();
        report.levels.push(summary);
    }

    report
}
