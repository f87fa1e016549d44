//! Bounded fetch pool -- runs one level's attempts with at most `limit` in flight.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};

use crate::error::FetchError;
use crate::types::{AttemptRecord, Classification, Event, FetchTask};

use super::context::FetchContext;
use super::worker::run_fetch_task;

/// Run every task, appending exactly one record per task to `results`.
///
/// At most `limit` attempts are in flight at once; admission is unordered. Each attempt
/// runs as its own tokio task, so a panicking worker is isolated and still yields a
/// failure record. Returns once every task has produced its record.
pub(crate) async fn execute_level(
    ctx: &Arc<FetchContext>,
    tasks: Vec<FetchTask>,
    limit: usize,
    level_dir: &Path,
    results: &mut Vec<AttemptRecord>,
) -> usize {
    let mut completed = stream::iter(tasks)
        .map(|task| {
            let ctx = Arc::clone(ctx);
            let level_dir = level_dir.to_path_buf();
            async move { run_isolated(ctx, task, level_dir).await }
        })
        .buffer_unordered(limit.max(1));

    let mut count = 0;
    while let Some(record) = completed.next().await {
        results.push(record);
        count += 1;
    }
    count
}

async fn run_isolated(
    ctx: Arc<FetchContext>,
    task: FetchTask,
    level_dir: std::path::PathBuf,
) -> AttemptRecord {
    let started = Instant::now();
    let handle = {
        let ctx = Arc::clone(&ctx);
        let task = task.clone();
        tokio::spawn(async move { run_fetch_task(&ctx, &task, &level_dir).await })
    };

    match handle.await {
        Ok(record) => record,
        Err(join_error) => {
            let fault = FetchError::Panicked(join_error.to_string());
            tracing::error!(
                url = %task.target.url,
                level = task.level,
                error = %fault,
                "fetch worker panicked"
            );
            ctx.diagnostics
                .append(&format!(
                    "worker panic: {}, URL: {} #{}",
                    fault, task.target.url, task.attempt_seq
                ))
                .await;

            let record = AttemptRecord::new(
                &task,
                Classification::Fault,
                started.elapsed(),
                String::new(),
                fault.note(),
                0,
            );
            ctx.event_tx
                .send(Event::TaskCompleted {
                    record: record.clone(),
                })
                .ok();
            record
        }
    }
}
