//! Fetch worker -- runs one attempt and always turns it into exactly one record.

use std::path::Path;
use std::time::{Duration, Instant};

use crate::error::FetchError;
use crate::provider::RawResponse;
use crate::types::{AttemptRecord, Classification, Event, FetchTask};
use crate::utils::excerpt;

use super::context::FetchContext;

/// Run one attempt: request, classify, persist, record.
///
/// Never fails. Every fault is folded into the returned record, with the full detail
/// appended to the diagnostic log.
pub(crate) async fn run_fetch_task(
    ctx: &FetchContext,
    task: &FetchTask,
    level_dir: &Path,
) -> AttemptRecord {
    let request = ctx.adapter.build_request(&task.target.url);
    let request_context = request.context.clone();

    let started = Instant::now();
    let response = ctx.transport.send(request).await;
    let elapsed = started.elapsed();

    let record = match response {
        Err(fault) => record_fault(ctx, task, fault, elapsed, request_context.as_deref()).await,
        Ok(response) if !ctx.adapter.is_success_status(&response) => {
            record_non_success(ctx, task, &response, elapsed, request_context.as_deref()).await
        }
        Ok(response) => persist_and_classify(ctx, task, response, started, elapsed, level_dir).await,
    };

    ctx.event_tx
        .send(Event::TaskCompleted {
            record: record.clone(),
        })
        .ok();
    record
}

/// The provider answered, but not with success
async fn record_non_success(
    ctx: &FetchContext,
    task: &FetchTask,
    response: &RawResponse,
    elapsed: Duration,
    request_context: Option<&str>,
) -> AttemptRecord {
    let detail = ctx
        .adapter
        .extract_error_detail(response, ctx.sweep.log_excerpt_chars);

    tracing::warn!(
        url = %task.target.url,
        status = response.status,
        level = task.level,
        elapsed_secs = %format!("{:.2}", elapsed.as_secs_f64()),
        "non-success response"
    );
    ctx.diagnostics
        .append(&format!(
            "non-success status {}, URL: {} #{}{}, response: {}",
            response.status,
            task.target.url,
            task.attempt_seq,
            context_suffix(request_context),
            detail
        ))
        .await;

    AttemptRecord::new(
        task,
        Classification::NonSuccess,
        elapsed,
        String::new(),
        format!("HTTP {}", response.status),
        0,
    )
}

/// The attempt died in transport or while persisting
async fn record_fault(
    ctx: &FetchContext,
    task: &FetchTask,
    fault: FetchError,
    elapsed: Duration,
    request_context: Option<&str>,
) -> AttemptRecord {
    let detail = fault.to_string();

    tracing::warn!(
        url = %task.target.url,
        kind = fault.kind(),
        level = task.level,
        error = %detail,
        "fetch attempt failed"
    );
    ctx.diagnostics
        .append(&format!(
            "request fault {}: {}, URL: {} #{}{}",
            fault.kind(),
            excerpt(&detail, ctx.sweep.log_excerpt_chars),
            task.target.url,
            task.attempt_seq,
            context_suffix(request_context)
        ))
        .await;

    AttemptRecord::new(
        task,
        Classification::Fault,
        elapsed,
        String::new(),
        fault.note(),
        0,
    )
}

/// Success status: write the body, then let its size decide between unlocked and soft block
async fn persist_and_classify(
    ctx: &FetchContext,
    task: &FetchTask,
    response: RawResponse,
    started: Instant,
    elapsed: Duration,
    level_dir: &Path,
) -> AttemptRecord {
    let name = task.artifact_name();
    let path = level_dir.join(&name);

    let size = match write_artifact(&path, &response.body).await {
        Ok(size) => size,
        Err(source) => {
            // No partial artifact may outlive a failed write
            discard_artifact(&path).await;
            let fault = FetchError::Artifact { path, source };
            return record_fault(ctx, task, fault, started.elapsed(), None).await;
        }
    };

    if size >= ctx.sweep.min_success_bytes {
        tracing::debug!(
            url = %task.target.url,
            artifact = %name,
            size_kb = %format!("{:.2}", size as f64 / 1024.0),
            elapsed_secs = %format!("{:.2}", elapsed.as_secs_f64()),
            "unlocked"
        );
        return AttemptRecord::new(task, Classification::Unlocked, elapsed, name, String::new(), size);
    }

    tracing::warn!(
        url = %task.target.url,
        size_bytes = size,
        threshold = ctx.sweep.min_success_bytes,
        "soft block: success status with undersized body"
    );
    if !ctx.sweep.keep_soft_block_artifacts
        && let Err(e) = tokio::fs::remove_file(&path).await
    {
        tracing::warn!(path = %path.display(), error = %e, "failed to remove soft-block artifact");
    }

    AttemptRecord::new(
        task,
        Classification::SoftBlock,
        elapsed,
        String::new(),
        String::new(),
        size,
    )
}

/// Write the artifact and return its size on disk
async fn write_artifact(path: &Path, body: &[u8]) -> std::io::Result<u64> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, body).await?;
    Ok(tokio::fs::metadata(path).await?.len())
}

/// Best-effort removal of whatever a failed write left at `path`
async fn discard_artifact(path: &Path) {
    let is_file = tokio::fs::symlink_metadata(path)
        .await
        .is_ok_and(|meta| meta.is_file());
    if is_file && let Err(e) = tokio::fs::remove_file(path).await {
        tracing::warn!(path = %path.display(), error = %e, "failed to remove partial artifact");
    }
}

fn context_suffix(context: Option<&str>) -> String {
    context.map(|c| format!(", {c}")).unwrap_or_default()
}
