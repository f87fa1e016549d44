//! Dataset iteration: one sweep and one report per configured target list.

use std::path::Path;
use std::sync::Arc;

use super::Benchmark;
use super::context::FetchContext;
use super::sweep::run_sweep;
use crate::diagnostics::DiagnosticLog;
use crate::error::{Error, Result};
use crate::report::{REPORT_FILE, RunReport, write_report};
use crate::targets::load_targets;
use crate::types::Event;
use crate::utils::dataset_name;

impl Benchmark {
    /// Benchmark every configured dataset, in order
    ///
    /// A dataset that is missing or unreadable is skipped with a warning and a
    /// [`Event::DatasetSkipped`]; the remaining datasets still run. Only failing to create
    /// the run root aborts the whole run.
    pub async fn run_all(&self) -> Result<Vec<RunReport>> {
        let run_root = self.run_root();
        tokio::fs::create_dir_all(&run_root).await.map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to create output directory '{}': {}",
                    run_root.display(),
                    e
                ),
            ))
        })?;

        let mut reports = Vec::with_capacity(self.config.datasets.len());
        for path in &self.config.datasets {
            match self.run_dataset(path).await {
                Ok(report) => reports.push(report),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping dataset");
                    self.event_tx
                        .send(Event::DatasetSkipped {
                            path: path.clone(),
                            reason: e.to_string(),
                        })
                        .ok();
                }
            }
        }

        tracing::info!(
            provider = self.adapter.name(),
            datasets = reports.len(),
            skipped = self.config.datasets.len() - reports.len(),
            "Benchmark run complete"
        );
        Ok(reports)
    }

    /// Benchmark one dataset across the whole ladder and write its report
    ///
    /// Artifacts, `error.log` and `global_results.csv` all land under
    /// `<run root>/<dataset name>/`. The report is written once, after the last level.
    pub async fn run_dataset(&self, path: &Path) -> Result<RunReport> {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(Error::DatasetNotFound(path.to_path_buf()));
        }

        let targets = load_targets(path, &self.config.input).await?;
        let dataset = dataset_name(path);
        let dataset_dir = self.run_root().join(&dataset);
        tokio::fs::create_dir_all(&dataset_dir).await?;

        if targets.is_empty() {
            tracing::warn!(dataset = %dataset, "dataset has no targets");
        }
        tracing::info!(
            dataset = %dataset,
            targets = targets.len(),
            provider = self.adapter.name(),
            "starting dataset"
        );
        self.event_tx
            .send(Event::DatasetStarted {
                dataset: dataset.clone(),
                targets: targets.len(),
            })
            .ok();

        let ctx = Arc::new(FetchContext {
            adapter: Arc::clone(&self.adapter),
            transport: Arc::clone(&self.transport),
            diagnostics: Arc::new(DiagnosticLog::new(&dataset_dir)),
            sweep: Arc::new(self.config.sweep.clone()),
            event_tx: self.event_tx.clone(),
        });

        let report = run_sweep(
            &ctx,
            &dataset,
            targets,
            &self.config.sweep.ladder,
            &dataset_dir,
        )
        .await;

        let report_path = dataset_dir.join(REPORT_FILE);
        let rows = write_report(&report.records, &report_path)?;
        tracing::info!(path = %report_path.display(), rows, "report written");
        self.event_tx
            .send(Event::ReportWritten {
                path: report_path,
                rows,
            })
            .ok();

        Ok(report)
    }
}
