//! Pipeline coordinator: load, resume, fan out, shut down

use crate::checkpoint::{completed_indices, scan_output};
use crate::config::{ExtractorConfig, Shard};
use crate::error::ExtractorError;
use crate::loader::load_reviews;
use crate::prompt::PromptBuilder;
use crate::sink::ResultSink;
use crate::types::{RunSummary, StatusReport, WorkerOutcome};
use crate::worker::ExtractionWorker;
use indicatif::ProgressBar;
use reviewgraph_domain::{CompletionBackend, ReviewRecord};
use reviewgraph_gatekeeper::Gatekeeper;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tracing::{error, info, warn};

/// Drives a whole extraction run over one dataset
///
/// At most `concurrency` records are in flight at once. Records already in
/// the output file are skipped, so an interrupted run can simply be started
/// again with the same arguments.
pub struct Pipeline<B> {
    backend: Arc<B>,
    gatekeeper: Arc<Gatekeeper>,
    config: ExtractorConfig,
    progress: ProgressBar,
}

impl<B> Pipeline<B>
where
    B: CompletionBackend + 'static,
{
    /// Create a new pipeline
    pub fn new(backend: B, gatekeeper: Gatekeeper, config: ExtractorConfig) -> Self {
        Self {
            backend: Arc::new(backend),
            gatekeeper: Arc::new(gatekeeper),
            config,
            progress: ProgressBar::hidden(),
        }
    }

    /// Report per-record progress on `progress`
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// The backend used for completions
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Process every pending record of `source`, appending results to `output`
    ///
    /// Returns an error only for run-level failures (bad configuration,
    /// malformed dataset, unusable output file). Records that exhaust their
    /// attempts are counted in the summary and left for the next run.
    pub async fn run(&self, source: &Path, output: &Path) -> Result<RunSummary, ExtractorError> {
        self.config.validate()?;

        let records = load_reviews(source).await?;
        let completed = completed_indices(output).await?;

        let mut summary = RunSummary {
            total: records.len(),
            ..RunSummary::default()
        };
        let pending = select_pending(records, &completed, self.config.shard, &mut summary);

        info!(
            "{} reviews total, {} already completed, {} to process with {} (concurrency {})",
            summary.total,
            summary.skipped_completed,
            pending.len(),
            self.backend.model_name(),
            self.config.concurrency
        );

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let sink = Arc::new(ResultSink::open(output).await?);

        let worker = Arc::new(ExtractionWorker::new(
            Arc::clone(&self.backend),
            Arc::clone(&self.gatekeeper),
            PromptBuilder::from_config(&self.config),
            sink,
            self.config.max_attempts,
            self.config.retry_backoff(),
        ));

        self.progress.set_length(pending.len() as u64);
        summary.attempted = pending.len();

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency));
        let mut tasks = JoinSet::new();

        for record in pending {
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|e| ExtractorError::Concurrency(e.to_string()))?;

            while let Some(joined) = tasks.try_join_next() {
                self.finish(joined, &mut summary);
            }

            let worker = Arc::clone(&worker);
            tasks.spawn(async move {
                let outcome = worker.process(&record).await;
                drop(permit);
                outcome
            });
        }

        while let Some(joined) = tasks.join_next().await {
            self.finish(joined, &mut summary);
        }
        self.progress.finish();

        if let Err(e) = self.backend.shutdown().await {
            warn!("Backend shutdown failed: {}", e);
        }

        info!("Run complete: {}", summary);
        Ok(summary)
    }

    fn finish(
        &self,
        joined: Result<WorkerOutcome, JoinError>,
        summary: &mut RunSummary,
    ) {
        match joined {
            Ok(outcome) => summary.record(outcome),
            Err(e) => {
                error!("Worker task failed: {}", e);
                summary.exhausted += 1;
            }
        }
        self.progress.inc(1);
    }
}

fn select_pending(
    records: Vec<ReviewRecord>,
    completed: &HashSet<u64>,
    shard: Option<Shard>,
    summary: &mut RunSummary,
) -> Vec<ReviewRecord> {
    let mut pending = Vec::with_capacity(records.len());
    for record in records {
        if shard.is_some_and(|s| !s.includes(record.index)) {
            summary.skipped_other_shard += 1;
        } else if completed.contains(&record.index) {
            summary.skipped_completed += 1;
        } else {
            pending.push(record);
        }
    }
    pending
}

/// Compare the output file at `output` against the dataset at `source`
pub async fn status(
    source: &Path,
    output: &Path,
    shard: Option<Shard>,
) -> Result<StatusReport, ExtractorError> {
    if let Some(shard) = &shard {
        shard.validate()?;
    }

    let records = load_reviews(source).await?;
    let scan = scan_output(output).await?;

    let in_scope: Vec<u64> = records
        .iter()
        .map(|r| r.index)
        .filter(|&index| shard.map_or(true, |s| s.includes(index)))
        .collect();
    let completed = in_scope
        .iter()
        .filter(|index| scan.completed.contains(index))
        .count();

    Ok(StatusReport {
        total: in_scope.len(),
        completed,
        remaining: in_scope.len() - completed,
        triples: scan.triples,
        unparsable_lines: scan.unparsable,
    })
}
