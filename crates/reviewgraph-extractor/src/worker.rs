//! Per-record extraction with bounded retries

use crate::error::AttemptError;
use crate::parser::parse_envelope;
use crate::prompt::PromptBuilder;
use crate::sink::ResultSink;
use crate::types::WorkerOutcome;
use reviewgraph_domain::{CompletionBackend, CompletionRequest, ExtractionResult, ReviewRecord};
use reviewgraph_gatekeeper::Gatekeeper;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Processes one record at a time: call the backend, parse, validate, append
///
/// Attempts for the same record run strictly one after another. No error
/// escapes [`ExtractionWorker::process`]; a record that keeps failing is
/// abandoned and left for the next run.
pub struct ExtractionWorker<B> {
    backend: Arc<B>,
    gatekeeper: Arc<Gatekeeper>,
    prompt: PromptBuilder,
    sink: Arc<ResultSink>,
    max_attempts: u32,
    backoff: Duration,
}

impl<B> ExtractionWorker<B>
where
    B: CompletionBackend,
{
    /// Create a new worker
    pub fn new(
        backend: Arc<B>,
        gatekeeper: Arc<Gatekeeper>,
        prompt: PromptBuilder,
        sink: Arc<ResultSink>,
        max_attempts: u32,
        backoff: Duration,
    ) -> Self {
        Self {
            backend,
            gatekeeper,
            prompt,
            sink,
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Process `record` until one attempt succeeds or all attempts fail
    pub async fn process(&self, record: &ReviewRecord) -> WorkerOutcome {
        let request = self.prompt.build(record);
        debug!(
            "Review {} | product {} | rating {}",
            record.index, record.product_id, record.rating
        );

        for attempt in 1..=self.max_attempts {
            match self.attempt(record, &request).await {
                Ok(triples) => {
                    debug!(
                        "Review {}: wrote {} triple(s) on attempt {}",
                        record.index, triples, attempt
                    );
                    return WorkerOutcome::Completed {
                        triples,
                        attempts: attempt,
                    };
                }
                Err(e) => {
                    warn!("Review {}: attempt {} failed: {}", record.index, attempt, e);
                    if attempt < self.max_attempts {
                        tokio::time::sleep(self.backoff).await;
                    }
                }
            }
        }

        error!(
            "Failed to get valid output for review {} after {} attempts",
            record.index, self.max_attempts
        );
        WorkerOutcome::Exhausted {
            attempts: self.max_attempts,
        }
    }

    /// One backend round trip; returns the number of triples written
    async fn attempt(
        &self,
        record: &ReviewRecord,
        request: &CompletionRequest,
    ) -> Result<usize, AttemptError> {
        let completion = self
            .backend
            .complete(request)
            .await
            .map_err(|e| AttemptError::Backend(e.to_string()))?;

        let raw_triples = parse_envelope(&completion)?;

        let report = self
            .gatekeeper
            .review(&raw_triples, &record.text, record.title_text());
        if report.repaired > 0 || !report.rejections.is_empty() {
            debug!(
                "Review {}: {} repaired, {} rejected",
                record.index,
                report.repaired,
                report.rejections.len()
            );
        }

        let count = report.triples.len();
        let result = ExtractionResult::new(record.clone(), report.triples);
        self.sink
            .append(&result)
            .await
            .map_err(|e| AttemptError::Io(e.to_string()))?;

        Ok(count)
    }
}
