//! Outcome types for workers and pipeline runs

use serde::Serialize;
use std::fmt;

/// How processing one record ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerOutcome {
    /// A result line was appended
    Completed {
        /// Triples written for the record
        triples: usize,
        /// Attempt that succeeded (1-based)
        attempts: u32,
    },

    /// Every attempt failed; nothing was written
    Exhausted {
        /// Attempts made
        attempts: u32,
    },
}

impl WorkerOutcome {
    /// Whether a result line was written
    pub fn is_completed(&self) -> bool {
        matches!(self, WorkerOutcome::Completed { .. })
    }
}

/// Counters reported at the end of a pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Records in the dataset
    pub total: usize,

    /// Records skipped because the output already has them
    pub skipped_completed: usize,

    /// Records skipped because they belong to another shard
    pub skipped_other_shard: usize,

    /// Records dispatched to workers
    pub attempted: usize,

    /// Records that got a result line
    pub succeeded: usize,

    /// Records abandoned after exhausting their attempts
    pub exhausted: usize,

    /// Triples written during this run
    pub triples_written: usize,
}

impl RunSummary {
    /// Fold one worker outcome into the counters
    pub fn record(&mut self, outcome: WorkerOutcome) {
        match outcome {
            WorkerOutcome::Completed { triples, .. } => {
                self.succeeded += 1;
                self.triples_written += triples;
            }
            WorkerOutcome::Exhausted { .. } => self.exhausted += 1,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} attempted, {} succeeded, {} abandoned, {} already completed, {} triples written",
            self.attempted,
            self.succeeded,
            self.exhausted,
            self.skipped_completed,
            self.triples_written
        )
    }
}

/// Progress of an output file relative to its dataset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    /// Records in the dataset (or in the shard, if one is configured)
    pub total: usize,

    /// Records with a result line
    pub completed: usize,

    /// Records still to do
    pub remaining: usize,

    /// Triples persisted so far
    pub triples: usize,

    /// Unparsable lines in the output
    pub unparsable_lines: usize,
}
