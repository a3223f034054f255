//! Recover completed work from an existing output file

use crate::error::ExtractorError;
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

/// What a scan of the output file found
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckpointScan {
    /// Indices that already have a result line
    pub completed: HashSet<u64>,

    /// Non-blank lines read
    pub lines: usize,

    /// Lines that did not parse as JSON (torn writes)
    pub unparsable: usize,

    /// Triples persisted across all parsed lines
    pub triples: usize,
}

/// Scan the output file at `path`
///
/// A missing file is an empty scan. Lines are split on raw bytes so a torn
/// multi-byte character in the last line is skipped like any other bad line.
pub async fn scan_output(path: &Path) -> Result<CheckpointScan, ExtractorError> {
    let mut scan = CheckpointScan::default();

    let file = match File::open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(scan),
        Err(e) => return Err(e.into()),
    };

    let mut segments = BufReader::new(file).split(b'\n');
    while let Some(segment) = segments.next_segment().await? {
        if segment.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        scan.lines += 1;

        let record: Value = match serde_json::from_slice(&segment) {
            Ok(record) => record,
            Err(e) => {
                debug!("Skipping unparsable checkpoint line {}: {}", scan.lines, e);
                scan.unparsable += 1;
                continue;
            }
        };

        if let Some(idx) = record.get("idx").and_then(Value::as_u64) {
            scan.completed.insert(idx);
        }
        if let Some(triples) = record.get("triples").and_then(Value::as_array) {
            scan.triples += triples.len();
        }
    }

    if scan.unparsable > 0 {
        warn!(
            "{} unparsable line(s) in {}, those records will be retried",
            scan.unparsable,
            path.display()
        );
    }

    Ok(scan)
}

/// Indices already present in the output file at `path`
pub async fn completed_indices(path: &Path) -> Result<HashSet<u64>, ExtractorError> {
    Ok(scan_output(path).await?.completed)
}
