//! Command implementations.

pub mod extract;
pub mod status;

pub use self::extract::execute_extract;
pub use self::status::execute_status;

use crate::cli::DatasetArgs;
use crate::config::Config;
use reviewgraph_extractor::{default_output_path, Shard};
use std::path::PathBuf;

/// Shard selected on the command line, falling back to the config file.
fn resolve_shard(dataset: &DatasetArgs, config: &Config) -> Option<Shard> {
    match (dataset.num_splits, dataset.split_id) {
        (Some(count), Some(id)) => Some(Shard { count, id }),
        _ => config.extractor.as_ref().and_then(|e| e.shard),
    }
}

/// Output path given on the command line, or the one derived from the input.
fn resolve_output(dataset: &DatasetArgs, shard: Option<Shard>) -> PathBuf {
    dataset
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&dataset.input, shard))
}
