//! Status command implementation.

use super::{resolve_output, resolve_shard};
use crate::cli::StatusArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;

/// Execute the status command.
pub async fn execute_status(args: StatusArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let shard = resolve_shard(&args.dataset, config);
    let output = resolve_output(&args.dataset, shard);

    let report = reviewgraph_extractor::status(&args.dataset.input, &output, shard).await?;

    println!("{}", formatter.status(&report, &output)?);
    Ok(())
}
