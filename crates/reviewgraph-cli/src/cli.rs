//! CLI command definitions and argument parsing.

use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Reviewgraph - Extract knowledge-graph triples from product reviews.
#[derive(Debug, Parser)]
#[command(name = "reviewgraph")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format for summaries
    #[arg(short, long, value_enum, global = true, default_value = "text")]
    pub format: CliFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path (defaults to ~/.reviewgraph/config.toml)
    #[arg(short, long, global = true, env = "REVIEWGRAPH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Human-readable text (default)
    Text,
    /// JSON object
    Json,
}

/// Which completion backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Local Ollama server
    #[default]
    Local,
    /// Remote OpenAI-compatible service
    Remote,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract triples from every pending review
    Extract(ExtractArgs),

    /// Show how far an output file has progressed
    Status(StatusArgs),
}

/// Dataset and output file selection shared by all commands.
#[derive(Debug, Args)]
pub struct DatasetArgs {
    /// Review dataset (JSON array of users with review profiles)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output JSON-Lines file (defaults to <input dir>/output/<stem>_output.jsonl)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Split the dataset round-robin into this many shards
    #[arg(long, requires = "split_id")]
    pub num_splits: Option<u64>,

    /// Shard handled by this run, in 0..num_splits
    #[arg(long, requires = "num_splits")]
    pub split_id: Option<u64>,
}

/// Arguments for the extract command.
#[derive(Debug, Args)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,

    /// Completion backend
    #[arg(short, long, value_enum)]
    pub backend: Option<BackendKind>,

    /// Model name
    #[arg(short, long)]
    pub model: Option<String>,

    /// Backend endpoint URL
    #[arg(short, long)]
    pub endpoint: Option<String>,

    /// Maximum number of reviews in flight
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,

    /// Attempts per review before it is abandoned
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

/// Arguments for the status command.
#[derive(Debug, Args)]
pub struct StatusArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,
}
