//! Reviewgraph CLI - Extract knowledge-graph triples from product reviews.

use clap::Parser;
use reviewgraph_cli::commands;
use reviewgraph_cli::{Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Log to stderr so stdout only carries the summary
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> reviewgraph_cli::Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let formatter = Formatter::new(cli.format, !cli.no_color);

    match cli.command {
        Command::Extract(args) => commands::execute_extract(args, &config, &formatter).await?,
        Command::Status(args) => commands::execute_status(args, &config, &formatter).await?,
    }

    Ok(())
}
