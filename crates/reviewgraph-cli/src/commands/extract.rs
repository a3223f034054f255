//! Extract command implementation.

use super::{resolve_output, resolve_shard};
use crate::cli::{BackendKind, ExtractArgs};
use crate::config::Config;
use crate::error::Result;
use crate::output::{progress_bar, Formatter};
use indicatif::ProgressBar;
use reviewgraph_domain::CompletionBackend;
use reviewgraph_extractor::{ExtractorConfig, Pipeline, RunSummary};
use reviewgraph_gatekeeper::Gatekeeper;
use reviewgraph_llm::{OllamaBackend, OpenAiBackend};
use std::path::Path;
use tracing::info;

/// Execute the extract command.
pub async fn execute_extract(args: ExtractArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let backend_kind = args.backend.unwrap_or(config.backend);

    let mut extractor = config.extractor_for(backend_kind);
    if let Some(concurrency) = args.concurrency {
        extractor.concurrency = concurrency;
    }
    if let Some(max_attempts) = args.max_attempts {
        extractor.max_attempts = max_attempts;
    }
    extractor.shard = resolve_shard(&args.dataset, config);
    extractor.validate()?;

    let input = args.dataset.input.as_path();
    let output = resolve_output(&args.dataset, extractor.shard);
    let gatekeeper = Gatekeeper::new(config.validation.clone());
    let progress = progress_bar(!args.no_progress);

    let summary = match backend_kind {
        BackendKind::Local => {
            let endpoint = args.endpoint.unwrap_or_else(|| config.local.endpoint.clone());
            let model = args.model.unwrap_or_else(|| config.local.model.clone());
            let backend = OllamaBackend::new(endpoint, model)?;
            run(backend, gatekeeper, extractor, progress, input, &output).await?
        }
        BackendKind::Remote => {
            let endpoint = args.endpoint.unwrap_or_else(|| config.remote.endpoint.clone());
            let model = args.model.unwrap_or_else(|| config.remote.model.clone());
            let backend = OpenAiBackend::from_env(endpoint, model, &config.remote.api_key_env)?;
            run(backend, gatekeeper, extractor, progress, input, &output).await?
        }
    };

    println!("{}", formatter.run_summary(&summary, &output)?);
    Ok(())
}

async fn run<B>(
    backend: B,
    gatekeeper: Gatekeeper,
    extractor: ExtractorConfig,
    progress: ProgressBar,
    input: &Path,
    output: &Path,
) -> Result<RunSummary>
where
    B: CompletionBackend + 'static,
{
    info!(
        "Extracting {} -> {} with model {}",
        input.display(),
        output.display(),
        backend.model_name()
    );

    let pipeline = Pipeline::new(backend, gatekeeper, extractor).with_progress(progress);
    Ok(pipeline.run(input, output).await?)
}
