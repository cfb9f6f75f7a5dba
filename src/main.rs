mod cli;
mod config;
mod core;
mod error;
mod web;

use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::core::{
    FetchPipeline, HistoryStore, OpenAiCompletion, Storage, SummaryGenerator, TranscriptService,
    YtDlpChannelSource,
};
use crate::error::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_args(cli.data_dir, cli.services);

    let outcome = match cli.command {
        Commands::Fetch { channel, limit } => run_fetch(&config, &channel, limit).await,
        Commands::Summarize => run_summarize(&config).await,
        Commands::Serve { bind } => web::serve(Storage::new(&config.data_dir), &bind).await,
    };

    if let Err(e) = outcome {
        tracing::error!("An error occurred: {e}");
        std::process::exit(1);
    }
}

async fn run_fetch(config: &Config, channel: &str, limit: usize) -> Result<()> {
    let channels = YtDlpChannelSource::new(config);
    let transcripts = TranscriptService::new(config)?;
    let storage = Storage::new(&config.data_dir);
    let mut history = HistoryStore::load(&config.data_dir);

    FetchPipeline::new(
        &channels,
        &transcripts,
        &storage,
        &mut history,
        config.listing_padding,
    )
    .run(channel, limit)
    .await?;

    Ok(())
}

async fn run_summarize(config: &Config) -> Result<()> {
    let completion = OpenAiCompletion::new(config);
    let storage = Storage::new(&config.data_dir);

    let report = SummaryGenerator::new(&completion, &storage, config.summary_attempts)
        .run()
        .await?;

    tracing::info!(
        "Summarized {} videos ({} failed, {} already done, {} without transcript, {} bad ids)",
        report.summarized.len(),
        report.failed.len(),
        report.already_done,
        report.empty,
        report.rejected
    );
    Ok(())
}
