//! counterscope
//!
//! Checkpointed batch job that classifies discussion threads into
//! hate / counter-hate / neutral speech via an LLM backend, emitting
//! one output record per hate-rooted thread. Re-invoking after a crash
//! resumes from the last committed batch.

use anyhow::{Context, Result};
use clap::Parser;
use counterscope_backend::{build_backend, ClassifierClient};
use counterscope_core::AppConfig;
use counterscope_pipeline::{read_jsonl, BatchAnalyzer};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "counterscope")]
#[command(about = "Classify discussion threads for hate and counter-hate speech", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "counterscope.yaml")]
    config: PathBuf,

    /// Comments JSONL path
    #[arg(long)]
    comments: Option<PathBuf>,

    /// Replies JSONL path
    #[arg(long)]
    replies: Option<PathBuf>,

    /// Output log path (appended)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Checkpoint file path
    #[arg(long)]
    checkpoint: Option<PathBuf>,

    /// Root comments per batch
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Concurrent units of work per batch
    #[arg(short, long)]
    workers: Option<usize>,

    /// Backend provider (openai or gemini)
    #[arg(long)]
    backend: Option<String>,

    /// Model identifier
    #[arg(short, long)]
    model: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration
    fn apply_overrides(&self, config: &mut AppConfig) -> Result<()> {
        if let Some(backend) = &self.backend {
            config.backend.provider = backend.parse()?;
        }
        if let Some(model) = &self.model {
            config.backend.model = model.clone();
        }
        if let Some(comments) = &self.comments {
            config.job.comments_path = comments.clone();
        }
        if let Some(replies) = &self.replies {
            config.job.replies_path = replies.clone();
        }
        if let Some(output) = &self.output {
            config.job.output_path = output.clone();
        }
        if let Some(checkpoint) = &self.checkpoint {
            config.job.checkpoint_path = checkpoint.clone();
        }
        if let Some(batch_size) = self.batch_size {
            config.job.batch_size = batch_size;
        }
        if let Some(workers) = self.workers {
            config.job.workers = workers;
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = AppConfig::load(&cli.config)?;
    cli.apply_overrides(&mut config)?;
    config.backend.resolve_api_key()?;

    info!(
        provider = ?config.backend.provider,
        model = %config.backend.model,
        batch_size = config.job.batch_size,
        workers = config.job.workers,
        "configuration loaded"
    );

    let comments = read_jsonl(&config.job.comments_path)
        .with_context(|| format!("loading {}", config.job.comments_path.display()))?;
    let replies = read_jsonl(&config.job.replies_path)
        .with_context(|| format!("loading {}", config.job.replies_path.display()))?;

    let backend = build_backend(&config.backend)?;
    let client = ClassifierClient::new(backend, config.backend.retry);

    let analyzer = BatchAnalyzer::new(comments, replies, client, &config.job);
    let summary = analyzer.process().await?;

    info!(
        total = summary.total_roots,
        resumed_from = summary.resumed_from,
        emitted = summary.emitted,
        "job complete"
    );
    println!(
        "Processed {} root comments (resumed from index {}), emitted {} hate-rooted records",
        summary.total_roots, summary.resumed_from, summary.emitted
    );

    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("counterscope=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("counterscope=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
