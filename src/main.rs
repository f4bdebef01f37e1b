//! CLI for the packaging-review workflow:
//! brief (.txt) -> extract -> risk -> packet -> per-run output folder.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use packreview::config::Config;
use packreview::load_env;
use packreview::run::run_review;

#[derive(Parser)]
#[command(name = "packreview")]
#[command(about = "Packaging review: brief -> extract -> risk -> packet")]
struct Cli {
    /// Path to the brief .txt file
    #[arg(long)]
    input: PathBuf,

    /// Output folder (defaults to the configured base dir)
    #[arg(long)]
    out: Option<PathBuf>,

    /// Skip the LLM and review the built-in demo brief
    #[arg(long)]
    demo: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    load_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("packreview=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    info!(
        "Starting review run (provider={}, demo={})",
        config.llm.provider, cli.demo
    );

    let out_base = cli
        .out
        .unwrap_or_else(|| PathBuf::from(&config.output.base_dir));
    let outcome = run_review(&config, &cli.input, &out_base, cli.demo).await?;

    if cli.demo {
        println!("(Demo mode: no LLM; used built-in brief)");
    }
    println!("Run ID: {}", outcome.run_id);
    println!("Risk level: {}", outcome.risk_level.as_str());
    println!("Output folder: {}", outcome.out_dir.display());
    Ok(())
}
