use anyhow::Context;
use clap::Parser;
use repo2vec::{Cli, GitRepository, IndexReport, Indexer, OpenAiEmbedder};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.to_config();
    config.validate()?;

    let repository = GitRepository::new(&config.repository_path);
    let embedder = OpenAiEmbedder::new(&config).context("Failed to create embedding client")?;
    let indexer = Indexer::new(repository, embedder, &config);

    let report = indexer
        .run(&config.output_file)
        .await
        .with_context(|| format!("Indexing {} failed", config.repository_path.display()))?;

    print_report(&report);

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_report(report: &IndexReport) {
    println!();
    println!("Indexing complete!");
    println!("  Files indexed: {}", report.files_indexed);
    println!("  Chunks embedded: {}", report.chunks_embedded);
    if report.files_failed > 0 {
        println!("  Unreadable files: {}", report.files_failed);
    }
    if report.chunks_failed > 0 {
        println!("  Failed chunks: {}", report.chunks_failed);
    }
    println!();
    println!("Tokens used: {}", report.usage.total_tokens);
    println!("Cost: {} USD", report.usage.estimated_cost_usd());
}
