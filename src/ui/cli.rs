use crate::core::config::{Config, DEFAULT_API_BASE_URL};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// repo2vec - Semantic embedding index for git repositories
#[derive(Parser, Debug)]
#[command(name = "repo2vec")]
#[command(
    about = "Build a semantic embedding index over the tracked files of a git repository",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Git repository path
    #[arg(long)]
    pub repository_path: PathBuf,

    /// Name of the output file
    #[arg(long)]
    pub output_file: PathBuf,

    /// OpenAI API key
    #[arg(long, env = "OPEN_AI_API_KEY", hide_env_values = true)]
    pub open_ai_api_key: String,

    /// Base URL of the embedding API
    #[arg(long, env = "OPEN_AI_API_BASE_URL", default_value = DEFAULT_API_BASE_URL)]
    pub api_base_url: String,

    /// Timeout for a single embedding request, in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Retries for transient embedding failures
    #[arg(long, default_value_t = 2)]
    pub max_retries: u32,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Build the run configuration from parsed arguments
    pub fn to_config(&self) -> Config {
        let mut config = Config::new(
            self.repository_path.clone(),
            self.output_file.clone(),
            self.open_ai_api_key.clone(),
        );
        config.api_base_url = self.api_base_url.clone();
        config.request_timeout = Duration::from_secs(self.timeout_secs);
        config.max_retries = self.max_retries;
        config
    }
}
