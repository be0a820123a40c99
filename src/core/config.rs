use super::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Maximum characters per chunk handed to the embedding model
pub const MAX_CHUNK_CHARACTERS: usize = 150;

/// Embedding model requested from the API
pub const EMBEDDING_MODEL: &str = "text-embedding-ada-002";

/// Price of the embedding model per 1000 tokens, in USD
pub const COST_PER_1K_TOKENS_USD: f64 = 0.0004;

/// Default API host
pub const DEFAULT_API_BASE_URL: &str = "https://api.openai.com";

/// Configuration for a single indexing run
#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the git repository to index
    pub repository_path: PathBuf,
    /// Where the JSON index is written
    pub output_file: PathBuf,
    /// Bearer token for the embedding API
    pub api_key: String,
    /// Base URL of the embedding API (no trailing `/v1`)
    pub api_base_url: String,
    /// Upper bound for a single embedding request attempt
    pub request_timeout: Duration,
    /// Extra attempts for transient embedding failures
    pub max_retries: u32,
    /// First retry delay; doubled on every further attempt
    pub retry_backoff: Duration,
    /// Chunk size limit
    pub max_chunk_characters: usize,
}

impl Config {
    /// Create a configuration with default tuning values
    pub fn new(repository_path: PathBuf, output_file: PathBuf, api_key: String) -> Self {
        Self {
            repository_path,
            output_file,
            api_key,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            max_retries: 2,
            retry_backoff: Duration::from_millis(500),
            max_chunk_characters: MAX_CHUNK_CHARACTERS,
        }
    }

    /// Check the inputs before any work is done
    pub fn validate(&self) -> Result<()> {
        if !self.repository_path.exists() {
            return Err(Error::Config(format!(
                "Repository path does not exist: {}",
                self.repository_path.display()
            )));
        }

        if !self.repository_path.is_dir() {
            return Err(Error::Config(format!(
                "Repository path is not a directory: {}",
                self.repository_path.display()
            )));
        }

        if self.api_key.trim().is_empty() {
            return Err(Error::Config("API key must not be empty".to_string()));
        }

        if self.request_timeout.is_zero() {
            return Err(Error::Config(
                "Request timeout must be greater than zero".to_string(),
            ));
        }

        let output_dir = self
            .output_file
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        if !output_dir.is_dir() {
            return Err(Error::Config(format!(
                "Output directory does not exist: {}",
                output_dir.display()
            )));
        }

        if self.max_chunk_characters == 0 {
            return Err(Error::Config(
                "Maximum chunk size must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Upper bound for one embedding call including every retry and backoff
    pub fn embed_call_budget(&self) -> Duration {
        let attempts = self
            .request_timeout
            .saturating_mul(self.max_retries.saturating_add(1));
        let backoff = (0..self.max_retries).fold(Duration::ZERO, |total, attempt| {
            total.saturating_add(self.retry_backoff.saturating_mul(2u32.saturating_pow(attempt)))
        });
        attempts.saturating_add(backoff)
    }
}
