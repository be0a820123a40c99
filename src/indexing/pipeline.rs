use crate::core::config::Config;
use crate::core::error::{Error, Result};
use crate::embedding::client::Embedder;
use crate::embedding::usage::UsageAccumulator;
use crate::indexing::chunker::{split_linear_lines, Chunk, ChunkConfig};
use crate::indexing::discovery::{is_supported_file, SourceRepository};
use crate::storage::output::{write_index, IndexedChunk};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Counters for one indexing run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexReport {
    /// Paths returned by the repository listing
    pub files_listed: usize,
    /// Supported files that were read and chunked
    pub files_indexed: usize,
    /// Paths rejected by the file filter
    pub files_skipped: usize,
    /// Supported files that could not be read
    pub files_failed: usize,
    pub chunks_embedded: usize,
    /// Chunks left out of the index because embedding failed
    pub chunks_failed: usize,
    pub usage: UsageAccumulator,
}

/// Index entries plus the counters that produced them
#[derive(Debug, Clone)]
pub struct IndexOutcome {
    pub chunks: Vec<IndexedChunk>,
    pub report: IndexReport,
}

/// Sequential file → chunk → embedding traversal of a repository
pub struct Indexer<R, E> {
    repository: R,
    embedder: E,
    chunk_config: ChunkConfig,
    /// Covers every attempt of one chunk, retries included
    call_timeout: Duration,
}

impl<R: SourceRepository, E: Embedder> Indexer<R, E> {
    pub fn new(repository: R, embedder: E, config: &Config) -> Self {
        Self {
            repository,
            embedder,
            chunk_config: ChunkConfig {
                max_chunk_characters: config.max_chunk_characters,
            },
            call_timeout: config.embed_call_budget(),
        }
    }

    /// Index the repository and write the result to `output_file`.
    ///
    /// Only a failed listing or a failed write is returned as an error;
    /// unreadable files and failed chunks are logged and counted.
    pub async fn run(&self, output_file: &Path) -> Result<IndexReport> {
        let outcome = self.index().await?;
        write_index(output_file, &outcome.chunks)?;

        info!(
            "Wrote {} chunks to {}",
            outcome.chunks.len(),
            output_file.display()
        );

        Ok(outcome.report)
    }

    /// Build the index in memory, in listing order then chunk order
    pub async fn index(&self) -> Result<IndexOutcome> {
        let files = self.repository.list_files()?;
        let mut report = IndexReport {
            files_listed: files.len(),
            ..IndexReport::default()
        };
        let mut chunks = Vec::new();

        for file in &files {
            if !is_supported_file(file) {
                report.files_skipped += 1;
                continue;
            }

            let content = match self.repository.read_file(file) {
                Ok(content) => content,
                Err(e) => {
                    warn!("Skipping '{}': {}", file, e);
                    report.files_failed += 1;
                    continue;
                }
            };

            for chunk in split_linear_lines(&content, &self.chunk_config) {
                if let Some(indexed) = self.embed_chunk(file, chunk, &mut report).await {
                    chunks.push(indexed);
                }
            }

            report.files_indexed += 1;
        }

        Ok(IndexOutcome { chunks, report })
    }

    async fn embed_chunk(
        &self,
        file: &str,
        chunk: Chunk,
        report: &mut IndexReport,
    ) -> Option<IndexedChunk> {
        info!(
            "Generating embedding for chunk '{}' {}:{}",
            file, chunk.start_position, chunk.end_position
        );

        let result = tokio::time::timeout(self.call_timeout, self.embedder.embed(&chunk.content))
            .await
            .unwrap_or_else(|_| Err(Error::Timeout(self.call_timeout)));

        match result {
            Ok(embedding) => {
                report.usage.record(&embedding.usage);
                report.chunks_embedded += 1;
                Some(IndexedChunk::new(file, chunk, embedding.vector))
            }
            Err(e) => {
                warn!(
                    "Failed to generate embedding for chunk '{}' {}:{}: {}",
                    file, chunk.start_position, chunk.end_position, e
                );
                report.chunks_failed += 1;
                None
            }
        }
    }
}
