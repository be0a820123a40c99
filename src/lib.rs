// Core functionality
pub mod core {
    pub mod config;
    pub mod error;
}

// Embedding service
pub mod embedding {
    pub mod client;
    pub mod usage;
}

// Indexing pipeline
pub mod indexing {
    pub mod chunker;
    pub mod discovery;
    pub mod pipeline;
}

// Index artifact
pub mod storage {
    pub mod output;
}

// User interfaces
pub mod ui {
    pub mod cli;
}

// Re-export commonly used types
pub use crate::core::config::Config;
pub use crate::core::error::{Error, Result};
pub use crate::embedding::client::{Embedder, Embedding, OpenAiEmbedder};
pub use crate::embedding::usage::{Usage, UsageAccumulator};
pub use crate::indexing::chunker::{split_linear_lines, Chunk, ChunkConfig};
pub use crate::indexing::discovery::{is_supported_file, GitRepository, SourceRepository};
pub use crate::indexing::pipeline::{IndexOutcome, IndexReport, Indexer};
pub use crate::storage::output::{read_index, write_index, IndexedChunk};
pub use crate::ui::cli::Cli;
