use crate::core::error::{Error, Result};
use crate::indexing::chunker::Chunk;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// One chunk of the index together with its embedding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedChunk {
    /// Repository-relative path
    pub file: String,
    pub content: String,
    pub start_position: usize,
    pub end_position: usize,
    pub embedding: Vec<f32>,
}

impl IndexedChunk {
    pub fn new(file: &str, chunk: Chunk, embedding: Vec<f32>) -> Self {
        Self {
            file: file.to_string(),
            content: chunk.content,
            start_position: chunk.start_position,
            end_position: chunk.end_position,
            embedding,
        }
    }
}

/// Write the whole index as one JSON array.
///
/// The document goes to a uniquely named temporary file next to `path`
/// and is renamed over it, so readers never see a partially written index
/// and concurrent runs never share a temporary file.
pub fn write_index(path: &Path, chunks: &[IndexedChunk]) -> Result<()> {
    let json = serde_json::to_vec(chunks)?;
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut temp_file = NamedTempFile::new_in(dir).map_err(|e| {
        Error::Output(format!("Failed to create temporary file in {}: {}", dir.display(), e))
    })?;

    temp_file
        .write_all(&json)
        .and_then(|_| temp_file.as_file().sync_all())
        .map_err(|e| Error::Output(format!("Failed to write index: {}", e)))?;

    temp_file.persist(path).map_err(|e| {
        Error::Output(format!("Failed to move index into {}: {}", path.display(), e.error))
    })?;

    Ok(())
}

/// Read an index written by [`write_index`]
pub fn read_index(path: &Path) -> Result<Vec<IndexedChunk>> {
    let json = std::fs::read(path)?;
    Ok(serde_json::from_slice(&json)?)
}
