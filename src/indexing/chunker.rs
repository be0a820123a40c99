use crate::core::config::MAX_CHUNK_CHARACTERS;
use serde::{Deserialize, Serialize};

const LINE_SEPARATOR: char = '\n';
const SEPARATOR_LEN: usize = 1;

/// A line-aligned slice of a file.
///
/// Positions are character offsets into the file content; `end_position`
/// is exclusive and never includes the separator that follows the last line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    pub content: String,
    pub start_position: usize,
    pub end_position: usize,
}

/// Chunking configuration
#[derive(Debug, Clone, Copy)]
pub struct ChunkConfig {
    /// Upper bound for multi-line chunks. A single line longer than this
    /// still becomes one chunk; lines are never cut.
    pub max_chunk_characters: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            max_chunk_characters: MAX_CHUNK_CHARACTERS,
        }
    }
}

/// Lines gathered for the chunk currently being built
struct Segment {
    text: String,
    characters: usize,
    start_position: usize,
    end_position: usize,
}

impl Segment {
    fn start(line: &str, line_chars: usize, start_position: usize) -> Self {
        Self {
            text: line.to_string(),
            characters: line_chars,
            start_position,
            end_position: start_position + line_chars,
        }
    }

    fn fits(&self, line_chars: usize, max_chunk_characters: usize) -> bool {
        self.characters + SEPARATOR_LEN + line_chars <= max_chunk_characters
    }

    fn push(&mut self, line: &str, line_chars: usize, end_position: usize) {
        self.text.push(LINE_SEPARATOR);
        self.text.push_str(line);
        self.characters += SEPARATOR_LEN + line_chars;
        self.end_position = end_position;
    }

    fn into_chunk(self) -> Chunk {
        Chunk {
            content: self.text,
            start_position: self.start_position,
            end_position: self.end_position,
        }
    }
}

/// Split content into consecutive line-aligned chunks.
///
/// The chunks partition the content: joining their texts with `'\n'`
/// gives back the input, and every chunk starts one character after the
/// previous one ends. Empty content yields no chunks.
pub fn split_linear_lines(content: &str, config: &ChunkConfig) -> Vec<Chunk> {
    if content.is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut segment: Option<Segment> = None;
    let mut position = 0;

    for line in content.split(LINE_SEPARATOR) {
        let line_chars = line.chars().count();
        let line_start = position;
        let line_end = line_start + line_chars;
        position = line_end + SEPARATOR_LEN;

        if let Some(current) = segment
            .as_mut()
            .filter(|current| current.fits(line_chars, config.max_chunk_characters))
        {
            current.push(line, line_chars, line_end);
            continue;
        }

        if let Some(done) = segment.replace(Segment::start(line, line_chars, line_start)) {
            chunks.push(done.into_chunk());
        }
    }

    if let Some(done) = segment {
        chunks.push(done.into_chunk());
    }

    chunks
}
