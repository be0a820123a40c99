use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Embedding request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Embedding service returned {status}: {body}")]
    EmbeddingStatus { status: u16, body: String },

    #[error("Unexpected embedding response: {0}")]
    Schema(String),

    #[error("Embedding request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Output error: {0}")]
    Output(String),
}

impl Error {
    /// Whether a failed embedding call is worth retrying.
    ///
    /// Transport failures, timeouts, rate limiting and server errors are
    /// transient. Authentication, other client errors and malformed
    /// responses are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Http(e) => !e.is_decode() && !e.is_builder(),
            Error::Timeout(_) => true,
            Error::EmbeddingStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
