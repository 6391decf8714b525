use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("No API key configured")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API Error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Request timed out after {0} ms")]
    Timeout(u128),

    #[error("No content in API response")]
    EmptyContent,

    #[error("Cached generation unavailable: {0}")]
    Cache(#[from] std::io::Error),
}

impl GenerationError {
    /// Transient failures worth another attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            GenerationError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            GenerationError::Status { status, .. } => *status == 429 || *status >= 500,
            GenerationError::Timeout(_) | GenerationError::EmptyContent => true,
            GenerationError::MissingApiKey | GenerationError::Cache(_) => false,
        }
    }
}

impl From<GenerationError> for schemaeval_core::Error {
    fn from(e: GenerationError) -> Self {
        schemaeval_core::Error::Generation(e.to_string())
    }
}
