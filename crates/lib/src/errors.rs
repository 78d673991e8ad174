use thiserror::Error;

/// Errors raised while turning one record into an upload and sending it.
///
/// Every variant is recoverable at the processor boundary: the record is routed
/// to `failure` and nothing is written back onto it.
#[derive(Error, Debug)]
pub enum PostImageError {
    #[error("Required input is missing: {0}")]
    MissingRequiredInput(&'static str),
    #[error("Image type '{0}' is not a valid content type")]
    InvalidContentType(String),
    #[error("Failed to read record content: {0}")]
    ReadContent(#[from] std::io::Error),
    #[error("Failed to build Reqwest client: {0}")]
    ClientBuild(reqwest::Error),
    #[error("Upload request failed: {0}")]
    TransportFailure(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("Upload endpoint responded with {status_code} {status}")]
    ApplicationFailure { status_code: u16, status: String },
}

impl PostImageError {
    /// Wraps any transport-level error (connection refused, timeout, bad response framing).
    pub fn transport<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        PostImageError::TransportFailure(Box::new(err))
    }
}
