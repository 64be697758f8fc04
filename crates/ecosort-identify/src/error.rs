use thiserror::Error;

/// Why a single backend did not produce an answer.
///
/// These never reach callers of [`crate::Resolver::identify`]; they are
/// collected as diagnostics while the resolver moves on to the next backend.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BackendFailure {
    /// Connection refused, DNS failure, timeout or any other transport error.
    #[error("network failure: {0}")]
    Network(String),
    /// The endpoint answered with a non-success HTTP status.
    #[error("protocol failure: HTTP {status}")]
    Protocol { status: u16 },
    /// The body did not have the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),
    /// The local model answered, but not confidently enough.
    #[error("confidence {confidence:.2} below threshold {threshold:.2}")]
    LowConfidence { confidence: f64, threshold: f64 },
}

impl BackendFailure {
    pub(crate) fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            BackendFailure::Network(format!("request to {url} timed out"))
        } else {
            BackendFailure::Network(format!("request to {url} failed: {error}"))
        }
    }
}

#[derive(Debug, Error)]
pub enum IdentifyError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("failed to build http client: {0}")]
    Http(#[from] reqwest::Error),
}
