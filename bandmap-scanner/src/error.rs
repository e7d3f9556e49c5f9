use thiserror::Error;

/// Failure of a single lookup against the metadata service.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Artist not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// A lookup that failed for a specific id.
///
/// The crawler treats every `FetchError` the same way: the id is skipped and
/// the crawl carries on. Only a failure on the seed aborts the run.
#[derive(Error, Debug)]
#[error("failed to fetch {id}: {source}")]
pub struct FetchError {
    pub id: String,
    #[source]
    pub source: LookupError,
}

impl FetchError {
    pub fn new(id: impl Into<String>, source: LookupError) -> Self {
        Self {
            id: id.into(),
            source,
        }
    }
}

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Seed band could not be fetched: {0}")]
    SeedUnavailable(#[source] FetchError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScanError>;
