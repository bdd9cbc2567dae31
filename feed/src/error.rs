use thiserror::Error;

/// Failures surfaced by the feed, lookups and history storage.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    /// Single-item lookup found no record.
    #[error("book not found: {0}")]
    NotFound(String),

    /// The catalog answered HTTP 429.
    #[error("catalog rate limit reached")]
    RateLimited,

    /// Any other transport, status or decode failure.
    #[error("catalog request failed: {0}")]
    FetchFailed(String),

    /// Local storage read/write failure. Recovered where it occurs.
    #[error("storage error: {0}")]
    Storage(String),
}

impl FeedError {
    /// Text shown in place of the affected content region.
    pub fn user_message(&self) -> &'static str {
        match self {
            FeedError::NotFound(_) => "Book not found",
            FeedError::RateLimited => "Too many requests. Please wait a moment before searching again.",
            FeedError::FetchFailed(_) => "Failed to fetch books",
            FeedError::Storage(_) => "Failed to access local storage",
        }
    }
}

impl From<sled::Error> for FeedError {
    fn from(e: sled::Error) -> Self { FeedError::Storage(e.to_string()) }
}

impl From<serde_json::Error> for FeedError {
    fn from(e: serde_json::Error) -> Self { FeedError::Storage(e.to_string()) }
}

pub type FeedResult<T> = std::result::Result<T, FeedError>;
