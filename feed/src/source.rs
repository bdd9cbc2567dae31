use crate::error::FeedResult;
use crate::model::CatalogQuery;
use crate::volume::RawVolume;
use std::future::Future;

/// The remote catalog. Implementations report HTTP 429 as
/// [`FeedError::RateLimited`](crate::FeedError::RateLimited).
pub trait CatalogSource: Send + Sync {
    /// At most `query.limit` raw records starting at `query.offset`.
    fn search(&self, query: &CatalogQuery) -> impl Future<Output = FeedResult<Vec<RawVolume>>> + Send;

    /// Exactly one record, or `NotFound`.
    fn lookup(&self, id: &str) -> impl Future<Output = FeedResult<RawVolume>> + Send;
}
