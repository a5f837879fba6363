use crate::error::CacheError;
use crate::repository::UrlRecord;
use crate::shortcode::ShortCode;
use async_trait::async_trait;

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

/// Cache-aside store for [`UrlRecord`]s with a popularity ranking.
///
/// The cache is never authoritative. Reads degrade to "no value" instead of
/// failing, and popularity bookkeeping never fails a caller.
#[async_trait]
pub trait UrlCache: Send + Sync + 'static {
    /// Returns the cached record, or `Ok(None)` on a miss.
    ///
    /// A hit bumps the code's popularity score without delaying the read.
    async fn get(&self, code: &ShortCode) -> Result<Option<UrlRecord>>;

    /// Stores a record under the configured TTL.
    async fn set(&self, code: &ShortCode, record: &UrlRecord) -> Result<()>;

    /// Removes the record and its popularity score.
    /// It is not an error if the key does not exist.
    async fn invalidate(&self, code: &ShortCode) -> Result<()>;

    /// Up to `limit` cached records by popularity, highest first.
    ///
    /// Codes whose record is no longer cached are skipped.
    async fn popular(&self, limit: usize) -> Result<Vec<UrlRecord>>;

    /// Adds exactly one to the code's popularity score.
    async fn increment_popularity(&self, code: &ShortCode) -> Result<()>;

    /// Releases backend resources.
    async fn close(&self) -> Result<()>;
}
