use async_trait::async_trait;
use linkhop_core::cache::{Result, UrlCache};
use linkhop_core::{ShortCode, UrlRecord};

/// A cache that stores nothing.
///
/// Every read is a miss and every write succeeds. Used when the real cache
/// cannot be reached at startup so requests run against the store alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopUrlCache;

#[async_trait]
impl UrlCache for NoopUrlCache {
    async fn get(&self, _code: &ShortCode) -> Result<Option<UrlRecord>> {
        Ok(None)
    }

    async fn set(&self, _code: &ShortCode, _record: &UrlRecord) -> Result<()> {
        Ok(())
    }

    async fn invalidate(&self, _code: &ShortCode) -> Result<()> {
        Ok(())
    }

    async fn popular(&self, _limit: usize) -> Result<Vec<UrlRecord>> {
        Ok(Vec::new())
    }

    async fn increment_popularity(&self, _code: &ShortCode) -> Result<()> {
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
