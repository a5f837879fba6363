use async_trait::async_trait;
use dashmap::DashMap;
use linkhop_core::cache::{Result, UrlCache};
use linkhop_core::{ShortCode, UrlRecord};
use ::moka::future::Cache;
use std::time::Duration;
use tracing::{debug, trace};
use typed_builder::TypedBuilder;

use crate::{popular_limit, DEFAULT_TTL};

/// Configuration for creating a [`MokaUrlCache`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct MokaCacheConfig {
    /// Maximum number of records the cache can hold.
    #[builder(default = 10_000)]
    pub max_capacity: u64,
    /// Time-to-live for cache entries.
    #[builder(default = DEFAULT_TTL)]
    pub ttl: Duration,
}

/// An in-process cache implementation using Moka.
///
/// Records expire after the configured TTL. Popularity scores are plain
/// counters kept beside the cache; they are not subject to the TTL.
#[derive(Debug, Clone)]
pub struct MokaUrlCache {
    records: Cache<String, UrlRecord>,
    scores: std::sync::Arc<DashMap<String, u64>>,
}

impl MokaUrlCache {
    /// Creates a cache with 10,000 entries and a 24 hour TTL.
    pub fn new() -> Self {
        MokaCacheConfig::builder().build().into()
    }

    /// Returns a builder for creating a custom cache configuration.
    pub fn builder() -> MokaCacheConfigBuilder {
        MokaCacheConfig::builder()
    }

    /// Current popularity score of `code`.
    pub fn score(&self, code: &ShortCode) -> u64 {
        self.scores.get(code.as_str()).map_or(0, |s| *s)
    }
}

impl Default for MokaUrlCache {
    fn default() -> Self {
        Self::new()
    }
}

impl From<MokaCacheConfig> for MokaUrlCache {
    fn from(config: MokaCacheConfig) -> Self {
        let records = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(config.ttl)
            .build();

        MokaUrlCache {
            records,
            scores: Default::default(),
        }
    }
}

#[async_trait]
impl UrlCache for MokaUrlCache {
    async fn get(&self, code: &ShortCode) -> Result<Option<UrlRecord>> {
        match self.records.get(code.as_str()).await {
            Some(record) => {
                debug!(code = %code, "cache hit in Moka");
                self.increment_popularity(code).await?;
                Ok(Some(record))
            }
            None => {
                trace!(code = %code, "cache miss in Moka");
                Ok(None)
            }
        }
    }

    async fn set(&self, code: &ShortCode, record: &UrlRecord) -> Result<()> {
        self.records
            .insert(code.as_str().to_owned(), record.clone())
            .await;
        debug!(code = %code, "cached record in Moka");
        Ok(())
    }

    async fn invalidate(&self, code: &ShortCode) -> Result<()> {
        self.records.invalidate(code.as_str()).await;
        self.scores.remove(code.as_str());
        debug!(code = %code, "invalidated record in Moka (if present)");
        Ok(())
    }

    async fn popular(&self, limit: usize) -> Result<Vec<UrlRecord>> {
        let limit = popular_limit(limit);

        let mut ranked: Vec<(String, u64)> = self
            .scores
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(limit);

        let mut records = Vec::with_capacity(ranked.len());
        for (code, _) in ranked {
            if let Some(record) = self.get(&ShortCode::new_unchecked(code)).await? {
                records.push(record);
            }
        }
        Ok(records)
    }

    async fn increment_popularity(&self, code: &ShortCode) -> Result<()> {
        *self.scores.entry(code.as_str().to_owned()).or_insert(0) += 1;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.records.invalidate_all();
        self.scores.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::Timestamp;

    fn record(code: &str, url: &str) -> UrlRecord {
        UrlRecord {
            id: 1,
            short_code: code.to_string(),
            original_url: url.to_string(),
            custom_alias: None,
            created_at: Timestamp::now(),
            clicks: 0,
        }
    }

    fn code(s: &str) -> ShortCode {
        ShortCode::new_unchecked(s)
    }

    #[tokio::test]
    async fn get_and_set() {
        let cache = MokaUrlCache::new();
        let c = code("abc123");
        let r = record("abc123", "https://example.com");

        assert!(cache.get(&c).await.unwrap().is_none());
        cache.set(&c, &r).await.unwrap();
        assert_eq!(cache.get(&c).await.unwrap(), Some(r));
    }

    #[tokio::test]
    async fn hits_bump_popularity_misses_do_not() {
        let cache = MokaUrlCache::new();
        let c = code("abc123");

        cache.get(&c).await.unwrap();
        assert_eq!(cache.score(&c), 0);

        cache.set(&c, &record("abc123", "https://example.com")).await.unwrap();
        cache.get(&c).await.unwrap();
        cache.get(&c).await.unwrap();
        assert_eq!(cache.score(&c), 2);
    }

    #[tokio::test]
    async fn invalidate_removes_record_and_score() {
        let cache = MokaUrlCache::new();
        let c = code("abc123");
        cache.set(&c, &record("abc123", "https://example.com")).await.unwrap();
        cache.get(&c).await.unwrap();

        cache.invalidate(&c).await.unwrap();
        assert_eq!(cache.score(&c), 0);
        assert!(cache.get(&c).await.unwrap().is_none());

        // idempotent
        cache.invalidate(&c).await.unwrap();
    }

    #[tokio::test]
    async fn entries_expire_after_ttl() {
        let cache: MokaUrlCache = MokaUrlCache::builder()
            .max_capacity(100)
            .ttl(Duration::from_millis(50))
            .build()
            .into();
        let c = code("abc123");

        cache.set(&c, &record("abc123", "https://example.com")).await.unwrap();
        assert!(cache.get(&c).await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(cache.get(&c).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn popular_ranks_by_score_and_skips_uncached() {
        let cache = MokaUrlCache::new();
        for (name, bumps) in [("low", 1), ("high", 5), ("mid", 3)] {
            let c = code(name);
            cache.set(&c, &record(name, "https://example.com")).await.unwrap();
            for _ in 0..bumps {
                cache.increment_popularity(&c).await.unwrap();
            }
        }
        cache.increment_popularity(&code("gone")).await.unwrap();
        for _ in 0..10 {
            cache.increment_popularity(&code("gone")).await.unwrap();
        }

        let top = cache.popular(2).await.unwrap();
        let codes: Vec<_> = top.iter().map(|r| r.short_code.as_str()).collect();
        assert_eq!(codes, ["high"]);

        let all = cache.popular(0).await.unwrap();
        let codes: Vec<_> = all.iter().map(|r| r.short_code.as_str()).collect();
        assert_eq!(codes, ["high", "mid", "low"]);
    }

    #[tokio::test]
    async fn close_clears_everything() {
        let cache = MokaUrlCache::new();
        let c = code("abc123");
        cache.set(&c, &record("abc123", "https://example.com")).await.unwrap();
        cache.increment_popularity(&c).await.unwrap();

        cache.close().await.unwrap();
        assert!(cache.popular(10).await.unwrap().is_empty());
        assert!(cache.get(&c).await.unwrap().is_none());
    }
}
