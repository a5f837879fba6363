use crate::error::{Result, ShortenerError};
use crate::shortener::{ClickInfo, ShortenParams, ShortenedUrl, Shortener};
use async_trait::async_trait;
use jiff::Timestamp;
use linkhop_core::{
    validate_url, ClickRepository, NewClickEvent, NewUrlRecord, Repository, ShortCode, UrlCache,
    UrlRecord,
};
use linkhop_generator::Generator;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};
use typed_builder::TypedBuilder;

pub const DEFAULT_LIST_LIMIT: usize = 50;
pub const MAX_LIST_LIMIT: usize = 100;
pub const DEFAULT_POPULAR_LIMIT: usize = 10;
pub const MAX_POPULAR_LIMIT: usize = 100;

/// Immutable construction parameters for [`ShortenerService`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct ShortenerSettings {
    /// Public origin used to build short links, e.g. `https://lnk.example`.
    #[builder(setter(into))]
    pub base_url: String,
}

/// A concrete implementation of the [`Shortener`] trait.
///
/// Reads are cache-aside: the cache is consulted first and refilled after a
/// store read. Every cache fault is logged and treated as a miss. Code
/// uniqueness rests on the store: the existence check only short-circuits
/// the common case, and a lost insert race surfaces as the same
/// [`ShortenerError::ShortCodeExists`].
pub struct ShortenerService<R, G> {
    repository: Arc<R>,
    generator: G,
    cache: Option<Arc<dyn UrlCache>>,
    settings: ShortenerSettings,
}

impl<R, G> ShortenerService<R, G>
where
    R: Repository + ClickRepository,
    G: Generator,
{
    /// Creates a service without a cache. Popularity queries will fail with
    /// [`ShortenerError::CacheUnavailable`].
    pub fn new(repository: Arc<R>, generator: G, settings: ShortenerSettings) -> Self {
        Self {
            repository,
            generator,
            cache: None,
            settings,
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn UrlCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    fn pick_code(&self, custom_alias: Option<String>) -> Result<ShortCode> {
        match custom_alias {
            Some(alias) => Ok(ShortCode::new(alias)?),
            None => Ok(self.generator.generate()?),
        }
    }

    async fn cache_fill(&self, code: &ShortCode, record: &UrlRecord) {
        let Some(cache) = &self.cache else {
            return;
        };
        if let Err(e) = cache.set(code, record).await {
            warn!(code = %code, error = %e, "failed to populate cache");
        }
    }

    async fn cache_lookup(&self, code: &ShortCode) -> Option<UrlRecord> {
        let cache = self.cache.as_ref()?;
        match cache.get(code).await {
            Ok(Some(record)) => Some(record),
            Ok(None) => {
                trace!(code = %code, "cache miss");
                None
            }
            Err(e) => {
                warn!(code = %code, error = %e, "cache read failed, falling back to store");
                None
            }
        }
    }
}

/// Out-of-range limits fall back to `default` rather than being capped.
fn limit_or_default(limit: i64, default: usize, max: usize) -> usize {
    match usize::try_from(limit) {
        Ok(limit) if (1..=max).contains(&limit) => limit,
        _ => default,
    }
}

fn clamp_limit(limit: i64, default: usize, max: usize) -> usize {
    if limit <= 0 {
        return default;
    }
    usize::try_from(limit).map_or(max, |limit| limit.min(max))
}

#[async_trait]
impl<R, G> Shortener for ShortenerService<R, G>
where
    R: Repository + ClickRepository,
    G: Generator,
{
    async fn shorten(&self, params: ShortenParams) -> Result<ShortenedUrl> {
        validate_url(&params.original_url)?;
        let code = self.pick_code(params.custom_alias)?;

        if self.repository.exists(&code).await? {
            return Err(ShortenerError::ShortCodeExists(code.to_string()));
        }

        let record = self
            .repository
            .insert(NewUrlRecord::new(code.clone(), params.original_url))
            .await?;

        self.cache_fill(&code, &record).await;

        info!(code = %code, custom = code.is_custom(), "created short url");
        Ok(ShortenedUrl {
            short_url: code.to_url(&self.settings.base_url),
            short_code: record.short_code,
            original_url: record.original_url,
        })
    }

    async fn resolve(&self, code: &str) -> Result<UrlRecord> {
        if code.is_empty() {
            return Err(ShortenerError::empty_short_code());
        }
        let code = ShortCode::new_unchecked(code);

        if let Some(record) = self.cache_lookup(&code).await {
            debug!(code = %code, "resolved from cache");
            return Ok(record);
        }

        let record = self
            .repository
            .get(&code)
            .await?
            .ok_or_else(|| ShortenerError::UrlNotFound(code.to_string()))?;

        self.cache_fill(&code, &record).await;
        Ok(record)
    }

    async fn track_click(&self, click: ClickInfo) -> Result<()> {
        if click.short_code.is_empty() {
            return Err(ShortenerError::empty_short_code());
        }
        let code = ShortCode::new_unchecked(click.short_code.as_str());

        if !self.repository.increment_clicks(&code).await? {
            return Err(ShortenerError::UrlNotFound(code.to_string()));
        }

        self.repository
            .record_click(NewClickEvent {
                short_code: click.short_code,
                user_agent: click.user_agent,
                ip: click.ip,
                referer: click.referer,
                created_at: Timestamp::now(),
            })
            .await?;

        debug!(code = %code, "recorded click");
        Ok(())
    }

    async fn list_urls(&self, limit: i64) -> Result<Vec<UrlRecord>> {
        let limit = clamp_limit(limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT);
        Ok(self.repository.list_recent(limit).await?)
    }

    async fn popular_urls(&self, limit: i64) -> Result<Vec<UrlRecord>> {
        let cache = self
            .cache
            .as_ref()
            .ok_or(ShortenerError::CacheUnavailable)?;
        let limit = limit_or_default(limit, DEFAULT_POPULAR_LIMIT, MAX_POPULAR_LIMIT);

        match cache.popular(limit).await {
            Ok(records) => Ok(records),
            Err(e) => {
                warn!(error = %e, "failed to read popular urls from cache");
                Ok(Vec::new())
            }
        }
    }
}
