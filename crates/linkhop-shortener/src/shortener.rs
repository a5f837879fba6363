use crate::error::Result;
use async_trait::async_trait;
use linkhop_core::UrlRecord;

/// Parameters for creating a shortened URL.
#[derive(Debug, Clone)]
pub struct ShortenParams {
    /// The original URL to be shortened.
    pub original_url: String,
    /// Optional custom alias; `None` means generate one.
    pub custom_alias: Option<String>,
}

/// The outcome of a successful [`Shortener::shorten`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortenedUrl {
    pub short_code: String,
    /// `{base_url}/s/{short_code}`
    pub short_url: String,
    pub original_url: String,
}

/// Request metadata recorded for one redirect.
#[derive(Debug, Clone)]
pub struct ClickInfo {
    pub short_code: String,
    pub user_agent: String,
    pub ip: String,
    pub referer: String,
}

#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Creates a shortened URL.
    async fn shorten(&self, params: ShortenParams) -> Result<ShortenedUrl>;

    /// Resolves a short code, consulting the cache before the store.
    async fn resolve(&self, code: &str) -> Result<UrlRecord>;

    /// Increments the click counter and appends a click event.
    async fn track_click(&self, click: ClickInfo) -> Result<()>;

    /// Newest records first. `limit <= 0` means 50, capped at 100.
    async fn list_urls(&self, limit: i64) -> Result<Vec<UrlRecord>>;

    /// Records ranked by cache popularity. Limits outside 1..=100 mean 10.
    async fn popular_urls(&self, limit: i64) -> Result<Vec<UrlRecord>>;
}
