use crate::error::{Result, ShortenerError};
use async_trait::async_trait;
use jiff::tz::TimeZone;
use jiff::{SignedDuration, Timestamp, ToSpan};
use linkhop_core::analytics::{AnalyticsReport, BucketCounts};
use linkhop_core::{ClickEvent, ClickRepository, ReadRepository, ShortCode, UrlRecord};
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_DAYS: i64 = 30;
pub const MAX_DAYS: i64 = 365;
pub const DEFAULT_MONTHS: i64 = 12;
pub const MAX_MONTHS: i64 = 24;
pub const DEFAULT_RECENT_CLICKS: i64 = 10;
pub const MAX_RECENT_CLICKS: i64 = 100;

/// Read-only click statistics for a short code.
///
/// Every operation fails with [`ShortenerError::UrlNotFound`] for codes that
/// were never created. Out-of-range windows fall back to their default.
#[async_trait]
pub trait Analytics: Send + Sync + 'static {
    /// Totals, 30 days, 12 months, devices and the 10 latest clicks.
    async fn report(&self, code: &str) -> Result<AnalyticsReport>;

    /// Clicks per UTC day over the last `days` (1..=365, default 30).
    async fn daily_stats(&self, code: &str, days: i64) -> Result<BucketCounts>;

    /// Clicks per UTC month over the last `months` (1..=24, default 12).
    async fn monthly_stats(&self, code: &str, months: i64) -> Result<BucketCounts>;

    /// Clicks per device class.
    async fn device_stats(&self, code: &str) -> Result<BucketCounts>;

    /// Newest clicks first (1..=100, default 10).
    async fn recent_clicks(&self, code: &str, limit: i64) -> Result<Vec<ClickEvent>>;
}

pub struct AnalyticsService<R> {
    repository: Arc<R>,
}

impl<R> AnalyticsService<R>
where
    R: ReadRepository + ClickRepository,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    async fn lookup(&self, code: &str) -> Result<(ShortCode, UrlRecord)> {
        if code.is_empty() {
            return Err(ShortenerError::empty_short_code());
        }
        let code = ShortCode::new_unchecked(code);
        let record = self
            .repository
            .get(&code)
            .await?
            .ok_or_else(|| ShortenerError::UrlNotFound(code.to_string()))?;
        Ok((code, record))
    }

    async fn daily(&self, code: &ShortCode, days: i64) -> Result<BucketCounts> {
        let days = in_range_or(days, MAX_DAYS, DEFAULT_DAYS);
        let since = Timestamp::now()
            .checked_sub(SignedDuration::from_hours(24 * days))
            .map_err(|e| ShortenerError::Internal(format!("invalid day window: {e}")))?;
        Ok(self.repository.daily_clicks(code, since).await?)
    }

    async fn monthly(&self, code: &ShortCode, months: i64) -> Result<BucketCounts> {
        let months = in_range_or(months, MAX_MONTHS, DEFAULT_MONTHS);
        let since = Timestamp::now()
            .to_zoned(TimeZone::UTC)
            .checked_sub(months.months())
            .map_err(|e| ShortenerError::Internal(format!("invalid month window: {e}")))?
            .timestamp();
        Ok(self.repository.monthly_clicks(code, since).await?)
    }

    async fn recent(&self, code: &ShortCode, limit: i64) -> Result<Vec<ClickEvent>> {
        let limit = in_range_or(limit, MAX_RECENT_CLICKS, DEFAULT_RECENT_CLICKS);
        // in_range_or only yields 1..=MAX_RECENT_CLICKS
        let limit = usize::try_from(limit).unwrap_or_default();
        Ok(self.repository.recent_clicks(code, limit).await?)
    }
}

fn in_range_or(value: i64, max: i64, default: i64) -> i64 {
    if (1..=max).contains(&value) {
        value
    } else {
        default
    }
}

#[async_trait]
impl<R> Analytics for AnalyticsService<R>
where
    R: ReadRepository + ClickRepository,
{
    async fn report(&self, code: &str) -> Result<AnalyticsReport> {
        let (code, record) = self.lookup(code).await?;
        debug!(code = %code, "building analytics report");

        let (daily_stats, monthly_stats, devices, recent_clicks) = tokio::try_join!(
            self.daily(&code, DEFAULT_DAYS),
            self.monthly(&code, DEFAULT_MONTHS),
            async {
                self.repository
                    .device_clicks(&code)
                    .await
                    .map_err(ShortenerError::from)
            },
            self.recent(&code, DEFAULT_RECENT_CLICKS),
        )?;

        Ok(AnalyticsReport {
            short_code: record.short_code,
            original_url: record.original_url,
            total_clicks: record.clicks,
            daily_stats,
            monthly_stats,
            devices,
            recent_clicks,
        })
    }

    async fn daily_stats(&self, code: &str, days: i64) -> Result<BucketCounts> {
        let (code, _) = self.lookup(code).await?;
        self.daily(&code, days).await
    }

    async fn monthly_stats(&self, code: &str, months: i64) -> Result<BucketCounts> {
        let (code, _) = self.lookup(code).await?;
        self.monthly(&code, months).await
    }

    async fn device_stats(&self, code: &str) -> Result<BucketCounts> {
        let (code, _) = self.lookup(code).await?;
        Ok(self.repository.device_clicks(&code).await?)
    }

    async fn recent_clicks(&self, code: &str, limit: i64) -> Result<Vec<ClickEvent>> {
        let (code, _) = self.lookup(code).await?;
        self.recent(&code, limit).await
    }
}
