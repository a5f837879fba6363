use crate::analytics::BucketCounts;
use crate::repository::Result;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// One tracked redirect. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickEvent {
    pub id: i64,
    pub short_code: String,
    pub user_agent: String,
    pub ip: String,
    pub referer: String,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct NewClickEvent {
    pub short_code: String,
    pub user_agent: String,
    pub ip: String,
    pub referer: String,
    pub created_at: Timestamp,
}

/// Device bucket derived from a user agent string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeviceClass {
    Mobile,
    Tablet,
    Bot,
    Desktop,
}

impl DeviceClass {
    /// Case-insensitive substring match, first rule wins.
    pub fn classify(user_agent: &str) -> Self {
        let ua = user_agent.to_ascii_lowercase();
        let has = |needles: &[&str]| needles.iter().any(|n| ua.contains(n));

        if has(&["mobile", "android", "iphone"]) {
            DeviceClass::Mobile
        } else if has(&["tablet", "ipad"]) {
            DeviceClass::Tablet
        } else if has(&["bot", "crawler"]) {
            DeviceClass::Bot
        } else {
            DeviceClass::Desktop
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceClass::Mobile => "Mobile",
            DeviceClass::Tablet => "Tablet",
            DeviceClass::Bot => "Bot",
            DeviceClass::Desktop => "Desktop",
        }
    }
}

impl Display for DeviceClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The click event log and its aggregate queries.
///
/// Day and month buckets are UTC calendar buckets formatted as `YYYY-MM-DD`
/// and `YYYY-MM`. Only events at or after `since` are counted.
#[async_trait]
pub trait ClickRepository: Send + Sync + 'static {
    /// Appends an event and returns it with its store-assigned id.
    async fn record_click(&self, event: NewClickEvent) -> Result<ClickEvent>;

    async fn daily_clicks(&self, code: &ShortCode, since: Timestamp) -> Result<BucketCounts>;

    async fn monthly_clicks(&self, code: &ShortCode, since: Timestamp) -> Result<BucketCounts>;

    /// Counts keyed by [`DeviceClass`] name, over the whole log.
    async fn device_clicks(&self, code: &ShortCode) -> Result<BucketCounts>;

    /// Newest first.
    async fn recent_clicks(&self, code: &ShortCode, limit: usize) -> Result<Vec<ClickEvent>>;
}
