use crate::click::ClickEvent;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Click counts keyed by bucket label (day, month or device class).
pub type BucketCounts = BTreeMap<String, i64>;

/// Everything known about a short code's traffic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub short_code: String,
    pub original_url: String,
    pub total_clicks: i64,
    pub daily_stats: BucketCounts,
    pub monthly_stats: BucketCounts,
    pub devices: BucketCounts,
    pub recent_clicks: Vec<ClickEvent>,
}
