//! Query strings for list and analytics endpoints.
//!
//! Values are kept as raw strings so that a malformed number falls back to
//! the operation's default instead of rejecting the request.

use serde::Deserialize;

fn lenient(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.trim().parse().ok()).unwrap_or(0)
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<String>,
}

impl LimitQuery {
    /// `0` when absent or unparsable, which the services treat as "default".
    pub fn limit(&self) -> i64 {
        lenient(self.limit.as_deref())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DaysQuery {
    pub days: Option<String>,
}

impl DaysQuery {
    pub fn days(&self) -> i64 {
        lenient(self.days.as_deref())
    }
}
