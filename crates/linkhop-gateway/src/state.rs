use std::sync::Arc;
use std::time::Duration;

use linkhop_shortener::tracking::DEFAULT_CLICK_TIMEOUT;
use linkhop_shortener::{Analytics, Shortener};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct AppState {
    pub shortener: Arc<dyn Shortener>,
    pub analytics: Arc<dyn Analytics>,
    /// Upper bound for each detached click-tracking task.
    pub click_timeout: Duration,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(shortener: Arc<dyn Shortener>, analytics: Arc<dyn Analytics>) -> Self {
        Self {
            shortener,
            analytics,
            click_timeout: DEFAULT_CLICK_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_click_timeout(mut self, click_timeout: Duration) -> Self {
        self.click_timeout = click_timeout;
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }
}
