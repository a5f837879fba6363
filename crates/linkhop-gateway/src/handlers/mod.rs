mod analytics;
mod health;
mod redirect;
mod url;

pub use analytics::{
    analytics_handler, daily_stats_handler, device_stats_handler, monthly_stats_handler,
    recent_clicks_handler,
};
pub use health::health_handler;
pub use redirect::{extract_ip, redirect_handler};
pub use url::{create_url_handler, list_urls_handler, popular_urls_handler};
