//! URL shortener and analytics services.
//!
//! [`ShortenerService`] runs the cache-aside read path and the create path
//! over an authoritative store and an optional [`UrlCache`](linkhop_core::UrlCache).
//! [`AnalyticsService`] answers click statistics straight from the store.

pub mod analytics;
pub mod error;
pub mod service;
pub mod shortener;
pub mod tracking;

pub use analytics::{Analytics, AnalyticsService};
pub use error::{Result, ShortenerError};
pub use service::{ShortenerService, ShortenerSettings};
pub use shortener::{ClickInfo, ShortenParams, ShortenedUrl, Shortener};
pub use tracking::spawn_track_click;
