//! Cache layer implementations for Linkhop.
//!
//! All backends implement [`UrlCache`] and are interchangeable behind an
//! `Arc<dyn UrlCache>`.

pub mod moka;
pub mod noop;
pub mod redis;

pub use linkhop_core::cache::{Result, UrlCache};
pub use linkhop_core::CacheError;
pub use self::moka::{MokaCacheConfig, MokaUrlCache};
pub use noop::NoopUrlCache;
pub use self::redis::{RedisCacheConfig, RedisUrlCache};

use std::time::Duration;

/// Default lifetime of a cache entry.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Number of entries returned by `popular(0)`.
pub const DEFAULT_POPULAR_LIMIT: usize = 10;

pub(crate) fn popular_limit(limit: usize) -> usize {
    if limit == 0 {
        DEFAULT_POPULAR_LIMIT
    } else {
        limit
    }
}
