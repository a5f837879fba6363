use async_trait::async_trait;
use linkhop_core::cache::{Result, UrlCache};
use linkhop_core::{CacheError, ShortCode, UrlRecord};
use ::redis::aio::MultiplexedConnection;
use ::redis::AsyncCommands;
use std::time::Duration;
use tracing::{debug, trace, warn};
use typed_builder::TypedBuilder;

use crate::{popular_limit, DEFAULT_TTL};

pub const DEFAULT_KEY_PREFIX: &str = "lh:";

/// Settings for [`RedisUrlCache::connect`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct RedisCacheConfig {
    /// e.g. `redis://127.0.0.1:6379`.
    #[builder(setter(into))]
    pub url: String,
    #[builder(default = DEFAULT_TTL)]
    pub ttl: Duration,
    #[builder(default = DEFAULT_KEY_PREFIX.to_string(), setter(into))]
    pub key_prefix: String,
    /// Bounds connecting and the initial `PING`.
    #[builder(default = Duration::from_secs(5))]
    pub connect_timeout: Duration,
}

/// A Redis-based implementation of [`UrlCache`].
///
/// Layout under the key prefix:
/// - `{prefix}url:{code}`: the JSON record, written with `SET .. EX ttl`
/// - `{prefix}urls:popular`: sorted set of codes scored by cache hits
#[derive(Debug, Clone)]
pub struct RedisUrlCache {
    conn: MultiplexedConnection,
    ttl: Duration,
    key_prefix: String,
}

fn map_redis_error(operation: &str, err: ::redis::RedisError) -> CacheError {
    let message = format!("{operation}: {err}");
    if err.is_timeout() {
        CacheError::Timeout(message)
    } else if err.is_connection_dropped() || err.is_connection_refusal() || err.is_io_error() {
        CacheError::Unavailable(message)
    } else {
        CacheError::Operation(message)
    }
}

impl RedisUrlCache {
    /// Wraps an existing connection, using the default prefix.
    pub fn new(conn: MultiplexedConnection, ttl: Duration) -> Self {
        Self::with_prefix(conn, ttl, DEFAULT_KEY_PREFIX)
    }

    /// Wraps an existing connection with a custom key prefix (e.g. `"myapp:"`).
    pub fn with_prefix(
        conn: MultiplexedConnection,
        ttl: Duration,
        key_prefix: impl Into<String>,
    ) -> Self {
        Self {
            conn,
            ttl,
            key_prefix: key_prefix.into(),
        }
    }

    /// Opens a multiplexed connection and checks it with `PING`.
    ///
    /// Fails if the server cannot be reached within `connect_timeout`.
    pub async fn connect(config: RedisCacheConfig) -> Result<Self> {
        let client = ::redis::Client::open(config.url.as_str()).map_err(|e| {
            CacheError::Initialization(format!("invalid redis url '{}': {e}", config.url))
        })?;

        let mut conn = tokio::time::timeout(
            config.connect_timeout,
            client.get_multiplexed_async_connection(),
        )
        .await
        .map_err(|_| CacheError::Timeout("timed out connecting to Redis".to_string()))?
        .map_err(|e| map_redis_error("failed to connect to Redis", e))?;

        tokio::time::timeout(
            config.connect_timeout,
            ::redis::cmd("PING").query_async::<String>(&mut conn),
        )
        .await
        .map_err(|_| CacheError::Timeout("timed out pinging Redis".to_string()))?
        .map_err(|e| map_redis_error("failed to ping Redis", e))?;

        debug!(url = %config.url, "connected to Redis");
        Ok(Self::with_prefix(conn, config.ttl, config.key_prefix))
    }

    fn record_key(&self, code: &ShortCode) -> String {
        format!("{}url:{}", self.key_prefix, code.as_str())
    }

    fn popular_key(&self) -> String {
        format!("{}urls:popular", self.key_prefix)
    }

    fn ttl_seconds(&self) -> u64 {
        self.ttl.as_secs().max(1)
    }
}

#[async_trait]
impl UrlCache for RedisUrlCache {
    async fn get(&self, code: &ShortCode) -> Result<Option<UrlRecord>> {
        let key = self.record_key(code);
        trace!(code = %code, "fetching URL record from Redis cache");

        let mut conn = self.conn.clone();
        let cached = match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(cached)) => cached,
            Ok(None) => {
                trace!(code = %code, "cache miss in Redis");
                return Ok(None);
            }
            Err(e) => {
                warn!(code = %code, error = %e, "Redis error on get, treating as miss");
                return Ok(None);
            }
        };

        let record = match serde_json::from_str::<UrlRecord>(&cached) {
            Ok(record) => record,
            Err(e) => {
                warn!(code = %code, error = %e, "failed to deserialize cached record, treating as miss");
                return Ok(None);
            }
        };

        debug!(code = %code, "cache hit in Redis");
        let cache = self.clone();
        let code = code.clone();
        tokio::spawn(async move {
            let _ = cache.increment_popularity(&code).await;
        });

        Ok(Some(record))
    }

    async fn set(&self, code: &ShortCode, record: &UrlRecord) -> Result<()> {
        let key = self.record_key(code);
        trace!(code = %code, "storing URL record in Redis cache");

        let json = serde_json::to_string(record).map_err(|e| {
            warn!(code = %code, error = %e, "failed to serialize record for caching");
            CacheError::Serialization(format!("failed to serialize cache value: {e}"))
        })?;

        let mut conn = self.conn.clone();
        match conn.set_ex::<_, _, ()>(&key, json, self.ttl_seconds()).await {
            Ok(()) => {
                debug!(code = %code, "cached record in Redis");
                Ok(())
            }
            Err(e) => {
                warn!(code = %code, error = %e, "failed to cache record in Redis");
                Err(map_redis_error("failed to write value to Redis", e))
            }
        }
    }

    async fn invalidate(&self, code: &ShortCode) -> Result<()> {
        let key = self.record_key(code);
        trace!(code = %code, "invalidating URL record in Redis cache");

        let mut conn = self.conn.clone();
        if let Err(e) = conn.del::<_, ()>(&key).await {
            warn!(code = %code, error = %e, "failed to remove record from Redis cache");
            return Err(map_redis_error("failed to delete value from Redis", e));
        }

        if let Err(e) = conn
            .zrem::<_, _, ()>(self.popular_key(), code.as_str())
            .await
        {
            warn!(code = %code, error = %e, "failed to remove popularity score");
        }

        debug!(code = %code, "invalidated record in Redis cache");
        Ok(())
    }

    async fn popular(&self, limit: usize) -> Result<Vec<UrlRecord>> {
        let limit = popular_limit(limit);
        let stop = isize::try_from(limit).unwrap_or(isize::MAX) - 1;

        let mut conn = self.conn.clone();
        let codes = match conn
            .zrevrange::<_, Vec<String>>(self.popular_key(), 0, stop)
            .await
        {
            Ok(codes) => codes,
            Err(e) => {
                warn!(error = %e, "failed to read popularity ranking");
                return Ok(Vec::new());
            }
        };

        let mut records = Vec::with_capacity(codes.len());
        for code in codes {
            let code = ShortCode::new_unchecked(code);
            match self.get(&code).await {
                Ok(Some(record)) => records.push(record),
                Ok(None) => trace!(code = %code, "popular code no longer cached, skipping"),
                Err(e) => warn!(code = %code, error = %e, "failed to resolve popular code"),
            }
        }

        Ok(records)
    }

    async fn increment_popularity(&self, code: &ShortCode) -> Result<()> {
        let mut conn = self.conn.clone();
        match conn
            .zincr::<_, _, _, f64>(self.popular_key(), code.as_str(), 1)
            .await
        {
            Ok(score) => trace!(code = %code, score, "incremented popularity"),
            Err(e) => warn!(code = %code, error = %e, "failed to increment popularity"),
        }
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        // The multiplexed connection shuts down when its last clone is dropped.
        debug!("closing Redis cache");
        Ok(())
    }
}
