use async_trait::async_trait;
use jiff::Timestamp;
use linkhop_core::analytics::BucketCounts;
use linkhop_core::repository::{NewUrlRecord, ReadRepository, Repository, Result};
use linkhop_core::{ClickEvent, ClickRepository, NewClickEvent, ShortCode, StorageError, UrlRecord};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};
use typed_builder::TypedBuilder;

/// Connection settings for [`SqliteRepository::connect`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct SqliteSettings {
    /// e.g. `sqlite://linkhop.db`; the file is created if missing.
    #[builder(setter(into))]
    pub database_url: String,
    #[builder(default = 10)]
    pub max_connections: u32,
}

/// SQLite implementation of the store traits.
///
/// Timestamps are stored as unix milliseconds, so records read back carry
/// millisecond precision. Day and month buckets are computed in UTC.
#[derive(Debug, Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Creates a repository from an existing pool. Migrations are not run.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens a pool in WAL mode and applies pending migrations.
    pub async fn connect(settings: &SqliteSettings) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&settings.database_url)
            .map_err(map_sqlx_error)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(settings.max_connections)
            .connect_with(options)
            .await
            .map_err(map_sqlx_error)?;

        let repository = Self::new(pool);
        repository.migrate().await?;
        Ok(repository)
    }

    /// Applies the embedded migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StorageError::Operation(format!("failed to run migrations: {e}")))?;
        info!("database migrations applied");
        Ok(())
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Waits for checked-out connections and closes the pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn bucketed(
        &self,
        code: &ShortCode,
        since: Timestamp,
        format: &str,
    ) -> Result<BucketCounts> {
        let rows = sqlx::query(
            r#"
            SELECT strftime(?, created_at / 1000, 'unixepoch') AS bucket, COUNT(*) AS clicks
            FROM click_events
            WHERE short_code = ?
              AND created_at >= ?
            GROUP BY bucket
            "#,
        )
        .bind(format)
        .bind(code.as_str())
        .bind(since.as_millisecond())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        counts_from_rows(&rows)
    }
}

fn timestamp_from_millis(millis: i64) -> Result<Timestamp> {
    Timestamp::from_millisecond(millis).map_err(|e| {
        StorageError::InvalidData(format!("invalid created_at timestamp '{millis}': {e}"))
    })
}

fn url_from_row(row: &SqliteRow) -> Result<UrlRecord> {
    let created_at: i64 = row.try_get("created_at").map_err(map_sqlx_error)?;
    Ok(UrlRecord {
        id: row.try_get("id").map_err(map_sqlx_error)?,
        short_code: row.try_get("short_code").map_err(map_sqlx_error)?,
        original_url: row.try_get("original_url").map_err(map_sqlx_error)?,
        custom_alias: row.try_get("custom_alias").map_err(map_sqlx_error)?,
        created_at: timestamp_from_millis(created_at)?,
        clicks: row.try_get("clicks").map_err(map_sqlx_error)?,
    })
}

fn click_from_row(row: &SqliteRow) -> Result<ClickEvent> {
    let created_at: i64 = row.try_get("created_at").map_err(map_sqlx_error)?;
    Ok(ClickEvent {
        id: row.try_get("id").map_err(map_sqlx_error)?,
        short_code: row.try_get("short_code").map_err(map_sqlx_error)?,
        user_agent: row.try_get("user_agent").map_err(map_sqlx_error)?,
        ip: row.try_get("ip").map_err(map_sqlx_error)?,
        referer: row.try_get("referer").map_err(map_sqlx_error)?,
        created_at: timestamp_from_millis(created_at)?,
    })
}

fn counts_from_rows(rows: &[SqliteRow]) -> Result<BucketCounts> {
    rows.iter()
        .map(|row| {
            let bucket: String = row.try_get("bucket").map_err(map_sqlx_error)?;
            let clicks: i64 = row.try_get("clicks").map_err(map_sqlx_error)?;
            Ok((bucket, clicks))
        })
        .collect()
}

fn limit_param(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

#[async_trait]
impl ReadRepository for SqliteRepository {
    async fn get(&self, code: &ShortCode) -> Result<Option<UrlRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, short_code, original_url, custom_alias, created_at, clicks
            FROM urls
            WHERE short_code = ?
            LIMIT 1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(url_from_row).transpose()
    }

    async fn exists(&self, code: &ShortCode) -> Result<bool> {
        let exists = sqlx::query(
            r#"
            SELECT 1
            FROM urls
            WHERE short_code = ?
            LIMIT 1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .is_some();

        Ok(exists)
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<UrlRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, short_code, original_url, custom_alias, created_at, clicks
            FROM urls
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(limit_param(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter().map(url_from_row).collect()
    }
}

#[async_trait]
impl Repository for SqliteRepository {
    async fn insert(&self, record: NewUrlRecord) -> Result<UrlRecord> {
        let created_at = record.created_at.as_millisecond();
        let custom_alias = record.custom_alias();

        let result = sqlx::query(
            r#"
            INSERT INTO urls (short_code, original_url, custom_alias, created_at, clicks)
            VALUES (?, ?, ?, ?, 0)
            "#,
        )
        .bind(record.short_code.as_str())
        .bind(record.original_url.as_str())
        .bind(custom_alias.as_deref())
        .bind(created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => {
                debug!(code = %record.short_code, "inserted url record");
                Ok(UrlRecord {
                    id: done.last_insert_rowid(),
                    short_code: record.short_code.as_str().to_owned(),
                    original_url: record.original_url,
                    custom_alias,
                    created_at: timestamp_from_millis(created_at)?,
                    clicks: 0,
                })
            }
            Err(err) if is_unique_violation(&err) => {
                Err(StorageError::Conflict(record.short_code.to_string()))
            }
            Err(err) => Err(map_sqlx_error(err)),
        }
    }

    async fn increment_clicks(&self, code: &ShortCode) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE urls
            SET clicks = clicks + 1
            WHERE short_code = ?
            "#,
        )
        .bind(code.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ClickRepository for SqliteRepository {
    async fn record_click(&self, event: NewClickEvent) -> Result<ClickEvent> {
        let created_at = event.created_at.as_millisecond();

        let result = sqlx::query(
            r#"
            INSERT INTO click_events (short_code, user_agent, ip, referer, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(event.short_code.as_str())
        .bind(event.user_agent.as_str())
        .bind(event.ip.as_str())
        .bind(event.referer.as_str())
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(ClickEvent {
            id: result.last_insert_rowid(),
            short_code: event.short_code,
            user_agent: event.user_agent,
            ip: event.ip,
            referer: event.referer,
            created_at: timestamp_from_millis(created_at)?,
        })
    }

    async fn daily_clicks(&self, code: &ShortCode, since: Timestamp) -> Result<BucketCounts> {
        self.bucketed(code, since, "%Y-%m-%d").await
    }

    async fn monthly_clicks(&self, code: &ShortCode, since: Timestamp) -> Result<BucketCounts> {
        self.bucketed(code, since, "%Y-%m").await
    }

    async fn device_clicks(&self, code: &ShortCode) -> Result<BucketCounts> {
        let rows = sqlx::query(
            r#"
            SELECT
                CASE
                    WHEN LOWER(user_agent) LIKE '%mobile%'
                      OR LOWER(user_agent) LIKE '%android%'
                      OR LOWER(user_agent) LIKE '%iphone%' THEN 'Mobile'
                    WHEN LOWER(user_agent) LIKE '%tablet%'
                      OR LOWER(user_agent) LIKE '%ipad%' THEN 'Tablet'
                    WHEN LOWER(user_agent) LIKE '%bot%'
                      OR LOWER(user_agent) LIKE '%crawler%' THEN 'Bot'
                    ELSE 'Desktop'
                END AS bucket,
                COUNT(*) AS clicks
            FROM click_events
            WHERE short_code = ?
            GROUP BY bucket
            "#,
        )
        .bind(code.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        counts_from_rows(&rows)
    }

    async fn recent_clicks(&self, code: &ShortCode, limit: usize) -> Result<Vec<ClickEvent>> {
        let rows = sqlx::query(
            r#"
            SELECT id, short_code, user_agent, ip, referer, created_at
            FROM click_events
            WHERE short_code = ?
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(code.as_str())
        .bind(limit_param(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter().map(click_from_row).collect()
    }
}
