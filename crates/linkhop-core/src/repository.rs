use crate::error::StorageError;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Result type for authoritative store operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// A stored URL record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRecord {
    /// Store-assigned row id.
    pub id: i64,
    pub short_code: String,
    pub original_url: String,
    /// Present iff the caller chose the code; equal to `short_code` then.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_alias: Option<String>,
    pub created_at: Timestamp,
    /// Redirects recorded for this code.
    pub clicks: i64,
}

/// A URL record that has not been persisted yet.
#[derive(Debug, Clone)]
pub struct NewUrlRecord {
    pub short_code: ShortCode,
    pub original_url: String,
    pub created_at: Timestamp,
}

impl NewUrlRecord {
    pub fn new(short_code: ShortCode, original_url: impl Into<String>) -> Self {
        Self {
            short_code,
            original_url: original_url.into(),
            created_at: Timestamp::now(),
        }
    }

    /// The alias column value: the code itself for custom aliases.
    pub fn custom_alias(&self) -> Option<String> {
        self.short_code
            .is_custom()
            .then(|| self.short_code.as_str().to_owned())
    }
}

/// A read-only view of the authoritative store.
#[async_trait]
pub trait ReadRepository: Send + Sync + 'static {
    /// Retrieves the URL record for a given short code.
    /// Returns `None` if the code does not exist.
    async fn get(&self, code: &ShortCode) -> Result<Option<UrlRecord>>;

    /// Checks whether a short code already exists in the repository.
    async fn exists(&self, code: &ShortCode) -> Result<bool>;

    /// Returns up to `limit` records, newest first.
    async fn list_recent(&self, limit: usize) -> Result<Vec<UrlRecord>>;
}

#[async_trait]
pub trait Repository: ReadRepository {
    /// Persists a new record with `clicks = 0` and returns it.
    ///
    /// Returns [`StorageError::Conflict`] when the code is taken; the store's
    /// uniqueness check is the final arbiter for concurrent inserts.
    async fn insert(&self, record: NewUrlRecord) -> Result<UrlRecord>;

    /// Adds one to the click counter.
    /// Returns `false` if the code does not exist.
    async fn increment_clicks(&self, code: &ShortCode) -> Result<bool>;
}
