use linkhop_core::{CoreError, StorageError};
use linkhop_generator::GeneratorError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ShortenerError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShortenerError {
    #[error("url cannot be empty")]
    EmptyUrl,
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("invalid short code: {0}")]
    InvalidShortCode(String),
    #[error("short code too long: {len} characters, at most {max} allowed")]
    ShortCodeTooLong { len: usize, max: usize },
    #[error("short code already exists: {0}")]
    ShortCodeExists(String),
    #[error("url not found: {0}")]
    UrlNotFound(String),
    #[error("cache not available")]
    CacheUnavailable,
    #[error("random source unavailable: {0}")]
    RandomSourceUnavailable(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ShortenerError {
    pub(crate) fn empty_short_code() -> Self {
        Self::InvalidShortCode("short code cannot be empty".to_string())
    }
}

impl From<CoreError> for ShortenerError {
    fn from(value: CoreError) -> Self {
        match value {
            CoreError::EmptyUrl => Self::EmptyUrl,
            CoreError::InvalidUrl(reason) => Self::InvalidUrl(reason),
            CoreError::InvalidShortCode(reason) => Self::InvalidShortCode(reason),
            CoreError::ShortCodeTooLong { len, max } => Self::ShortCodeTooLong { len, max },
        }
    }
}

impl From<StorageError> for ShortenerError {
    fn from(value: StorageError) -> Self {
        match value {
            StorageError::Conflict(code) => Self::ShortCodeExists(code),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<GeneratorError> for ShortenerError {
    fn from(value: GeneratorError) -> Self {
        match value {
            GeneratorError::RandomSourceUnavailable(reason) => Self::RandomSourceUnavailable(reason),
            other => Self::Internal(other.to_string()),
        }
    }
}
