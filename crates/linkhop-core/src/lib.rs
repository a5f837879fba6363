//! Core types and traits for the Linkhop URL shortener.
//!
//! This crate provides the domain model shared by the storage, cache,
//! shortener and gateway crates: short codes and their validation rules,
//! URL records and click events, and the traits that the authoritative
//! store and the cache layer implement.

pub mod analytics;
pub mod cache;
pub mod click;
pub mod error;
pub mod repository;
pub mod shortcode;
pub mod validation;

pub use analytics::{AnalyticsReport, BucketCounts};
pub use cache::UrlCache;
pub use click::{ClickEvent, ClickRepository, DeviceClass, NewClickEvent};
pub use error::{CacheError, CoreError, StorageError};
pub use repository::{NewUrlRecord, ReadRepository, Repository, UrlRecord};
pub use shortcode::ShortCode;
pub use validation::{validate_short_code, validate_url, MAX_SHORT_CODE_LEN};
