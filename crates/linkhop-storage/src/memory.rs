use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use jiff::Timestamp;
use linkhop_core::analytics::BucketCounts;
use linkhop_core::repository::{NewUrlRecord, ReadRepository, Repository, Result};
use linkhop_core::{ClickEvent, ClickRepository, DeviceClass, NewClickEvent, ShortCode, StorageError, UrlRecord};
use std::sync::atomic::{AtomicI64, Ordering};

/// In-memory implementation of the store traits using DashMap.
///
/// Inserts go through the map's entry API, so the existence check and the
/// insert are atomic per key just like a unique index.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    urls: DashMap<String, UrlRecord>,
    clicks: DashMap<String, Vec<ClickEvent>>,
    next_url_id: AtomicI64,
    next_click_id: AtomicI64,
}

impl InMemoryRepository {
    /// Creates a new in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn bucketed(
        &self,
        code: &ShortCode,
        since: Timestamp,
        format: &str,
    ) -> BucketCounts {
        let mut counts = BucketCounts::new();
        if let Some(events) = self.clicks.get(code.as_str()) {
            for event in events.iter().filter(|e| e.created_at >= since) {
                *counts
                    .entry(event.created_at.strftime(format).to_string())
                    .or_default() += 1;
            }
        }
        counts
    }
}

#[async_trait]
impl ReadRepository for InMemoryRepository {
    async fn get(&self, code: &ShortCode) -> Result<Option<UrlRecord>> {
        Ok(self.urls.get(code.as_str()).map(|r| r.value().clone()))
    }

    async fn exists(&self, code: &ShortCode) -> Result<bool> {
        Ok(self.urls.contains_key(code.as_str()))
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<UrlRecord>> {
        let mut records: Vec<UrlRecord> = self.urls.iter().map(|r| r.value().clone()).collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        records.truncate(limit);
        Ok(records)
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn insert(&self, record: NewUrlRecord) -> Result<UrlRecord> {
        match self.urls.entry(record.short_code.as_str().to_owned()) {
            Entry::Occupied(_) => Err(StorageError::Conflict(record.short_code.to_string())),
            Entry::Vacant(slot) => {
                let stored = UrlRecord {
                    id: self.next_url_id.fetch_add(1, Ordering::SeqCst) + 1,
                    short_code: record.short_code.as_str().to_owned(),
                    custom_alias: record.custom_alias(),
                    original_url: record.original_url,
                    created_at: record.created_at,
                    clicks: 0,
                };
                slot.insert(stored.clone());
                Ok(stored)
            }
        }
    }

    async fn increment_clicks(&self, code: &ShortCode) -> Result<bool> {
        match self.urls.get_mut(code.as_str()) {
            Some(mut record) => {
                record.clicks += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl ClickRepository for InMemoryRepository {
    async fn record_click(&self, event: NewClickEvent) -> Result<ClickEvent> {
        let stored = ClickEvent {
            id: self.next_click_id.fetch_add(1, Ordering::SeqCst) + 1,
            short_code: event.short_code,
            user_agent: event.user_agent,
            ip: event.ip,
            referer: event.referer,
            created_at: event.created_at,
        };
        self.clicks
            .entry(stored.short_code.clone())
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }

    async fn daily_clicks(&self, code: &ShortCode, since: Timestamp) -> Result<BucketCounts> {
        Ok(self.bucketed(code, since, "%Y-%m-%d"))
    }

    async fn monthly_clicks(&self, code: &ShortCode, since: Timestamp) -> Result<BucketCounts> {
        Ok(self.bucketed(code, since, "%Y-%m"))
    }

    async fn device_clicks(&self, code: &ShortCode) -> Result<BucketCounts> {
        let mut counts = BucketCounts::new();
        if let Some(events) = self.clicks.get(code.as_str()) {
            for event in events.iter() {
                *counts
                    .entry(DeviceClass::classify(&event.user_agent).to_string())
                    .or_default() += 1;
            }
        }
        Ok(counts)
    }

    async fn recent_clicks(&self, code: &ShortCode, limit: usize) -> Result<Vec<ClickEvent>> {
        let mut events = self
            .clicks
            .get(code.as_str())
            .map(|events| events.value().clone())
            .unwrap_or_default();
        events.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        events.truncate(limit);
        Ok(events)
    }
}
