//! Storage seams used by the change audit log.
//!
//! The persistence crate implements these against PostgreSQL; the in-memory
//! store below backs tests and local development.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use tokio::sync::RwLock;

use crate::error::DomainError;
use crate::models::{AuditRecord, CatalogItem, NewAuditRecord};

/// Append-only store of audit records.
#[async_trait::async_trait]
pub trait AuditStore: Send + Sync {
    /// Append one audit record and return it as stored.
    async fn append(&self, record: NewAuditRecord) -> Result<AuditRecord, DomainError>;

    /// Records for one catalog item, newest first (`start_time` descending,
    /// ties newest-inserted first), at most `limit` of them.
    async fn list_for_media(
        &self,
        media_id: i64,
        limit: i64,
    ) -> Result<Vec<AuditRecord>, DomainError>;
}

/// Point lookup of live catalog items.
#[async_trait::async_trait]
pub trait CatalogLookup: Send + Sync {
    async fn find_item(&self, id: i64) -> Result<Option<CatalogItem>, DomainError>;
}

/// In-memory audit store and catalog for development and testing.
#[derive(Debug, Default)]
pub struct InMemoryAuditStore {
    records: RwLock<Vec<AuditRecord>>,
    items: RwLock<HashMap<i64, CatalogItem>>,
    next_id: AtomicI64,
    /// Whether to simulate storage failures for testing.
    pub simulate_failure: bool,
}

impl InMemoryAuditStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose every operation fails.
    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
            ..Self::default()
        }
    }

    /// Insert or replace a live catalog item.
    pub async fn put_item(&self, item: CatalogItem) {
        self.items.write().await.insert(item.id, item);
    }

    /// Insert an already-stored record verbatim, e.g. one with corrupt details.
    pub async fn push_raw(&self, mut record: AuditRecord) -> AuditRecord {
        record.id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.records.write().await.push(record.clone());
        record
    }

    /// Number of records written so far.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    fn check_available(&self) -> Result<(), DomainError> {
        if self.simulate_failure {
            tracing::warn!("In-memory audit store simulating failure");
            return Err(DomainError::Store("Simulated failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl AuditStore for InMemoryAuditStore {
    async fn append(&self, record: NewAuditRecord) -> Result<AuditRecord, DomainError> {
        self.check_available()?;

        let stored = AuditRecord {
            id: 0,
            media_id: record.media_id,
            source: record.source,
            status: record.status.to_string(),
            details: record.details.to_json()?,
            start_time: record.start_time,
            end_time: record.end_time,
            items_processed: record.items_processed,
            errors: record.errors,
        };
        Ok(self.push_raw(stored).await)
    }

    async fn list_for_media(
        &self,
        media_id: i64,
        limit: i64,
    ) -> Result<Vec<AuditRecord>, DomainError> {
        self.check_available()?;

        let mut matching: Vec<AuditRecord> = self
            .records
            .read()
            .await
            .iter()
            .filter(|r| r.media_id == media_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.start_time.cmp(&a.start_time).then(b.id.cmp(&a.id)));
        matching.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(matching)
    }
}

#[async_trait::async_trait]
impl CatalogLookup for InMemoryAuditStore {
    async fn find_item(&self, id: i64) -> Result<Option<CatalogItem>, DomainError> {
        self.check_available()?;
        Ok(self.items.read().await.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AuditStatus, MediaType};
    use chrono::{Duration, Utc};

    fn item(id: i64) -> CatalogItem {
        let now = Utc::now();
        CatalogItem {
            id,
            title: format!("Item {}", id),
            original_title: None,
            media_type: MediaType::Movie,
            description: None,
            release_year: None,
            rating: None,
            genres: vec![],
            poster_url: None,
            backdrop_url: None,
            source: Some("omdb".to_string()),
            external_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_append_assigns_increasing_ids() {
        let store = InMemoryAuditStore::new();
        let first = store
            .append(NewAuditRecord::created(&item(1), Utc::now()))
            .await
            .unwrap();
        let second = store
            .append(NewAuditRecord::created(&item(2), Utc::now()))
            .await
            .unwrap();
        assert!(second.id > first.id);
        assert_eq!(first.status, AuditStatus::Created.as_str());
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_list_filters_by_exact_media_id() {
        let store = InMemoryAuditStore::new();
        store
            .append(NewAuditRecord::created(&item(1), Utc::now()))
            .await
            .unwrap();
        store
            .append(NewAuditRecord::created(&item(21), Utc::now()))
            .await
            .unwrap();

        let records = store.list_for_media(1, 100).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].media_id, 1);
    }

    #[tokio::test]
    async fn test_list_orders_newest_first_and_caps() {
        let store = InMemoryAuditStore::new();
        let base = Utc::now();
        for offset in [2, 0, 1] {
            store
                .append(NewAuditRecord::created(
                    &item(5),
                    base + Duration::seconds(offset),
                ))
                .await
                .unwrap();
        }

        let records = store.list_for_media(5, 2).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].start_time, base + Duration::seconds(2));
        assert_eq!(records[1].start_time, base + Duration::seconds(1));
    }

    #[tokio::test]
    async fn test_failing_store() {
        let store = InMemoryAuditStore::failing();
        assert!(store
            .append(NewAuditRecord::created(&item(1), Utc::now()))
            .await
            .is_err());
        assert!(store.find_item(1).await.is_err());
    }
}
