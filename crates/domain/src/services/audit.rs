//! Change audit log for catalog items.
//!
//! Records creation/update events and serves per-item history back. Audit
//! logging is best-effort: storage failures are logged and swallowed so the
//! primary write path is never aborted by it.

use std::sync::Arc;

use chrono::Utc;
use indexmap::IndexSet;

use crate::models::{
    CatalogItem, FieldChange, FieldSet, HistoryEntry, ImageField, NewAuditRecord,
};
use crate::services::audit_store::{AuditStore, CatalogLookup};
use crate::services::diff::shallow_diff;

/// Default maximum number of records returned by a history read.
pub const DEFAULT_HISTORY_LIMIT: i64 = 100;

/// Append-only change log over an [`AuditStore`], resolving items through a
/// [`CatalogLookup`].
pub struct ChangeAuditLog<S: ?Sized, C: ?Sized> {
    store: Arc<S>,
    catalog: Arc<C>,
    history_limit: i64,
}

impl<S: ?Sized, C: ?Sized> Clone for ChangeAuditLog<S, C> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            catalog: Arc::clone(&self.catalog),
            history_limit: self.history_limit,
        }
    }
}

impl<S, C> ChangeAuditLog<S, C>
where
    S: AuditStore + ?Sized,
    C: CatalogLookup + ?Sized,
{
    pub fn new(store: Arc<S>, catalog: Arc<C>) -> Self {
        Self {
            store,
            catalog,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Cap the number of records a history read returns.
    pub fn with_history_limit(mut self, limit: i64) -> Self {
        self.history_limit = limit.max(1);
        self
    }

    pub fn history_limit(&self) -> i64 {
        self.history_limit
    }

    /// Record that `item` was created.
    pub async fn record_creation(&self, item: &CatalogItem) {
        let record = NewAuditRecord::created(item, Utc::now());
        match self.store.append(record).await {
            Ok(stored) => {
                tracing::debug!(
                    audit_id = stored.id,
                    media_id = item.id,
                    "Recorded catalog item creation"
                );
            }
            Err(e) => {
                tracing::error!(
                    media_id = item.id,
                    error = %e,
                    "Failed to record catalog item creation"
                );
            }
        }
    }

    /// Record field changes for an existing item.
    ///
    /// Silently does nothing when the item does not exist or `changes` is empty.
    pub async fn record_update(&self, media_id: i64, changes: Vec<FieldChange>) {
        if changes.is_empty() {
            return;
        }

        let item = match self.catalog.find_item(media_id).await {
            Ok(Some(item)) => item,
            Ok(None) => {
                tracing::debug!(media_id, "Skipping audit update for unknown catalog item");
                return;
            }
            Err(e) => {
                tracing::error!(media_id, error = %e, "Failed to look up catalog item for audit");
                return;
            }
        };

        let changed = changes.len();
        let record = NewAuditRecord::updated(&item, changes, Utc::now());
        match self.store.append(record).await {
            Ok(stored) => {
                tracing::debug!(
                    audit_id = stored.id,
                    media_id,
                    changed,
                    "Recorded catalog item update"
                );
            }
            Err(e) => {
                tracing::error!(media_id, error = %e, "Failed to record catalog item update");
            }
        }
    }

    /// Diff `new_fields` against `old_item` and record the result.
    ///
    /// Nothing is written when no field differs. Returns the detected changes.
    pub async fn diff_and_record(
        &self,
        old_item: &CatalogItem,
        new_fields: &FieldSet,
    ) -> Vec<FieldChange> {
        let changes = shallow_diff(old_item, new_fields);
        if !changes.is_empty() {
            self.record_update(old_item.id, changes.clone()).await;
        }
        changes
    }

    /// History of one item, newest first.
    ///
    /// Storage failures and unknown ids yield an empty history.
    pub async fn get_history(&self, media_id: i64) -> impl Iterator<Item = HistoryEntry> {
        let records = self
            .store
            .list_for_media(media_id, self.history_limit)
            .await
            .unwrap_or_else(|e| {
                tracing::error!(media_id, error = %e, "Failed to load audit history");
                Vec::new()
            });

        records.into_iter().map(HistoryEntry::from)
    }

    /// Every distinct poster URL the item has held, current value first.
    pub async fn list_poster_history(&self, media_id: i64) -> IndexSet<String> {
        self.list_image_history(media_id, ImageField::Poster).await
    }

    /// Every distinct backdrop URL the item has held, current value first.
    pub async fn list_backdrop_history(&self, media_id: i64) -> IndexSet<String> {
        self.list_image_history(media_id, ImageField::Backdrop).await
    }

    async fn list_image_history(&self, media_id: i64, field: ImageField) -> IndexSet<String> {
        let mut urls = IndexSet::new();

        let item = match self.catalog.find_item(media_id).await {
            Ok(Some(item)) => item,
            Ok(None) => return urls,
            Err(e) => {
                tracing::error!(media_id, error = %e, "Failed to look up catalog item");
                return urls;
            }
        };

        if let Some(current) = field.current_value(&item).filter(|v| !v.is_empty()) {
            urls.insert(current.to_string());
        }

        let name = field.field_name();
        for entry in self.get_history(media_id).await {
            for change in entry.changes.iter().filter(|c| c.field == name) {
                if let Some(old) = change.old_value.as_str().filter(|v| !v.is_empty()) {
                    urls.insert(old.to_string());
                }
            }
        }

        urls
    }
}
