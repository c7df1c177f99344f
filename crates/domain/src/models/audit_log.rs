//! Change audit log domain models.
//!
//! One audit record is written per observed creation or update of a catalog
//! item. Records are append-only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::catalog_item::{CatalogItem, MediaType};

/// Source recorded when the catalog item carries no provenance tag.
pub const UNKNOWN_SOURCE: &str = "unknown";

/// Status written to an audit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    Created,
    Updated,
}

impl AuditStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditStatus::Created => "created",
            AuditStatus::Updated => "updated",
        }
    }
}

impl std::fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field's before/after values within an update event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldChange {
    pub field: String,
    pub old_value: JsonValue,
    pub new_value: JsonValue,
}

impl FieldChange {
    /// Create a new field change.
    pub fn new(field: impl Into<String>, old_value: JsonValue, new_value: JsonValue) -> Self {
        Self {
            field: field.into(),
            old_value,
            new_value,
        }
    }
}

/// Payload persisted in an audit record's `details` column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditDetails {
    #[serde(rename_all = "camelCase")]
    Created {
        media_id: i64,
        title: String,
        #[serde(rename = "type")]
        media_type: MediaType,
        source: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Updated {
        media_id: i64,
        title: String,
        changes: Vec<FieldChange>,
    },
}

impl AuditDetails {
    pub fn media_id(&self) -> i64 {
        match self {
            AuditDetails::Created { media_id, .. } | AuditDetails::Updated { media_id, .. } => {
                *media_id
            }
        }
    }

    pub fn title(&self) -> &str {
        match self {
            AuditDetails::Created { title, .. } | AuditDetails::Updated { title, .. } => title,
        }
    }

    /// Field changes carried by the event; creations have none.
    pub fn changes(&self) -> &[FieldChange] {
        match self {
            AuditDetails::Created { .. } => &[],
            AuditDetails::Updated { changes, .. } => changes,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decode stored details, returning `None` for malformed text.
    pub fn parse(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }
}

/// Input for appending a new audit record.
#[derive(Debug, Clone)]
pub struct NewAuditRecord {
    pub media_id: i64,
    pub source: String,
    pub status: AuditStatus,
    pub details: AuditDetails,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub items_processed: i32,
    pub errors: Vec<String>,
}

impl NewAuditRecord {
    fn observed(
        item: &CatalogItem,
        status: AuditStatus,
        details: AuditDetails,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            media_id: item.id,
            source: item
                .source
                .clone()
                .unwrap_or_else(|| UNKNOWN_SOURCE.to_string()),
            status,
            details,
            start_time: at,
            end_time: at,
            items_processed: 1,
            errors: Vec::new(),
        }
    }

    /// Record for an item that was just created.
    pub fn created(item: &CatalogItem, at: DateTime<Utc>) -> Self {
        let details = AuditDetails::Created {
            media_id: item.id,
            title: item.title.clone(),
            media_type: item.media_type,
            source: item.source.clone(),
        };
        Self::observed(item, AuditStatus::Created, details, at)
    }

    /// Record for a set of field changes applied to an existing item.
    pub fn updated(item: &CatalogItem, changes: Vec<FieldChange>, at: DateTime<Utc>) -> Self {
        let details = AuditDetails::Updated {
            media_id: item.id,
            title: item.title.clone(),
            changes,
        };
        Self::observed(item, AuditStatus::Updated, details, at)
    }
}

/// An audit record as stored. `status` and `details` are kept in their
/// persisted text form; use [`HistoryEntry`] for a decoded view.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditRecord {
    pub id: i64,
    pub media_id: i64,
    pub source: String,
    pub status: String,
    pub details: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub items_processed: i32,
    pub errors: Vec<String>,
}

/// Kind of event a history entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryEntryType {
    Create,
    Update,
}

impl HistoryEntryType {
    /// Anything other than `created` is reported as an update.
    pub fn from_status(status: &str) -> Self {
        if status == AuditStatus::Created.as_str() {
            HistoryEntryType::Create
        } else {
            HistoryEntryType::Update
        }
    }
}

/// Client-facing view of one audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: i64,
    #[serde(rename = "type")]
    pub entry_type: HistoryEntryType,
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub title: Option<String>,
    pub changes: Vec<FieldChange>,
}

impl From<AuditRecord> for HistoryEntry {
    fn from(record: AuditRecord) -> Self {
        let details = AuditDetails::parse(&record.details);
        if details.is_none() {
            tracing::warn!(
                audit_id = record.id,
                media_id = record.media_id,
                "Malformed audit details, substituting empty details"
            );
        }

        if let Some(details) = details.as_ref().filter(|d| d.media_id() != record.media_id) {
            tracing::warn!(
                audit_id = record.id,
                media_id = record.media_id,
                details_media_id = details.media_id(),
                "Audit details name a different media item"
            );
        }

        let (title, changes) = match &details {
            Some(details) => (Some(details.title().to_string()), details.changes().to_vec()),
            None => (None, Vec::new()),
        };

        Self {
            id: record.id,
            entry_type: HistoryEntryType::from_status(&record.status),
            timestamp: record.start_time,
            source: record.source,
            title,
            changes,
        }
    }
}

/// Image fields whose historical values can be listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageField {
    Poster,
    Backdrop,
}

impl ImageField {
    /// Name of the field as it appears in field sets and field changes.
    pub fn field_name(&self) -> &'static str {
        match self {
            ImageField::Poster => "posterUrl",
            ImageField::Backdrop => "backdropUrl",
        }
    }

    pub fn current_value<'a>(&self, item: &'a CatalogItem) -> Option<&'a str> {
        match self {
            ImageField::Poster => item.poster_url.as_deref(),
            ImageField::Backdrop => item.backdrop_url.as_deref(),
        }
    }
}
