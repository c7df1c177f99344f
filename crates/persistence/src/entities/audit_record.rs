//! Audit record entity.

use chrono::{DateTime, Utc};
use domain::models::AuditRecord;
use sqlx::FromRow;

/// Database row mapping for the content_parser_history table.
#[derive(Debug, Clone, FromRow)]
pub struct AuditRecordEntity {
    pub id: i64,

    /// Catalog item the event belongs to.
    pub media_id: i64,

    /// Provenance tag of the item, `unknown` when absent.
    pub source: String,

    /// `created` or `updated`.
    pub status: String,

    /// Serialized event details; decoded lazily when history is read.
    pub details: String,

    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub items_processed: i32,
    pub errors: Vec<String>,
}

impl From<AuditRecordEntity> for AuditRecord {
    fn from(entity: AuditRecordEntity) -> Self {
        Self {
            id: entity.id,
            media_id: entity.media_id,
            source: entity.source,
            status: entity.status,
            details: entity.details,
            start_time: entity.start_time,
            end_time: entity.end_time,
            items_processed: entity.items_processed,
            errors: entity.errors,
        }
    }
}
