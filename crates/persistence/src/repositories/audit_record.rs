//! Audit record repository for database operations.

use domain::models::{AuditRecord, NewAuditRecord};
use domain::services::AuditStore;
use domain::DomainError;
use sqlx::PgPool;

use crate::entities::AuditRecordEntity;
use crate::metrics::{record_audit_append, QueryTimer};

/// Repository for the append-only content_parser_history table.
#[derive(Clone)]
pub struct AuditRecordRepository {
    pool: PgPool,
}

impl AuditRecordRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new audit record.
    ///
    /// `details` is serialized to text here; a value that cannot be serialized
    /// surfaces as an encode error.
    pub async fn insert(&self, input: &NewAuditRecord) -> Result<AuditRecord, sqlx::Error> {
        let details = input
            .details
            .to_json()
            .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

        let result = sqlx::query_as::<_, AuditRecordEntity>(
            r#"
            INSERT INTO content_parser_history (
                media_id, source, status, details, start_time, end_time,
                items_processed, errors
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, media_id, source, status, details, start_time, end_time,
                      items_processed, errors
            "#,
        )
        .bind(input.media_id)
        .bind(&input.source)
        .bind(input.status.as_str())
        .bind(details)
        .bind(input.start_time)
        .bind(input.end_time)
        .bind(input.items_processed)
        .bind(&input.errors)
        .fetch_one(&self.pool)
        .await;

        record_audit_append(input.status.as_str(), result.is_ok());
        Ok(result?.into())
    }

    /// Records for one catalog item, newest first, at most `limit`.
    pub async fn list_for_media(
        &self,
        media_id: i64,
        limit: i64,
    ) -> Result<Vec<AuditRecord>, sqlx::Error> {
        let timer = QueryTimer::new("list_history_for_media");
        let rows = sqlx::query_as::<_, AuditRecordEntity>(
            r#"
            SELECT id, media_id, source, status, details, start_time, end_time,
                   items_processed, errors
            FROM content_parser_history
            WHERE media_id = $1
            ORDER BY start_time DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(media_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await;
        timer.record();

        Ok(rows?.into_iter().map(AuditRecord::from).collect())
    }

    /// Total number of records for a catalog item.
    pub async fn count_for_media(&self, media_id: i64) -> Result<i64, sqlx::Error> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) as count
            FROM content_parser_history
            WHERE media_id = $1
            "#,
        )
        .bind(media_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count.0)
    }
}

#[async_trait::async_trait]
impl AuditStore for AuditRecordRepository {
    async fn append(&self, record: NewAuditRecord) -> Result<AuditRecord, DomainError> {
        self.insert(&record).await.map_err(DomainError::store)
    }

    async fn list_for_media(
        &self,
        media_id: i64,
        limit: i64,
    ) -> Result<Vec<AuditRecord>, DomainError> {
        AuditRecordRepository::list_for_media(self, media_id, limit)
            .await
            .map_err(DomainError::store)
    }
}
