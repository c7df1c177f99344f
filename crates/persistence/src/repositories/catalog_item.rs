//! Catalog item repository for database operations.

use chrono::Utc;
use domain::models::{CatalogItem, CreateCatalogItemRequest};
use domain::services::CatalogLookup;
use domain::DomainError;
use sqlx::PgPool;

use crate::entities::CatalogItemEntity;
use crate::metrics::QueryTimer;

const CATALOG_ITEM_COLUMNS: &str = "id, title, original_title, media_type, description, \
     release_year, rating, genres, poster_url, backdrop_url, source, external_id, \
     created_at, updated_at";

fn to_domain(entity: CatalogItemEntity) -> Result<CatalogItem, sqlx::Error> {
    CatalogItem::try_from(entity).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

/// Repository for catalog item database operations.
#[derive(Clone)]
pub struct CatalogItemRepository {
    pool: PgPool,
}

impl CatalogItemRepository {
    /// Creates a new CatalogItemRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a catalog item by id.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<CatalogItem>, sqlx::Error> {
        let timer = QueryTimer::new("find_catalog_item");
        let entity = sqlx::query_as::<_, CatalogItemEntity>(&format!(
            "SELECT {CATALOG_ITEM_COLUMNS} FROM catalog_items WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();

        entity?.map(to_domain).transpose()
    }

    /// Insert a new catalog item.
    pub async fn create(
        &self,
        request: &CreateCatalogItemRequest,
    ) -> Result<CatalogItem, sqlx::Error> {
        let now = Utc::now();

        let entity = sqlx::query_as::<_, CatalogItemEntity>(&format!(
            r#"
            INSERT INTO catalog_items (
                title, original_title, media_type, description, release_year, rating,
                genres, poster_url, backdrop_url, source, external_id, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12)
            RETURNING {CATALOG_ITEM_COLUMNS}
            "#
        ))
        .bind(&request.title)
        .bind(&request.original_title)
        .bind(request.media_type.to_string())
        .bind(&request.description)
        .bind(request.release_year)
        .bind(request.rating)
        .bind(&request.genres)
        .bind(&request.poster_url)
        .bind(&request.backdrop_url)
        .bind(&request.source)
        .bind(&request.external_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        to_domain(entity)
    }

    /// Persist every mutable field of `item`, bumping `updated_at`.
    ///
    /// Returns `None` if the item no longer exists.
    pub async fn update(&self, item: &CatalogItem) -> Result<Option<CatalogItem>, sqlx::Error> {
        let entity = sqlx::query_as::<_, CatalogItemEntity>(&format!(
            r#"
            UPDATE catalog_items
            SET title = $2, original_title = $3, media_type = $4, description = $5,
                release_year = $6, rating = $7, genres = $8, poster_url = $9,
                backdrop_url = $10, source = $11, external_id = $12, updated_at = $13
            WHERE id = $1
            RETURNING {CATALOG_ITEM_COLUMNS}
            "#
        ))
        .bind(item.id)
        .bind(&item.title)
        .bind(&item.original_title)
        .bind(item.media_type.to_string())
        .bind(&item.description)
        .bind(item.release_year)
        .bind(item.rating)
        .bind(&item.genres)
        .bind(&item.poster_url)
        .bind(&item.backdrop_url)
        .bind(&item.source)
        .bind(&item.external_id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        entity.map(to_domain).transpose()
    }
}

#[async_trait::async_trait]
impl CatalogLookup for CatalogItemRepository {
    async fn find_item(&self, id: i64) -> Result<Option<CatalogItem>, DomainError> {
        self.find_by_id(id).await.map_err(DomainError::store)
    }
}
