//! Catalog item entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{CatalogItem, MediaType};
use domain::DomainError;
use sqlx::FromRow;

/// Database row mapping for the catalog_items table.
#[derive(Debug, Clone, FromRow)]
pub struct CatalogItemEntity {
    pub id: i64,
    pub title: String,
    pub original_title: Option<String>,
    pub media_type: String,
    pub description: Option<String>,
    pub release_year: Option<i32>,
    pub rating: Option<f64>,
    pub genres: Vec<String>,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub source: Option<String>,
    pub external_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<CatalogItemEntity> for CatalogItem {
    type Error = DomainError;

    fn try_from(entity: CatalogItemEntity) -> Result<Self, Self::Error> {
        let media_type = entity
            .media_type
            .parse::<MediaType>()
            .map_err(DomainError::InvalidField)?;

        Ok(Self {
            id: entity.id,
            title: entity.title,
            original_title: entity.original_title,
            media_type,
            description: entity.description,
            release_year: entity.release_year,
            rating: entity.rating,
            genres: entity.genres,
            poster_url: entity.poster_url,
            backdrop_url: entity.backdrop_url,
            source: entity.source,
            external_id: entity.external_id,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }
}
