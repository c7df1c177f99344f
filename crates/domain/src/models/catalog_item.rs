//! Catalog item domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::str::FromStr;
use validator::Validate;

use crate::error::DomainError;

/// An insertion-ordered set of catalog fields keyed by their JSON name.
///
/// Absence of a key means "unchanged", never "cleared".
pub type FieldSet = Map<String, JsonValue>;

/// Fields that belong to the storage layer and cannot be set through a field set.
const PROTECTED_FIELDS: &[&str] = &["id", "createdAt", "updatedAt"];

/// Kind of media a catalog item describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Movie,
    Series,
}

impl FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "movie" | "film" => Ok(MediaType::Movie),
            "series" | "tv" | "tv_series" => Ok(MediaType::Series),
            _ => Err(format!("Unknown media type: {}", s)),
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaType::Movie => write!(f, "movie"),
            MediaType::Series => write!(f, "series"),
        }
    }
}

/// A movie or series tracked by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: i64,
    pub title: String,
    pub original_title: Option<String>,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub description: Option<String>,
    pub release_year: Option<i32>,
    pub rating: Option<f64>,
    #[serde(default)]
    pub genres: Vec<String>,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    /// Provenance tag describing where the item was ingested from.
    pub source: Option<String>,
    /// Identifier of the item at its upstream provider.
    pub external_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CatalogItem {
    /// JSON projection of the item, keyed the same way field sets are.
    pub fn to_field_set(&self) -> Result<FieldSet, DomainError> {
        match serde_json::to_value(self)? {
            JsonValue::Object(map) => Ok(map),
            other => Err(DomainError::InvalidField(format!(
                "catalog item projected to a non-object value: {}",
                other
            ))),
        }
    }

    /// Returns a copy of the item with every field in `fields` overwritten.
    ///
    /// Unknown and storage-owned fields are rejected, as are values that do not
    /// decode into the field's type.
    pub fn apply(&self, fields: &FieldSet) -> Result<CatalogItem, DomainError> {
        let mut projection = self.to_field_set()?;

        for (key, value) in fields {
            if PROTECTED_FIELDS.contains(&key.as_str()) {
                return Err(DomainError::InvalidField(format!(
                    "{} cannot be modified",
                    key
                )));
            }
            match projection.get_mut(key) {
                Some(slot) => *slot = value.clone(),
                None => {
                    return Err(DomainError::InvalidField(format!("unknown field {}", key)));
                }
            }
        }

        Ok(serde_json::from_value(JsonValue::Object(projection))?)
    }
}

/// Request payload for creating a catalog item.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCatalogItemRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: String,

    #[validate(length(max = 255, message = "Original title must be at most 255 characters"))]
    pub original_title: Option<String>,

    #[serde(rename = "type")]
    pub media_type: MediaType,

    pub description: Option<String>,

    #[validate(range(min = 1870, max = 2100, message = "Release year must be between 1870 and 2100"))]
    pub release_year: Option<i32>,

    #[validate(range(min = 0.0, max = 10.0, message = "Rating must be between 0 and 10"))]
    pub rating: Option<f64>,

    #[serde(default)]
    #[validate(custom(function = "shared::validation::validate_genres"))]
    pub genres: Vec<String>,

    #[validate(custom(function = "shared::validation::validate_image_url"))]
    pub poster_url: Option<String>,

    #[validate(custom(function = "shared::validation::validate_image_url"))]
    pub backdrop_url: Option<String>,

    #[validate(length(min = 1, max = 64, message = "Source must be between 1 and 64 characters"))]
    pub source: Option<String>,

    pub external_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_item() -> CatalogItem {
        let now = Utc::now();
        CatalogItem {
            id: 1,
            title: "A".to_string(),
            original_title: None,
            media_type: MediaType::Movie,
            description: None,
            release_year: Some(1999),
            rating: Some(8.7),
            genres: vec!["sci-fi".to_string()],
            poster_url: Some("p1".to_string()),
            backdrop_url: None,
            source: Some("kinopoisk".to_string()),
            external_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_media_type_from_str() {
        assert_eq!("movie".parse::<MediaType>().unwrap(), MediaType::Movie);
        assert_eq!("TV".parse::<MediaType>().unwrap(), MediaType::Series);
        assert!("podcast".parse::<MediaType>().is_err());
    }

    #[test]
    fn test_media_type_display() {
        assert_eq!(MediaType::Movie.to_string(), "movie");
        assert_eq!(MediaType::Series.to_string(), "series");
    }

    #[test]
    fn test_field_set_uses_camel_case_keys() {
        let fields = sample_item().to_field_set().unwrap();
        assert_eq!(fields.get("posterUrl"), Some(&json!("p1")));
        assert_eq!(fields.get("type"), Some(&json!("movie")));
        assert_eq!(fields.get("backdropUrl"), Some(&JsonValue::Null));
        assert!(fields.contains_key("releaseYear"));
    }

    #[test]
    fn test_apply_overwrites_named_fields_only() {
        let item = sample_item();
        let mut fields = FieldSet::new();
        fields.insert("posterUrl".to_string(), json!("p2"));
        fields.insert("rating".to_string(), JsonValue::Null);

        let updated = item.apply(&fields).unwrap();
        assert_eq!(updated.poster_url.as_deref(), Some("p2"));
        assert_eq!(updated.rating, None);
        assert_eq!(updated.title, item.title);
        assert_eq!(updated.genres, item.genres);
    }

    #[test]
    fn test_apply_rejects_protected_field() {
        let mut fields = FieldSet::new();
        fields.insert("id".to_string(), json!(99));
        let err = sample_item().apply(&fields).unwrap_err();
        assert!(err.to_string().contains("id cannot be modified"));
    }

    #[test]
    fn test_apply_rejects_unknown_field() {
        let mut fields = FieldSet::new();
        fields.insert("tagline".to_string(), json!("x"));
        assert!(matches!(
            sample_item().apply(&fields),
            Err(DomainError::InvalidField(_))
        ));
    }

    #[test]
    fn test_apply_rejects_mistyped_value() {
        let mut fields = FieldSet::new();
        fields.insert("releaseYear".to_string(), json!("nineteen"));
        assert!(matches!(
            sample_item().apply(&fields),
            Err(DomainError::Serialization(_))
        ));
    }

    #[test]
    fn test_create_request_validation() {
        let request: CreateCatalogItemRequest = serde_json::from_value(json!({
            "title": "Solaris",
            "type": "movie",
            "releaseYear": 1972,
            "rating": 8.1,
            "posterUrl": "https://img.example.com/solaris.jpg"
        }))
        .unwrap();
        assert!(request.validate().is_ok());

        let bad: CreateCatalogItemRequest = serde_json::from_value(json!({
            "title": "",
            "type": "series",
            "posterUrl": "poster.jpg"
        }))
        .unwrap();
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("poster_url"));
    }
}
