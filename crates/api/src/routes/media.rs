//! Catalog item routes with change history.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use domain::models::{CatalogItem, CreateCatalogItemRequest, FieldChange, FieldSet, HistoryEntry};
use serde::Serialize;
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::{record_catalog_item_created, record_catalog_item_updated};
use crate::middleware::RequestId;

/// Create catalog item router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::post(create_media))
        .route("/:media_id", get(get_media).patch(update_media))
        .route("/:media_id/history", get(get_history))
        .route("/:media_id/posters", get(list_posters))
        .route("/:media_id/backdrops", get(list_backdrops))
}

/// Response for a partial update.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMediaResponse {
    pub item: CatalogItem,
    pub changes: Vec<FieldChange>,
}

/// Change history of one catalog item, newest first.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub media_id: i64,
    pub history: Vec<HistoryEntry>,
}

/// Distinct image URLs an item has carried, current one first.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageHistoryResponse {
    pub media_id: i64,
    pub urls: Vec<String>,
}

fn request_id(ext: &Option<Extension<RequestId>>) -> &str {
    ext.as_ref().map(|Extension(id)| id.0.as_str()).unwrap_or("-")
}

/// Re-run the creation rules against a patched item.
fn validate_patched(item: &CatalogItem) -> Result<(), ApiError> {
    CreateCatalogItemRequest {
        title: item.title.clone(),
        original_title: item.original_title.clone(),
        media_type: item.media_type,
        description: item.description.clone(),
        release_year: item.release_year,
        rating: item.rating,
        genres: item.genres.clone(),
        poster_url: item.poster_url.clone(),
        backdrop_url: item.backdrop_url.clone(),
        source: item.source.clone(),
        external_id: item.external_id.clone(),
    }
    .validate()?;
    Ok(())
}

/// Create a catalog item and record its creation.
#[axum::debug_handler]
pub async fn create_media(
    State(state): State<AppState>,
    req_id: Option<Extension<RequestId>>,
    Json(request): Json<CreateCatalogItemRequest>,
) -> Result<(StatusCode, Json<CatalogItem>), ApiError> {
    request.validate()?;

    let item = state.catalog.create(&request).await?;
    state.audit_log.record_creation(&item).await;
    record_catalog_item_created();

    info!(
        request_id = %request_id(&req_id),
        media_id = item.id,
        title = %item.title,
        "Catalog item created"
    );

    Ok((StatusCode::CREATED, Json(item)))
}

/// Fetch a catalog item.
#[axum::debug_handler]
pub async fn get_media(
    State(state): State<AppState>,
    Path(media_id): Path<i64>,
) -> Result<Json<CatalogItem>, ApiError> {
    state
        .catalog
        .find_by_id(media_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Catalog item not found".to_string()))
}

/// Apply a partial update.
///
/// The field set is validated against the current item before anything is
/// recorded. The diff is written to the audit log ahead of the row update;
/// a failed audit write never blocks the update.
#[axum::debug_handler]
pub async fn update_media(
    State(state): State<AppState>,
    Path(media_id): Path<i64>,
    req_id: Option<Extension<RequestId>>,
    Json(fields): Json<FieldSet>,
) -> Result<Json<UpdateMediaResponse>, ApiError> {
    if fields.is_empty() {
        return Err(ApiError::Validation(
            "Request body must contain at least one field".to_string(),
        ));
    }

    let current = state
        .catalog
        .find_by_id(media_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Catalog item not found".to_string()))?;

    let patched = current.apply(&fields)?;
    validate_patched(&patched)?;

    let changes = state.audit_log.diff_and_record(&current, &fields).await;
    record_catalog_item_updated(changes.len());

    let item = if changes.is_empty() {
        current
    } else {
        state
            .catalog
            .update(&patched)
            .await?
            .ok_or_else(|| ApiError::NotFound("Catalog item not found".to_string()))?
    };

    info!(
        request_id = %request_id(&req_id),
        media_id,
        changed_fields = changes.len(),
        "Catalog item updated"
    );

    Ok(Json(UpdateMediaResponse { item, changes }))
}

/// Change history of a catalog item.
///
/// Unknown ids yield an empty history rather than 404.
#[axum::debug_handler]
pub async fn get_history(
    State(state): State<AppState>,
    Path(media_id): Path<i64>,
) -> Json<HistoryResponse> {
    let history = state.audit_log.get_history(media_id).await.collect();
    Json(HistoryResponse { media_id, history })
}

/// Poster URLs the item has carried.
#[axum::debug_handler]
pub async fn list_posters(
    State(state): State<AppState>,
    Path(media_id): Path<i64>,
) -> Json<ImageHistoryResponse> {
    let urls = state.audit_log.list_poster_history(media_id).await;
    Json(ImageHistoryResponse {
        media_id,
        urls: urls.into_iter().collect(),
    })
}

/// Backdrop URLs the item has carried.
#[axum::debug_handler]
pub async fn list_backdrops(
    State(state): State<AppState>,
    Path(media_id): Path<i64>,
) -> Json<ImageHistoryResponse> {
    let urls = state.audit_log.list_backdrop_history(media_id).await;
    Json(ImageHistoryResponse {
        media_id,
        urls: urls.into_iter().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domain::models::MediaType;
    use serde_json::json;

    fn item() -> CatalogItem {
        let now = Utc::now();
        CatalogItem {
            id: 7,
            title: "Solaris".to_string(),
            original_title: None,
            media_type: MediaType::Movie,
            description: None,
            release_year: Some(1972),
            rating: Some(8.1),
            genres: vec!["drama".to_string()],
            poster_url: Some("https://img.example.com/p1.jpg".to_string()),
            backdrop_url: None,
            source: Some("kinopoisk".to_string()),
            external_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_validate_patched_accepts_valid_item() {
        assert!(validate_patched(&item()).is_ok());
    }

    #[test]
    fn test_validate_patched_rejects_bad_poster() {
        let mut patched = item();
        patched.poster_url = Some("not a url".to_string());
        match validate_patched(&patched) {
            Err(ApiError::InvalidFields(fields)) => {
                assert_eq!(fields.len(), 1);
                assert_eq!(fields[0].field, "poster_url");
            }
            other => panic!("expected field violations, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_patched_rejects_out_of_range_rating() {
        let mut patched = item();
        patched.rating = Some(11.0);
        assert!(validate_patched(&patched).is_err());
    }

    #[test]
    fn test_request_id_fallback() {
        assert_eq!(request_id(&None), "-");
        let ext = Some(Extension(RequestId("abc".to_string())));
        assert_eq!(request_id(&ext), "abc");
    }

    #[test]
    fn test_update_response_serialization() {
        let response = UpdateMediaResponse {
            item: item(),
            changes: vec![FieldChange {
                field: "posterUrl".to_string(),
                old_value: json!("p1"),
                new_value: json!("p2"),
            }],
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["changes"][0]["field"], "posterUrl");
        assert_eq!(value["changes"][0]["oldValue"], "p1");
        assert_eq!(value["item"]["type"], "movie");
    }

    #[test]
    fn test_image_history_response_serialization() {
        let response = ImageHistoryResponse {
            media_id: 7,
            urls: vec!["p2".to_string(), "p1".to_string()],
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["mediaId"], 7);
        assert_eq!(value["urls"], json!(["p2", "p1"]));
    }
}
