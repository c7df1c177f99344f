//! Common validation utilities.

use url::Url;
use validator::ValidationError;

/// Maximum number of genres attached to a single catalog item.
const MAX_GENRES: usize = 20;

/// Maximum length of a single genre label.
const MAX_GENRE_LENGTH: usize = 50;

/// Validates that an image URL is an absolute http(s) URL.
///
/// Poster and backdrop URLs come from external metadata providers and are
/// rendered directly by clients, so relative paths and other schemes are
/// rejected.
pub fn validate_image_url(value: &str) -> Result<(), ValidationError> {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host().is_some() => Ok(()),
        _ => {
            let mut err = ValidationError::new("image_url");
            err.message = Some("Image URL must be an absolute http or https URL".into());
            Err(err)
        }
    }
}

/// Validates the genre list: bounded size, no blank or oversized labels.
pub fn validate_genres(genres: &[String]) -> Result<(), ValidationError> {
    if genres.len() > MAX_GENRES {
        let mut err = ValidationError::new("genres_count");
        err.message = Some(format!("At most {} genres are allowed", MAX_GENRES).into());
        return Err(err);
    }

    if genres
        .iter()
        .any(|g| g.trim().is_empty() || g.chars().count() > MAX_GENRE_LENGTH)
    {
        let mut err = ValidationError::new("genre_label");
        err.message = Some(
            format!(
                "Genre labels must be non-blank and at most {} characters",
                MAX_GENRE_LENGTH
            )
            .into(),
        );
        return Err(err);
    }

    Ok(())
}
