use super::{store::ImageUpdate, store::ImageUpdated, Catalog, CatalogError};
use crate::{api_error::ApiError, AppState};

/// Brand images straight from the catalog file, bypassing the cache.
pub fn get_brand_images(state: &AppState) -> Result<Catalog, ApiError> {
    state.catalog.read_file().map_err(|err| {
        log::error!("Error reading brand images: {err:#}");
        ApiError::new(500, "Failed to load brand images")
    })
}

pub fn update_image(state: &AppState, request: ImageUpdate) -> Result<ImageUpdated, ApiError> {
    state.catalog.update_image(request).map_err(|err| {
        if let CatalogError::Storage(inner) = &err {
            log::error!("Error updating image: {inner:#}");
        }
        ApiError::from(err)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn app_with_catalog(contents: &str) -> (tempfile::TempDir, AppState) {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("brand-images.json"), contents).unwrap();
        let state = AppState::new(dir.path()).unwrap();
        (dir, state)
    }

    #[test]
    fn brand_images_reports_500_on_corrupt_file() {
        let (_dir, state) = app_with_catalog("][");
        let err = get_brand_images(&state).unwrap_err();
        assert_eq!(err, ApiError::new(500, "Failed to load brand images"));
    }

    #[test]
    fn update_maps_errors_to_status_codes() {
        let (_dir, state) = app_with_catalog(r#"{"Mini": {"imageUrl": "https://img/mini.jpg"}}"#);

        let missing = update_image(&state, ImageUpdate::default()).unwrap_err();
        assert_eq!(missing.status, 400);

        let unknown = update_image(
            &state,
            ImageUpdate {
                brand: Some("Trabant".into()),
                image_url: Some("https://img/t.jpg".into()),
                description: None,
            },
        )
        .unwrap_err();
        assert_eq!(unknown.status, 404);
        assert_eq!(unknown.error, "Brand Trabant not found in database");

        let ok = update_image(
            &state,
            ImageUpdate {
                brand: Some("Mini".into()),
                image_url: Some("https://img/mini-2.jpg".into()),
                description: Some("Cooper S".into()),
            },
        )
        .unwrap();
        assert_eq!(ok.description.as_deref(), Some("Cooper S"));
        assert_eq!(
            get_brand_images(&state).unwrap()["Mini"].image_url,
            "https://img/mini-2.jpg"
        );
    }
}
