use log::warn;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::build_question_set;
use crate::{api_error::ApiError, catalog::CatalogStore, models::Question, AppState};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSetResponse {
    pub success: bool,
    pub questions: Vec<Question>,
    pub total_questions: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum QuestionSourceError {
    #[error("Failed to generate game questions: no playable brand in the catalog")]
    NoEligibleBrands,
}

impl QuestionSourceError {
    pub fn status_code(&self) -> u16 {
        500
    }
}

/// Question source: a fresh randomized set drawn from the cached catalog.
pub fn game_questions<R: Rng + ?Sized>(
    catalog: &CatalogStore,
    count: usize,
    rng: &mut R,
) -> Result<QuestionSetResponse, QuestionSourceError> {
    let brands = catalog.load();
    let questions = build_question_set(&brands, count, rng);

    if questions.is_empty() {
        return Err(QuestionSourceError::NoEligibleBrands);
    }
    if questions.len() < count {
        warn!(
            "Only {} of {} requested questions available",
            questions.len(),
            count
        );
    }

    Ok(QuestionSetResponse {
        success: true,
        total_questions: questions.len(),
        questions,
    })
}

pub fn get_game_questions<R: Rng + ?Sized>(
    state: &AppState,
    count: usize,
    rng: &mut R,
) -> Result<QuestionSetResponse, ApiError> {
    game_questions(&state.catalog, count, rng).map_err(|err| {
        log::error!("Error generating game questions: {err}");
        ApiError::from(err)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn serves_requested_count() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("brand-images.json");
        let body: serde_json::Map<String, serde_json::Value> = (0..30)
            .map(|i| {
                (
                    format!("Brand{i}"),
                    serde_json::json!({ "imageUrl": format!("https://img/{i}.jpg") }),
                )
            })
            .collect();
        fs::write(&path, serde_json::to_string(&body).unwrap()).unwrap();

        let store = CatalogStore::new(path);
        let response = game_questions(&store, 20, &mut StdRng::seed_from_u64(5)).unwrap();

        assert!(response.success);
        assert_eq!(response.total_questions, 20);
        assert_eq!(response.questions.len(), 20);
    }

    #[test]
    fn missing_catalog_serves_defaults() {
        let dir = tempdir().unwrap();
        let store = CatalogStore::new(dir.path().join("absent.json"));

        let response = game_questions(&store, 20, &mut StdRng::seed_from_u64(5)).unwrap();
        assert_eq!(response.total_questions, 2);
    }

    #[test]
    fn catalog_without_images_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("brand-images.json");
        fs::write(&path, r#"{"Audi": {"imageUrl": ""}}"#).unwrap();

        let store = CatalogStore::new(path);
        let err = game_questions(&store, 20, &mut StdRng::seed_from_u64(5)).unwrap_err();
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn lone_brand_catalog_is_an_api_error() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("brand-images.json"),
            r#"{"Audi": {"imageUrl": "https://img/audi.jpg"}}"#,
        )
        .unwrap();
        let state = AppState::new(dir.path()).unwrap();

        let err = get_game_questions(&state, 20, &mut StdRng::seed_from_u64(5)).unwrap_err();
        assert_eq!(err.status, 500);
        assert!(err.error.contains("Failed to generate game questions"));
    }
}
