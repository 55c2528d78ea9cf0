use super::{InputMode, SessionState};
use crate::{
    models::{Answer, UserStats},
    questions::commands::get_game_questions,
    settings::GameSettings,
    AppState,
};

fn controller_from_state(state: &AppState) -> super::SessionController {
    state.session.clone()
}

/// Fetches a fresh question set and starts playing it. On failure the
/// player stays on the menu.
pub async fn start_game(state: &AppState) -> Result<SessionState, String> {
    let count = state.settings.settings().question_count;
    let questions = {
        let mut rng = rand::thread_rng();
        get_game_questions(state, count, &mut rng)
            .map_err(|e| e.to_string())?
            .questions
    };

    controller_from_state(state)
        .start_session(questions)
        .await
        .map_err(|e| e.to_string())
}

pub async fn submit_answer(state: &AppState, input: String) -> Result<Answer, String> {
    controller_from_state(state)
        .submit_answer(&input)
        .await
        .map_err(|e| e.to_string())
}

pub async fn toggle_input_mode(state: &AppState) -> Result<InputMode, String> {
    controller_from_state(state)
        .toggle_input_mode()
        .await
        .map_err(|e| e.to_string())
}

pub async fn image_loaded(state: &AppState) -> Result<(), String> {
    controller_from_state(state)
        .image_loaded()
        .await
        .map_err(|e| e.to_string())
}

pub async fn image_failed(state: &AppState, reason: String) -> Result<(), String> {
    controller_from_state(state)
        .image_failed(&reason)
        .await
        .map_err(|e| e.to_string())
}

pub async fn return_to_menu(state: &AppState) -> Result<(), String> {
    controller_from_state(state).return_to_menu().await;
    Ok(())
}

pub async fn get_session_state(state: &AppState) -> Result<Option<SessionState>, String> {
    Ok(controller_from_state(state).get_snapshot().await)
}

pub fn get_user_stats(state: &AppState) -> Result<UserStats, String> {
    Ok(state.session.stats().load())
}

/// Changes how many questions the next game asks and saves it.
pub fn set_question_count(state: &AppState, count: usize) -> Result<GameSettings, String> {
    if count == 0 {
        return Err("A game needs at least one question".into());
    }
    let settings = GameSettings {
        question_count: count,
        ..state.settings.settings()
    };
    state
        .settings
        .update(settings.clone())
        .map_err(|e| e.to_string())?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionStatus;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test(start_paused = true)]
    async fn start_game_uses_configured_count() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("settings.json"),
            r#"{"question_count": 1}"#,
        )
        .unwrap();
        let state = AppState::new(dir.path()).unwrap();

        let session = start_game(&state).await.unwrap();
        assert_eq!(session.questions.len(), 1);
        assert_eq!(session.status, SessionStatus::InProgress);

        let correct = session.questions[0].correct_answer.clone();
        let answer = submit_answer(&state, correct).await.unwrap();
        assert!(answer.is_correct);

        return_to_menu(&state).await.unwrap();
        assert!(get_session_state(&state).await.unwrap().is_none());
        assert_eq!(get_user_stats(&state).unwrap().games_played, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn question_count_change_applies_to_next_game() {
        let dir = tempdir().unwrap();
        let state = AppState::new(dir.path()).unwrap();

        assert!(set_question_count(&state, 0).is_err());
        assert_eq!(set_question_count(&state, 1).unwrap().question_count, 1);

        let session = start_game(&state).await.unwrap();
        assert_eq!(session.questions.len(), 1);

        let saved = fs::read_to_string(dir.path().join("settings.json")).unwrap();
        assert!(saved.contains("\"question_count\": 1"));
        return_to_menu(&state).await.unwrap();
    }

    #[tokio::test]
    async fn start_game_fails_without_playable_brands() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("brand-images.json"),
            r#"{"Audi": {"description": "no picture"}}"#,
        )
        .unwrap();
        let state = AppState::new(dir.path()).unwrap();

        assert!(start_game(&state).await.is_err());
        assert!(get_session_state(&state).await.unwrap().is_none());
    }
}
