use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Answer, UserStats};

/// Final summary of a completed session, handed to the results screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResult {
    pub session_id: String,
    pub score: u32,
    pub correct_answers: u32,
    pub total_answers: u32,
    pub accuracy_percent: u32,
    pub best_streak: u32,
    pub answers: Vec<Answer>,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub stats: UserStats,
    pub is_new_high_score: bool,
}

/// Longest run of consecutive correct answers.
pub fn best_streak(answers: &[Answer]) -> u32 {
    let mut best = 0;
    let mut run = 0;
    for answer in answers {
        if answer.is_correct {
            run += 1;
            best = best.max(run);
        } else {
            run = 0;
        }
    }
    best
}

pub fn accuracy_percent(correct: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    ((f64::from(correct) / f64::from(total)) * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(is_correct: bool) -> Answer {
        Answer {
            question_id: 1,
            user_answer: "x".into(),
            correct_answer: "x".into(),
            is_correct,
            points_awarded: 0,
            response_time_seconds: 1.0,
        }
    }

    #[test]
    fn best_streak_finds_longest_run() {
        let log: Vec<Answer> = [true, true, false, true, true, true, false, true]
            .into_iter()
            .map(answer)
            .collect();
        assert_eq!(best_streak(&log), 3);
        assert_eq!(best_streak(&[]), 0);
    }

    #[test]
    fn accuracy_rounds_to_nearest() {
        assert_eq!(accuracy_percent(2, 3), 67);
        assert_eq!(accuracy_percent(0, 0), 0);
        assert_eq!(accuracy_percent(20, 20), 100);
    }
}
