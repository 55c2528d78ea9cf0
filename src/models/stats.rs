use serde::{Deserialize, Serialize};

/// Lifetime play history for the local player.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct UserStats {
    pub high_score: u32,
    pub games_played: u32,
    pub total_score: u64,
    pub correct_answers: u64,
    pub total_answers: u64,
}

impl UserStats {
    /// Folds one completed game into the totals.
    pub fn record_game(&mut self, final_score: u32, correct_count: u32, total_count: u32) {
        self.games_played = self.games_played.saturating_add(1);
        self.total_score = self.total_score.saturating_add(u64::from(final_score));
        self.correct_answers = self.correct_answers.saturating_add(u64::from(correct_count));
        self.total_answers = self.total_answers.saturating_add(u64::from(total_count));
        self.high_score = self.high_score.max(final_score);
    }

    pub fn accuracy_percent(&self) -> u32 {
        if self.total_answers == 0 {
            return 0;
        }
        ((self.correct_answers as f64 / self.total_answers as f64) * 100.0).round() as u32
    }

    pub fn average_score(&self) -> u64 {
        if self.games_played == 0 {
            0
        } else {
            self.total_score / u64::from(self.games_played)
        }
    }
}
