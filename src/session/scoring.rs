//! Point rules for a single answer.
//!
//! Multiple choice rewards ticks left on the countdown, free text rewards
//! elapsed seconds. The two speed measures are intentionally not unified.

use serde::Serialize;

use super::state::InputMode;

pub const MULTIPLE_CHOICE_POINTS: u32 = 10;
pub const FREE_TEXT_POINTS: u32 = 20;

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub base: u32,
    pub speed_bonus: u32,
    pub streak_bonus: u32,
    /// Streak after this answer
    pub streak: u32,
}

impl ScoreBreakdown {
    pub fn total(&self) -> u32 {
        self.base + self.speed_bonus + self.streak_bonus
    }
}

/// Multiple-choice bonus from countdown ticks still remaining.
pub fn speed_bonus(ticks_remaining: u32) -> u32 {
    match ticks_remaining {
        8.. => 10,
        6..=7 => 7,
        4..=5 => 5,
        2..=3 => 3,
        _ => 1,
    }
}

/// Free-text bonus from seconds elapsed since the question appeared.
pub fn free_text_time_bonus(response_secs: f64) -> u32 {
    if response_secs < 5.0 {
        5
    } else if response_secs < 10.0 {
        2
    } else {
        0
    }
}

/// Paid once, on the answer that brings the streak to exactly 3, 5 or 10.
pub fn streak_bonus(streak: u32) -> u32 {
    match streak {
        3 => 15,
        5 => 30,
        10 => 75,
        _ => 0,
    }
}

pub fn score_answer(
    mode: InputMode,
    is_correct: bool,
    ticks_remaining: u32,
    response_secs: f64,
    previous_streak: u32,
) -> ScoreBreakdown {
    if !is_correct {
        return ScoreBreakdown::default();
    }

    let streak = previous_streak.saturating_add(1);
    let (base, speed_bonus) = match mode {
        InputMode::MultipleChoice => (MULTIPLE_CHOICE_POINTS, speed_bonus(ticks_remaining)),
        InputMode::FreeText => (FREE_TEXT_POINTS, free_text_time_bonus(response_secs)),
    };

    ScoreBreakdown {
        base,
        speed_bonus,
        streak_bonus: streak_bonus(streak),
        streak,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_bonus_thresholds() {
        let expected = [(10, 10), (8, 10), (7, 7), (6, 7), (5, 5), (4, 5), (3, 3), (2, 3), (1, 1), (0, 1)];
        for (ticks, bonus) in expected {
            assert_eq!(speed_bonus(ticks), bonus, "ticks = {ticks}");
        }
    }

    #[test]
    fn free_text_thresholds() {
        assert_eq!(free_text_time_bonus(0.0), 5);
        assert_eq!(free_text_time_bonus(4.99), 5);
        assert_eq!(free_text_time_bonus(5.0), 2);
        assert_eq!(free_text_time_bonus(9.99), 2);
        assert_eq!(free_text_time_bonus(10.0), 0);
        assert_eq!(free_text_time_bonus(42.0), 0);
    }

    #[test]
    fn streak_bonus_only_at_exact_lengths() {
        let paid: Vec<u32> = (1..=12).filter(|s| streak_bonus(*s) > 0).collect();
        assert_eq!(paid, vec![3, 5, 10]);
        assert_eq!(streak_bonus(10), 75);
    }

    #[test]
    fn multiple_choice_fast_answer_completing_three_streak() {
        let score = score_answer(InputMode::MultipleChoice, true, 9, 1.0, 2);
        assert_eq!(score.base, 10);
        assert_eq!(score.speed_bonus, 10);
        assert_eq!(score.streak_bonus, 15);
        assert_eq!(score.streak, 3);
        assert_eq!(score.total(), 35);
    }

    #[test]
    fn free_text_answer_completing_five_streak() {
        let score = score_answer(InputMode::FreeText, true, 0, 4.2, 4);
        assert_eq!(score.total(), 20 + 5 + 30);
        assert_eq!(score.streak, 5);
    }

    #[test]
    fn wrong_answer_scores_nothing_and_resets_streak() {
        let score = score_answer(InputMode::FreeText, false, 10, 0.5, 9);
        assert_eq!(score, ScoreBreakdown::default());
        assert_eq!(score.streak, 0);
    }
}
