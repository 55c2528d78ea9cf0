use serde::{Deserialize, Serialize};

/// A recorded response to one question. Never mutated after it is logged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub question_id: u32,
    /// Empty when the countdown ran out
    pub user_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
    pub points_awarded: u32,
    pub response_time_seconds: f64,
}

impl Answer {
    pub fn timed_out(&self) -> bool {
        self.user_answer.is_empty()
    }
}
