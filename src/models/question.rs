//! Question-related data models.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

/// One multiple-choice round: an image and the brand it shows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// 1-based position in the question set
    pub id: u32,
    pub image_url: String,
    pub correct_answer: String,
    pub options: Vec<String>,
    pub difficulty: Difficulty,
}

impl Question {
    /// Case-insensitive comparison against the correct answer.
    pub fn is_correct(&self, answer: &str) -> bool {
        answer.to_lowercase() == self.correct_answer.to_lowercase()
    }

    /// Returns the option matching `input` case-insensitively, if any.
    pub fn find_option(&self, input: &str) -> Option<&str> {
        let needle = input.to_lowercase();
        self.options
            .iter()
            .find(|option| option.to_lowercase() == needle)
            .map(String::as_str)
    }
}
