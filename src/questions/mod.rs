pub mod builder;
pub mod commands;
pub mod difficulty;
pub mod shuffle;

pub use builder::{build_question_set, JOKE_BRAND, JOKE_OPTIONS};
pub use difficulty::difficulty_for;
pub use shuffle::shuffle;
