pub mod answer;
pub mod question;
pub mod result;
pub mod stats;

pub use answer::Answer;
pub use question::{Difficulty, Question};
pub use result::GameResult;
pub use stats::UserStats;
