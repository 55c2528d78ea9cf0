pub mod commands;
pub mod controller;
pub mod scoring;
pub mod state;

pub use controller::{GameEvent, SessionController};
pub use state::{InputMode, SessionError, SessionState, SessionStatus};
