use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use uuid::Uuid;

use super::scoring::{score_answer, ScoreBreakdown};
use crate::models::{Answer, Question};

/// Countdown budget per question, one tick per second.
pub const COUNTDOWN_TICKS: u32 = 10;
/// Response time recorded when the countdown runs out.
pub const TIMEOUT_RESPONSE_SECS: f64 = 10.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum InputMode {
    #[default]
    MultipleChoice,
    FreeText,
}

impl InputMode {
    pub fn toggled(self) -> Self {
        match self {
            InputMode::MultipleChoice => InputMode::FreeText,
            InputMode::FreeText => InputMode::MultipleChoice,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum SessionStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum FeedbackKind {
    Answered,
    TimedOut,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", tag = "phase", content = "feedback")]
pub enum QuestionPhase {
    #[default]
    AwaitingAnswer,
    ShowingFeedback(FeedbackKind),
}

/// Identity of the timers belonging to one question of one session. A timer
/// whose key no longer matches the live state must not touch it.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct TimerKey {
    pub session_id: Uuid,
    pub question_index: usize,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no questions to play")]
    NoQuestions,
    #[error("session already started")]
    AlreadyStarted,
    #[error("no game in progress")]
    NotInProgress,
    #[error("feedback is being shown")]
    FeedbackInProgress,
    #[error("no feedback to dismiss")]
    NotShowingFeedback,
    #[error("answer is empty")]
    EmptyAnswer,
    #[error("'{0}' is not one of the options")]
    UnknownOption(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Countdown suspended: image still loading or feedback on screen
    Paused,
    Counted { ticks_remaining: u32 },
    TimedOut(Answer),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub answer: Answer,
    pub breakdown: ScoreBreakdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    NextQuestion(usize),
    Completed,
}

/// One play-through. Transitions are plain synchronous methods; the caller
/// supplies clocks so the machine stays deterministic.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub session_id: Uuid,
    pub status: SessionStatus,
    pub questions: Vec<Question>,
    pub current_question_index: usize,
    pub score: u32,
    pub streak: u32,
    pub answers: Vec<Answer>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub input_mode: InputMode,
    pub phase: QuestionPhase,
    pub ticks_remaining: u32,
    pub image_loaded: bool,
    /// Speed bonus of the last answer, for the feedback banner
    pub last_speed_bonus: u32,
    #[serde(skip)]
    pub question_started_at: Option<Instant>,
}

impl SessionState {
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            status: SessionStatus::NotStarted,
            questions,
            current_question_index: 0,
            score: 0,
            streak: 0,
            answers: Vec::new(),
            started_at: None,
            ended_at: None,
            input_mode: InputMode::default(),
            phase: QuestionPhase::AwaitingAnswer,
            ticks_remaining: COUNTDOWN_TICKS,
            image_loaded: false,
            last_speed_bonus: 0,
            question_started_at: None,
        }
    }

    pub fn begin(&mut self, started_at: DateTime<Utc>, now: Instant) -> Result<(), SessionError> {
        if self.status != SessionStatus::NotStarted {
            return Err(SessionError::AlreadyStarted);
        }
        if self.questions.is_empty() {
            return Err(SessionError::NoQuestions);
        }

        self.status = SessionStatus::InProgress;
        self.started_at = Some(started_at);
        self.enter_question(0, now);
        Ok(())
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_question_index)
    }

    pub fn timer_key(&self) -> TimerKey {
        TimerKey {
            session_id: self.session_id,
            question_index: self.current_question_index,
        }
    }

    pub fn is_last_question(&self) -> bool {
        self.current_question_index + 1 >= self.questions.len()
    }

    pub fn is_showing_feedback(&self) -> bool {
        matches!(self.phase, QuestionPhase::ShowingFeedback(_))
    }

    pub fn is_countdown_running(&self) -> bool {
        self.status == SessionStatus::InProgress
            && self.phase == QuestionPhase::AwaitingAnswer
            && self.image_loaded
            && self.ticks_remaining > 0
    }

    pub fn correct_count(&self) -> u32 {
        self.answers.iter().filter(|a| a.is_correct).count() as u32
    }

    /// Image loaded or failed to load; either way the countdown may start.
    /// Returns whether this call changed anything.
    pub fn mark_image_ready(&mut self) -> Result<bool, SessionError> {
        self.ensure_in_progress()?;
        if self.image_loaded {
            return Ok(false);
        }
        self.image_loaded = true;
        Ok(true)
    }

    pub fn tick(&mut self) -> Result<TickOutcome, SessionError> {
        self.ensure_in_progress()?;
        if !self.is_countdown_running() {
            return Ok(TickOutcome::Paused);
        }

        self.ticks_remaining -= 1;
        if self.ticks_remaining > 0 {
            return Ok(TickOutcome::Counted {
                ticks_remaining: self.ticks_remaining,
            });
        }

        Ok(TickOutcome::TimedOut(self.apply_timeout()))
    }

    pub fn submit_answer(&mut self, input: &str, now: Instant) -> Result<Submission, SessionError> {
        self.ensure_in_progress()?;
        if self.is_showing_feedback() {
            return Err(SessionError::FeedbackInProgress);
        }
        let question = self
            .current_question()
            .ok_or(SessionError::NotInProgress)?;

        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(SessionError::EmptyAnswer);
        }
        let user_answer = match self.input_mode {
            InputMode::MultipleChoice => question
                .find_option(trimmed)
                .ok_or_else(|| SessionError::UnknownOption(trimmed.to_string()))?
                .to_string(),
            InputMode::FreeText => trimmed.to_string(),
        };

        let is_correct = question.is_correct(&user_answer);
        let response_secs = self
            .question_started_at
            .map(|started| now.saturating_duration_since(started).as_secs_f64())
            .unwrap_or_default();

        let breakdown = score_answer(
            self.input_mode,
            is_correct,
            self.ticks_remaining,
            response_secs,
            self.streak,
        );

        let answer = Answer {
            question_id: question.id,
            user_answer,
            correct_answer: question.correct_answer.clone(),
            is_correct,
            points_awarded: breakdown.total(),
            response_time_seconds: response_secs,
        };

        self.streak = breakdown.streak;
        self.score += breakdown.total();
        self.last_speed_bonus = breakdown.speed_bonus;
        self.answers.push(answer.clone());
        self.phase = QuestionPhase::ShowingFeedback(FeedbackKind::Answered);

        Ok(Submission { answer, breakdown })
    }

    pub fn toggle_input_mode(&mut self) -> Result<InputMode, SessionError> {
        self.ensure_in_progress()?;
        if self.is_showing_feedback() {
            return Err(SessionError::FeedbackInProgress);
        }
        self.input_mode = self.input_mode.toggled();
        Ok(self.input_mode)
    }

    /// Leaves the feedback phase: next question, or completion after the last.
    pub fn advance(&mut self, ended_at: DateTime<Utc>, now: Instant) -> Result<Advance, SessionError> {
        self.ensure_in_progress()?;
        if !self.is_showing_feedback() {
            return Err(SessionError::NotShowingFeedback);
        }

        if self.is_last_question() {
            self.status = SessionStatus::Completed;
            self.ended_at = Some(ended_at);
            return Ok(Advance::Completed);
        }

        let next = self.current_question_index + 1;
        self.enter_question(next, now);
        Ok(Advance::NextQuestion(next))
    }

    fn enter_question(&mut self, index: usize, now: Instant) {
        self.current_question_index = index;
        self.phase = QuestionPhase::AwaitingAnswer;
        self.ticks_remaining = COUNTDOWN_TICKS;
        self.image_loaded = false;
        self.last_speed_bonus = 0;
        self.question_started_at = Some(now);
    }

    fn apply_timeout(&mut self) -> Answer {
        let (question_id, correct_answer) = self
            .current_question()
            .map(|q| (q.id, q.correct_answer.clone()))
            .unwrap_or_default();

        let answer = Answer {
            question_id,
            user_answer: String::new(),
            correct_answer,
            is_correct: false,
            points_awarded: 0,
            response_time_seconds: TIMEOUT_RESPONSE_SECS,
        };

        self.streak = 0;
        self.last_speed_bonus = 0;
        self.answers.push(answer.clone());
        self.phase = QuestionPhase::ShowingFeedback(FeedbackKind::TimedOut);
        answer
    }

    fn ensure_in_progress(&self) -> Result<(), SessionError> {
        if self.status == SessionStatus::InProgress {
            Ok(())
        } else {
            Err(SessionError::NotInProgress)
        }
    }
}
