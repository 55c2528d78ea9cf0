use std::sync::{Arc, Mutex as StdMutex};

use anyhow::{anyhow, Result};
use chrono::Utc;
use serde::Serialize;
use tokio::{
    sync::{broadcast, Mutex},
    task::{self, JoinHandle},
    time::{self, Duration, Instant},
};
use uuid::Uuid;

use super::{
    scoring::ScoreBreakdown,
    state::{Advance, InputMode, SessionState, SessionStatus, TickOutcome, TimerKey},
};
use crate::{
    models::{
        result::{accuracy_percent, best_streak},
        Answer, GameResult, Question, UserStats,
    },
    settings::SessionTimings,
    stats::StatsStore,
};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info, log_warn};

const EVENT_CAPACITY: usize = 64;

/// Everything the presentation layer needs to redraw, pushed as it happens.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GameEvent {
    #[serde(rename_all = "camelCase")]
    QuestionStarted {
        index: usize,
        total: usize,
        question: Question,
        input_mode: InputMode,
        score: u32,
        streak: u32,
    },
    #[serde(rename_all = "camelCase")]
    CountdownTick { ticks_remaining: u32 },
    #[serde(rename_all = "camelCase")]
    AnswerRecorded {
        answer: Answer,
        breakdown: ScoreBreakdown,
        timed_out: bool,
        score: u32,
        streak: u32,
    },
    #[serde(rename_all = "camelCase")]
    InputModeChanged { input_mode: InputMode },
    #[serde(rename_all = "camelCase")]
    GameCompleted { result: GameResult },
    #[serde(rename_all = "camelCase")]
    SessionAbandoned { session_id: Uuid },
}

/// Drives the live session: owns the countdown and feedback timers and
/// hands the finished game to the stats store.
///
/// At most one session is live. Timer tasks carry the [`TimerKey`] they were
/// started for and are aborted on every transition out of their question.
#[derive(Clone)]
pub struct SessionController {
    state: Arc<Mutex<Option<SessionState>>>,
    ticker: Arc<StdMutex<Option<JoinHandle<()>>>>,
    dwell: Arc<StdMutex<Option<JoinHandle<()>>>>,
    stats: Arc<StatsStore>,
    events: broadcast::Sender<GameEvent>,
    timings: SessionTimings,
}

impl SessionController {
    pub fn new(stats: Arc<StatsStore>, timings: SessionTimings) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: Arc::new(Mutex::new(None)),
            ticker: Arc::new(StdMutex::new(None)),
            dwell: Arc::new(StdMutex::new(None)),
            stats,
            events,
            timings,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.events.subscribe()
    }

    pub fn stats(&self) -> &StatsStore {
        &self.stats
    }

    pub async fn get_snapshot(&self) -> Option<SessionState> {
        self.state.lock().await.clone()
    }

    /// Starts a new session, replacing whatever was live.
    pub async fn start_session(&self, questions: Vec<Question>) -> Result<SessionState> {
        let mut fresh = SessionState::new(questions);
        fresh.begin(Utc::now(), Instant::now().into_std())?;

        self.cancel_timers();

        let previous = {
            let mut guard = self.state.lock().await;
            guard.replace(fresh.clone())
        };

        if let Some(old) = previous.filter(|s| s.status == SessionStatus::InProgress) {
            log_info!("Session {} replaced before completion", old.session_id);
            self.emit(GameEvent::SessionAbandoned {
                session_id: old.session_id,
            });
        }

        log_info!(
            "Session {} started with {} questions",
            fresh.session_id,
            fresh.questions.len()
        );
        self.emit_question_started(&fresh);

        Ok(fresh)
    }

    pub async fn image_loaded(&self) -> Result<()> {
        self.image_ready().await
    }

    /// A broken image must not block the player, so it starts the countdown
    /// just like a successful load.
    pub async fn image_failed(&self, reason: &str) -> Result<()> {
        log_warn!("Image failed to load: {reason}");
        self.image_ready().await
    }

    pub async fn submit_answer(&self, input: &str) -> Result<Answer> {
        let (submission, key, score, streak) = {
            let mut guard = self.state.lock().await;
            let state = guard.as_mut().ok_or_else(|| anyhow!("no game in progress"))?;
            let submission = state.submit_answer(input, Instant::now().into_std())?;
            (submission, state.timer_key(), state.score, state.streak)
        };

        self.cancel_ticker();

        log_debug!(
            "Question {} answered '{}' correct={} points={}",
            submission.answer.question_id,
            submission.answer.user_answer,
            submission.answer.is_correct,
            submission.answer.points_awarded
        );

        self.emit(GameEvent::AnswerRecorded {
            answer: submission.answer.clone(),
            breakdown: submission.breakdown,
            timed_out: false,
            score,
            streak,
        });
        self.schedule_feedback(key, self.timings.answer_feedback);

        Ok(submission.answer)
    }

    pub async fn toggle_input_mode(&self) -> Result<InputMode> {
        let mode = {
            let mut guard = self.state.lock().await;
            let state = guard.as_mut().ok_or_else(|| anyhow!("no game in progress"))?;
            state.toggle_input_mode()?
        };
        self.emit(GameEvent::InputModeChanged { input_mode: mode });
        Ok(mode)
    }

    /// Drops the live session without touching the stats. Safe to call when
    /// nothing is running.
    pub async fn return_to_menu(&self) {
        self.cancel_timers();

        let previous = self.state.lock().await.take();
        if let Some(old) = previous.filter(|s| s.status == SessionStatus::InProgress) {
            log_info!(
                "Session {} abandoned after {} answers",
                old.session_id,
                old.answers.len()
            );
            self.emit(GameEvent::SessionAbandoned {
                session_id: old.session_id,
            });
        }
    }

    async fn image_ready(&self) -> Result<()> {
        let key = {
            let mut guard = self.state.lock().await;
            let state = guard.as_mut().ok_or_else(|| anyhow!("no game in progress"))?;
            let changed = state.mark_image_ready()?;
            if !changed || !state.is_countdown_running() {
                return Ok(());
            }
            state.timer_key()
        };

        self.spawn_ticker(key);
        Ok(())
    }

    fn spawn_ticker(&self, key: TimerKey) {
        let controller = self.clone();
        let handle = tokio::spawn(async move { controller.run_countdown(key).await });

        let mut slot = self.ticker.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(old) = slot.replace(handle) {
            old.abort();
        }
    }

    async fn run_countdown(&self, key: TimerKey) {
        let period = self.timings.tick_interval;
        let mut interval = time::interval_at(Instant::now() + period, period);

        loop {
            interval.tick().await;

            let mut guard = self.state.lock().await;
            let Some(state) = guard.as_mut().filter(|s| s.timer_key() == key) else {
                break;
            };

            match state.tick() {
                Ok(TickOutcome::Counted { ticks_remaining }) => {
                    self.emit(GameEvent::CountdownTick { ticks_remaining });
                }
                Ok(TickOutcome::TimedOut(answer)) => {
                    log_info!("Question {} timed out", answer.question_id);
                    let (score, streak) = (state.score, state.streak);
                    drop(guard);

                    self.emit(GameEvent::CountdownTick { ticks_remaining: 0 });
                    self.emit(GameEvent::AnswerRecorded {
                        answer,
                        breakdown: ScoreBreakdown::default(),
                        timed_out: true,
                        score,
                        streak,
                    });
                    self.schedule_feedback(key, self.timings.timeout_feedback);
                    break;
                }
                Ok(TickOutcome::Paused) | Err(_) => break,
            }
        }
    }

    fn schedule_feedback(&self, key: TimerKey, dwell: Duration) {
        let controller = self.clone();
        let handle = tokio::spawn(async move {
            time::sleep(dwell).await;
            controller.finish_feedback(key).await;
        });

        let mut slot = self.dwell.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(old) = slot.replace(handle) {
            old.abort();
        }
    }

    async fn finish_feedback(&self, key: TimerKey) {
        let completed = {
            let mut guard = self.state.lock().await;
            let Some(state) = guard.as_mut().filter(|s| s.timer_key() == key) else {
                return;
            };

            match state.advance(Utc::now(), Instant::now().into_std()) {
                Ok(Advance::NextQuestion(_)) => {
                    self.emit_question_started(state);
                    return;
                }
                Ok(Advance::Completed) => state.clone(),
                Err(err) => {
                    log_warn!("Feedback timer fired in an unexpected state: {err}");
                    return;
                }
            }
        };

        self.complete(completed).await;
    }

    /// Runs once per finished session: `advance` reports completion only on
    /// the transition into `Completed`.
    async fn complete(&self, finished: SessionState) {
        let correct = finished.correct_count();
        let total = finished.answers.len() as u32;
        let score = finished.score;

        // The store does blocking file I/O.
        let store = self.stats.clone();
        let stats = match task::spawn_blocking(move || store.update_stats(score, correct, total)).await {
            Ok(stats) => stats,
            Err(err) => {
                log_error!("Stats update did not finish: {err}");
                UserStats::default()
            }
        };

        let started_at = finished.started_at.unwrap_or_else(Utc::now);
        let ended_at = finished.ended_at.unwrap_or_else(Utc::now);

        let result = GameResult {
            session_id: finished.session_id.to_string(),
            score: finished.score,
            correct_answers: correct,
            total_answers: total,
            accuracy_percent: accuracy_percent(correct, total),
            best_streak: best_streak(&finished.answers),
            is_new_high_score: finished.score == stats.high_score && stats.games_played > 1,
            answers: finished.answers,
            started_at,
            ended_at,
            stats,
        };

        log_info!(
            "Session {} completed: {} points, {}/{} correct",
            result.session_id,
            result.score,
            correct,
            total
        );

        self.emit(GameEvent::GameCompleted { result });
    }

    fn emit_question_started(&self, state: &SessionState) {
        if let Some(question) = state.current_question() {
            self.emit(GameEvent::QuestionStarted {
                index: state.current_question_index,
                total: state.questions.len(),
                question: question.clone(),
                input_mode: state.input_mode,
                score: state.score,
                streak: state.streak,
            });
        }
    }

    fn emit(&self, event: GameEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn cancel_ticker(&self) {
        if let Some(handle) = self.ticker.lock().unwrap_or_else(|p| p.into_inner()).take() {
            handle.abort();
        }
    }

    fn cancel_timers(&self) {
        self.cancel_ticker();
        if let Some(handle) = self.dwell.lock().unwrap_or_else(|p| p.into_inner()).take() {
            handle.abort();
        }
    }
}
