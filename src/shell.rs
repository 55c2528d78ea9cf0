//! Line-based console front end: menu, game and results screens.
//!
//! The console shows image URLs instead of images, so every question is
//! reported as loaded the moment it is printed.

use std::sync::Arc;

use anyhow::Result;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::{self, error::RecvError},
};
use tokio_util::sync::CancellationToken;

use crate::{
    models::{GameResult, Question},
    session::{
        commands::{
            get_session_state, get_user_stats, image_loaded, return_to_menu, set_question_count,
            start_game, submit_answer, toggle_input_mode,
        },
        GameEvent, InputMode, SessionStatus,
    },
    AppState,
};

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub async fn run(state: Arc<AppState>) -> Result<()> {
    let cancel = CancellationToken::new();
    let printer = tokio::spawn(print_events(
        state.clone(),
        state.session.subscribe(),
        cancel.clone(),
    ));

    print_menu();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if handle_line(&state, line.trim()).await == Flow::Quit {
            break;
        }
    }

    return_to_menu(&state).await.ok();
    cancel.cancel();
    printer.await?;
    Ok(())
}

async fn handle_line(state: &AppState, line: &str) -> Flow {
    let playing = matches!(
        get_session_state(state).await,
        Ok(Some(ref s)) if s.status == SessionStatus::InProgress
    );

    if playing {
        handle_game_line(state, line).await;
        return Flow::Continue;
    }

    let command = line.to_lowercase();
    if let Some(arg) = command.strip_prefix("count ") {
        match arg.trim().parse::<usize>() {
            Ok(count) => match set_question_count(state, count) {
                Ok(settings) => println!("Games now ask {} questions", settings.question_count),
                Err(err) => println!("Could not change the question count: {err}"),
            },
            Err(_) => println!("Usage: count <number>"),
        }
        return Flow::Continue;
    }

    match command.as_str() {
        "play" | "p" => {
            if let Err(err) = start_game(state).await {
                println!("Could not start a game: {err}");
                print_menu();
            }
        }
        "stats" | "s" => print_stats(state),
        "quit" | "q" => return Flow::Quit,
        "" => {}
        _ => print_menu(),
    }
    Flow::Continue
}

async fn handle_game_line(state: &AppState, line: &str) {
    match line {
        "/menu" => {
            return_to_menu(state).await.ok();
            print_menu();
        }
        "/mode" => {
            if let Err(err) = toggle_input_mode(state).await {
                println!("Can't switch now: {err}");
            }
        }
        _ => {
            let input = resolve_choice(state, line).await;
            if let Err(err) = submit_answer(state, input).await {
                println!("{err}");
            }
        }
    }
}

/// In multiple-choice mode a number picks the option at that position.
async fn resolve_choice(state: &AppState, line: &str) -> String {
    let Ok(Some(session)) = get_session_state(state).await else {
        return line.to_string();
    };
    if session.input_mode != InputMode::MultipleChoice {
        return line.to_string();
    }

    line.parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| session.current_question()?.options.get(i).cloned())
        .unwrap_or_else(|| line.to_string())
}

async fn print_events(
    state: Arc<AppState>,
    mut events: broadcast::Receiver<GameEvent>,
    cancel: CancellationToken,
) {
    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break,
            event = events.recv() => event,
        };

        match event {
            Ok(GameEvent::QuestionStarted {
                index,
                total,
                question,
                input_mode,
                score,
                streak,
            }) => {
                println!();
                println!("Question {}/{}   Score: {}   Streak: {}", index + 1, total, score, streak);
                print_question(&question, input_mode);
                if let Err(err) = image_loaded(&state).await {
                    log::debug!("image signal ignored: {err}");
                }
            }
            Ok(GameEvent::CountdownTick { ticks_remaining }) if ticks_remaining <= 3 => {
                println!("  {ticks_remaining}s...");
            }
            Ok(GameEvent::CountdownTick { .. }) => {}
            Ok(GameEvent::AnswerRecorded {
                answer,
                breakdown,
                timed_out,
                ..
            }) => {
                if timed_out {
                    println!("Time's up! It was {}", answer.correct_answer);
                } else if answer.is_correct {
                    println!("Well done! +{} points", answer.points_awarded);
                    if breakdown.speed_bonus > 0 {
                        println!("  Speed bonus: +{}", breakdown.speed_bonus);
                    }
                    if breakdown.streak_bonus > 0 {
                        println!("  Streak of {}: +{}", breakdown.streak, breakdown.streak_bonus);
                    }
                } else {
                    println!("Not quite! It was {}", answer.correct_answer);
                }
            }
            Ok(GameEvent::InputModeChanged { input_mode }) => {
                if let Ok(Some(session)) = get_session_state(&state).await {
                    if let Some(question) = session.current_question() {
                        print_question(question, input_mode);
                    }
                }
            }
            Ok(GameEvent::GameCompleted { result }) => print_results(&result),
            Ok(GameEvent::SessionAbandoned { .. }) => {}
            Err(RecvError::Lagged(skipped)) => {
                log::warn!("Console fell behind by {skipped} events");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

fn print_question(question: &Question, mode: InputMode) {
    println!("[image] {}  ({})", question.image_url, question.difficulty.as_str());
    match mode {
        InputMode::MultipleChoice => {
            println!("Which brand is it? (10 pts, /mode to type instead)");
            for (i, option) in question.options.iter().enumerate() {
                println!("  {}. {}", i + 1, option);
            }
        }
        InputMode::FreeText => {
            println!("Type the brand name (20 pts, /mode for choices)");
        }
    }
}

fn print_results(result: &GameResult) {
    println!();
    println!("Game over!");
    if result.is_new_high_score {
        println!("*** NEW HIGH SCORE ***");
    }
    println!("{} points", result.score);
    println!(
        "Accuracy: {}% ({}/{})",
        result.accuracy_percent, result.correct_answers, result.total_answers
    );
    println!("Best streak: {}", result.best_streak);
    println!("High score: {}", result.stats.high_score);
    print_menu();
}

fn print_stats(state: &AppState) {
    match get_user_stats(state) {
        Ok(stats) => {
            println!("Games played: {}", stats.games_played);
            println!("High score:   {}", stats.high_score);
            println!("Total score:  {}", stats.total_score);
            println!("Average:      {}", stats.average_score());
            println!(
                "Accuracy:     {}% ({}/{})",
                stats.accuracy_percent(),
                stats.correct_answers,
                stats.total_answers
            );
        }
        Err(err) => println!("Stats unavailable: {err}"),
    }
}

fn print_menu() {
    println!();
    println!("Guess the car!  [play] [stats] [count <n>] [quit]");
}
