use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
    sync::RwLock,
    time::Duration,
};

use crate::utils::fs::write_atomic;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameSettings {
    pub question_count: usize,
    pub tick_interval_ms: u64,
    pub answer_feedback_ms: u64,
    pub timeout_feedback_ms: u64,
    /// Catalog file name, relative to the data directory
    pub catalog_file: String,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            question_count: 20,
            tick_interval_ms: 1000,
            answer_feedback_ms: 1500,
            timeout_feedback_ms: 2000,
            catalog_file: "brand-images.json".into(),
        }
    }
}

impl GameSettings {
    pub fn timings(&self) -> SessionTimings {
        SessionTimings {
            tick_interval: Duration::from_millis(self.tick_interval_ms.max(1)),
            answer_feedback: Duration::from_millis(self.answer_feedback_ms),
            timeout_feedback: Duration::from_millis(self.timeout_feedback_ms),
        }
    }
}

/// Durations driving the countdown and feedback dwell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTimings {
    pub tick_interval: Duration,
    pub answer_feedback: Duration,
    pub timeout_feedback: Duration,
}

impl Default for SessionTimings {
    fn default() -> Self {
        GameSettings::default().timings()
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<GameSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                log::warn!("Ignoring unparsable settings in {}: {err}", path.display());
                GameSettings::default()
            })
        } else {
            GameSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn settings(&self) -> GameSettings {
        self.data.read().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub fn update(&self, settings: GameSettings) -> Result<()> {
        let mut guard = self.data.write().unwrap_or_else(|p| p.into_inner());
        self.persist(&settings)?;
        *guard = settings;
        Ok(())
    }

    fn persist(&self, data: &GameSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        write_atomic(&self.path, &serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
