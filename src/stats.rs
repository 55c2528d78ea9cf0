use anyhow::{anyhow, Context, Result};
use log::{error, warn};
use serde_json::{Map, Value};
use std::{fs, io::ErrorKind, path::PathBuf, sync::Mutex};

use crate::{models::UserStats, utils::fs::write_atomic};

/// Key the stats record lives under inside the local storage file.
pub const STATS_KEY: &str = "car-game-stats";

/// Cumulative play history in a local JSON key-value file.
///
/// Every update is a read-modify-write of the whole file, serialized by a
/// process-wide lock and committed with an atomic rename.
pub struct StatsStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl StatsStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    /// Current stats, or zeros when nothing usable is stored.
    pub fn load(&self) -> UserStats {
        match self.read_document().and_then(|doc| stats_from(&doc)) {
            Ok(stats) => stats,
            Err(err) => {
                error!("Error loading stats: {err:#}");
                UserStats::default()
            }
        }
    }

    /// Folds one completed game into the stored totals and returns the new
    /// record. A failed write is logged and the updated record is still
    /// returned; it never interrupts the game.
    pub fn update_stats(&self, final_score: u32, correct_count: u32, total_count: u32) -> UserStats {
        let _guard = self.lock.lock().unwrap_or_else(|p| p.into_inner());

        let mut document = self.read_document().unwrap_or_else(|err| {
            warn!("Discarding unreadable stats file: {err:#}");
            Map::new()
        });
        let mut stats = stats_from(&document).unwrap_or_else(|err| {
            warn!("Resetting unreadable stats record: {err:#}");
            UserStats::default()
        });

        stats.record_game(final_score, correct_count, total_count);

        if let Err(err) = self.persist(&mut document, &stats) {
            error!("Error saving stats: {err:#}");
        }
        stats
    }

    fn read_document(&self) -> Result<Map<String, Value>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to read stats from {}", self.path.display()))
            }
        };

        match serde_json::from_str::<Value>(&contents)
            .with_context(|| format!("Failed to parse {}", self.path.display()))?
        {
            Value::Object(map) => Ok(map),
            _ => Err(anyhow!("{} is not a JSON object", self.path.display())),
        }
    }

    fn persist(&self, document: &mut Map<String, Value>, stats: &UserStats) -> Result<()> {
        document.insert(STATS_KEY.to_string(), serde_json::to_value(stats)?);
        let serialized = serde_json::to_string_pretty(document)?;
        write_atomic(&self.path, &serialized)
    }
}

fn stats_from(document: &Map<String, Value>) -> Result<UserStats> {
    match document.get(STATS_KEY) {
        None | Some(Value::Null) => Ok(UserStats::default()),
        Some(value) => {
            serde_json::from_value(value.clone()).context("Stats record has an unexpected shape")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store() -> (tempfile::TempDir, StatsStore) {
        let dir = tempdir().unwrap();
        let store = StatsStore::new(dir.path().join("storage.json"));
        (dir, store)
    }

    #[test]
    fn absent_file_reads_as_zeros() {
        let (_dir, store) = store();
        assert_eq!(store.load(), UserStats::default());
    }

    #[test]
    fn first_update_from_zero() {
        let (_dir, store) = store();
        let stats = store.update_stats(50, 8, 10);

        let expected = UserStats {
            high_score: 50,
            games_played: 1,
            total_score: 50,
            correct_answers: 8,
            total_answers: 10,
        };
        assert_eq!(stats, expected);
        assert_eq!(store.load(), expected);
    }

    #[test]
    fn updates_accumulate_and_double_count() {
        let (_dir, store) = store();
        store.update_stats(30, 3, 10);
        let stats = store.update_stats(30, 3, 10);

        assert_eq!(stats.games_played, 2);
        assert_eq!(stats.total_score, 60);
        assert_eq!(stats.high_score, 30);
    }

    #[test]
    fn garbage_reads_as_zeros_and_is_replaced_on_write() {
        let (_dir, store) = store();
        fs::write(&store.path, "this is not json").unwrap();
        assert_eq!(store.load(), UserStats::default());

        let stats = store.update_stats(10, 1, 1);
        assert_eq!(stats.games_played, 1);
        assert_eq!(store.load(), stats);
    }

    #[test]
    fn other_keys_survive_an_update() {
        let (_dir, store) = store();
        fs::write(&store.path, r#"{"simon-best": 7}"#).unwrap();

        store.update_stats(10, 1, 1);

        let doc: Value = serde_json::from_str(&fs::read_to_string(&store.path).unwrap()).unwrap();
        assert_eq!(doc["simon-best"], 7);
        assert_eq!(doc[STATS_KEY]["gamesPlayed"], 1);
    }

    #[test]
    fn write_failure_still_returns_updated_stats() {
        let dir = tempdir().unwrap();
        // A directory where the file should be makes the rename fail.
        let path = dir.path().join("storage.json");
        fs::create_dir(&path).unwrap();
        let store = StatsStore::new(path);

        let stats = store.update_stats(40, 4, 5);
        assert_eq!(stats.games_played, 1);
        assert_eq!(stats.high_score, 40);
    }
}
