pub mod api_error;
pub mod catalog;
pub mod models;
pub mod questions;
pub mod session;
pub mod settings;
mod shell;
pub mod stats;
mod utils;

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;
use catalog::CatalogStore;
use directories::ProjectDirs;
use session::SessionController;
use settings::SettingsStore;
use stats::StatsStore;

pub struct AppState {
    pub(crate) catalog: CatalogStore,
    pub(crate) settings: SettingsStore,
    pub(crate) session: SessionController,
}

impl AppState {
    pub fn new(data_dir: &Path) -> anyhow::Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

        let settings = SettingsStore::new(data_dir.join("settings.json"))?;
        let current = settings.settings();

        let catalog = CatalogStore::new(data_dir.join(&current.catalog_file));
        log::info!("Brand catalog: {}", catalog.path().display());
        let stats = Arc::new(StatsStore::new(data_dir.join("local-storage.json")));
        let session = SessionController::new(stats, current.timings());

        Ok(Self {
            catalog,
            settings,
            session,
        })
    }
}

fn debug_mode() -> bool {
    std::env::var("CAR_QUIZ_DEBUG")
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("CAR_QUIZ_DATA_DIR") {
        return PathBuf::from(dir);
    }
    ProjectDirs::from("", "", "car-quiz")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".car-quiz"))
}

pub fn run() {
    // Initialize logging (reads RUST_LOG env var)
    let level = if debug_mode() {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    log::info!("Car quiz starting up...");

    let result = (|| -> anyhow::Result<()> {
        let data_dir = data_dir();
        let state = Arc::new(AppState::new(&data_dir)?);
        log::info!("Using data directory {}", data_dir.display());

        let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
        runtime.block_on(shell::run(state))
    })();

    if let Err(err) = result {
        log::error!("{err:#}");
        std::process::exit(1);
    }
}
