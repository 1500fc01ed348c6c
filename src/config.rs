use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once};

const DATA_DIR_VAR: &str = "FINTRACK_DATA_DIR";
const LOG_FILTER_VAR: &str = "FINTRACK_LOG";
const DEFAULT_LOG_FILTER: &str = "fintrack=info";

static TRACING_INIT: Once = Once::new();

/// Where fintrack keeps its files and how much it logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Config {
    pub(crate) data_dir: PathBuf,
    pub(crate) db_path: PathBuf,
    pub(crate) log_path: PathBuf,
    pub(crate) log_filter: String,
}

impl Config {
    pub(crate) fn from_env() -> Result<Self> {
        let data_dir = match std::env::var_os(DATA_DIR_VAR) {
            Some(dir) => PathBuf::from(dir),
            None => directories::ProjectDirs::from("com", "fintrack", "fintrack")
                .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?
                .data_dir()
                .to_path_buf(),
        };
        Self::in_dir(&data_dir, std::env::var(LOG_FILTER_VAR).ok())
    }

    /// Build a config rooted at `data_dir`, creating the directory if needed.
    pub(crate) fn in_dir(data_dir: &Path, log_filter: Option<String>) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            db_path: data_dir.join("fintrack.db"),
            log_path: data_dir.join("fintrack.log"),
            log_filter: log_filter
                .filter(|f| !f.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        })
    }
}

/// Send tracing output to the log file. Only the first call has any effect.
/// Logging to the terminal would corrupt the TUI.
pub(crate) fn init_tracing(config: &Config) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)
        .with_context(|| format!("Failed to open log file: {}", config.log_path.display()))?;
    let filter =
        EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    TRACING_INIT.call_once(|| {
        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .try_init();
    });
    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
