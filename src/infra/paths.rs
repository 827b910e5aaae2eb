// src/infra/paths.rs — XDG-compliant path management
//
// All paths respect the SPECLOOP_HOME environment variable for isolation.
// When SPECLOOP_HOME is set, config and data live under that directory.
// When unset, config uses ~/.specloop/ and data uses XDG_DATA_HOME/specloop.

use directories::{BaseDirs, ProjectDirs};
use std::path::PathBuf;

/// Returns the SPECLOOP_HOME override, if set.
fn specloop_home() -> Option<PathBuf> {
    std::env::var_os("SPECLOOP_HOME").map(PathBuf::from)
}

/// Home directory, or the working directory when none can be determined.
pub fn dirs_home() -> PathBuf {
    BaseDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Configuration directory: $SPECLOOP_HOME/ or ~/.specloop/
pub fn config_dir() -> PathBuf {
    if let Some(home) = specloop_home() {
        return home;
    }
    dirs_home().join(".specloop")
}

/// Data directory: $SPECLOOP_HOME/data/ or ~/.local/share/specloop/
pub fn data_dir() -> PathBuf {
    if let Some(home) = specloop_home() {
        return home.join("data");
    }
    ProjectDirs::from("", "", "specloop")
        .map(|d| d.data_local_dir().to_path_buf())
        .unwrap_or_else(|| config_dir().join("data"))
}

/// Database path
pub fn db_path() -> PathBuf {
    data_dir().join("specloop.db")
}

/// JSONL session logs
pub fn sessions_dir() -> PathBuf {
    data_dir().join("sessions")
}

/// Config file path
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Ensure all required directories exist
pub async fn ensure_dirs() -> anyhow::Result<()> {
    for dir in [config_dir(), data_dir(), sessions_dir()] {
        tokio::fs::create_dir_all(&dir).await?;
    }
    Ok(())
}
