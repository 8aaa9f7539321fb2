use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// File constants
// ---------------------------------------------------------------------------

pub const STATE_FILE: &str = "state.json";
pub const LOG_FILE: &str = "shift_log.csv";
pub const CONFIG_FILE: &str = "config.yaml";

/// Filename suggested to clients downloading the shift log.
pub const LOG_DOWNLOAD_NAME: &str = "production_log.csv";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn state_path(root: &Path) -> PathBuf {
    root.join(STATE_FILE)
}

pub fn log_path(root: &Path) -> PathBuf {
    root.join(LOG_FILE)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}
