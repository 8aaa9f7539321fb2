use shiftboard_core::config::Config;
use shiftboard_core::log::ShiftLog;
use shiftboard_core::store::StateStore;
use shiftboard_core::{io, paths};
use std::path::Path;

/// Create the data root: default config (left alone if present), a healed
/// state file with all three line records, and the log header. Idempotent.
pub fn run(root: &Path) -> anyhow::Result<()> {
    io::ensure_dir(root)?;

    if !paths::config_path(root).exists() {
        Config::default().save(root)?;
    }

    let store = StateStore::load(root)?;
    store.save(root)?;

    ShiftLog::new(root).ensure_exists()?;

    println!("initialized shiftboard data root at {}", root.display());
    Ok(())
}
