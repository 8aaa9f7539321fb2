use shiftboard_core::config::Config;
use shiftboard_core::display::DisplaySink;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

/// Shared application state passed to all route handlers.
///
/// `store_lock` serializes every load-mutate-save cycle: in-memory state is
/// only ever a per-request working copy, and the state file is the durable
/// checkpoint between requests. Two requests mutating different lines would
/// otherwise race on that shared file with a last-write-wins outcome.
#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
    pub config: Arc<Config>,
    pub display: Arc<dyn DisplaySink>,
    store_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(root: PathBuf, config: Config, display: Arc<dyn DisplaySink>) -> Self {
        Self {
            root,
            config: Arc::new(config),
            display,
            store_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Enter the store critical section. A poisoned lock is recovered: the
    /// guarded data lives on disk, not in the mutex, so a panicked holder
    /// cannot have left the in-memory map inconsistent.
    pub fn lock_store(&self) -> MutexGuard<'_, ()> {
        self.store_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
