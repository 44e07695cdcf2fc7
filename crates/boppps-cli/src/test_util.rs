//! Helpers for tests that touch process-wide state.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use tempfile::TempDir;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Serialise tests that read or write environment variables.
pub fn lock_env() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Points `XDG_CONFIG_HOME` at a fresh temp dir until dropped.
///
/// Hold [`lock_env`] for the lifetime of this value.
pub struct ScopedConfigHome {
    dir: TempDir,
    previous: Option<String>,
}

impl ScopedConfigHome {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let previous = std::env::var("XDG_CONFIG_HOME").ok();
        unsafe { std::env::set_var("XDG_CONFIG_HOME", dir.path()) };
        Self { dir, previous }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

impl Drop for ScopedConfigHome {
    fn drop(&mut self) {
        match self.previous.take() {
            Some(v) => unsafe { std::env::set_var("XDG_CONFIG_HOME", v) },
            None => unsafe { std::env::remove_var("XDG_CONFIG_HOME") },
        }
    }
}
