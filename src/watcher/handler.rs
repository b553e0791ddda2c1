//! Event handler for file system events

use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Maximum number of entries in the debounce map before forcing a cleanup
const MAX_DEBOUNCE_ENTRIES: usize = 10_000;

/// Optionally drops repeat events for the same path inside a time window.
///
/// A zero window disables debouncing: every event passes, so two rapid edits
/// to one note are evaluated twice.
pub struct EventHandler {
    /// Recent events by path (IndexMap preserves insertion order for fair cleanup)
    recent: IndexMap<PathBuf, Instant>,

    /// Debounce duration
    debounce: Duration,
}

impl EventHandler {
    /// Create a new event handler with the given debounce window
    pub fn new(debounce: Duration) -> Self {
        Self {
            recent: IndexMap::new(),
            debounce,
        }
    }

    /// Return the paths that should be processed now
    pub fn should_process(&mut self, paths: &[PathBuf]) -> Vec<PathBuf> {
        if self.debounce.is_zero() {
            return paths.to_vec();
        }
        self.should_process_at(paths, Instant::now())
    }

    fn should_process_at(&mut self, paths: &[PathBuf], now: Instant) -> Vec<PathBuf> {
        let mut paths_to_process = Vec::new();

        for path in paths {
            if self.is_recent(path, now) {
                continue;
            }
            self.recent.insert(path.clone(), now);
            paths_to_process.push(path.clone());
        }

        // If the map has grown too large, force a cleanup
        if self.recent.len() > MAX_DEBOUNCE_ENTRIES {
            self.cleanup_at(now);
        }

        paths_to_process
    }

    fn is_recent(&self, path: &Path, now: Instant) -> bool {
        self.recent
            .get(path)
            .is_some_and(|&last| now.duration_since(last) <= self.debounce)
    }

    /// Drop entries older than ten debounce windows
    fn cleanup_at(&mut self, now: Instant) {
        let threshold = self.debounce * 10; // Keep entries for 10x debounce period

        self.recent
            .retain(|_, &mut last| now.duration_since(last) < threshold);
    }
}
