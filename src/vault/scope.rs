//! Trigger scope - which note locations are evaluated on change

use super::{Note, normalize_path};

/// Notes directly in the vault root and/or directly inside listed folders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchScope {
    root: bool,
    folders: Vec<String>,
}

impl WatchScope {
    pub fn new(root: bool, folders: &[String]) -> Self {
        let folders = folders
            .iter()
            .map(|f| normalize_path(f))
            .filter(|f| !f.is_empty())
            .collect();
        Self { root, folders }
    }

    /// Check whether a change to `note` should be evaluated
    pub fn contains(&self, note: &Note) -> bool {
        let folder = note.folder();
        if folder.is_empty() {
            return self.root;
        }
        self.folders.iter().any(|f| f == folder)
    }
}

impl Default for WatchScope {
    fn default() -> Self {
        Self {
            root: true,
            folders: Vec::new(),
        }
    }
}
