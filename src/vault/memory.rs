//! In-memory vault for tests

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use super::{FolderOutcome, Note, Vault, VaultError};

#[derive(Debug, Default)]
struct State {
    files: BTreeMap<String, String>,
    folders: BTreeSet<String>,
    created: Vec<String>,
    moves: Vec<(String, String)>,
}

/// Vault backed by a map of path -> content, recording every operation
#[derive(Debug, Default)]
pub(crate) struct MemoryVault {
    state: Mutex<State>,
    fail_folders: bool,
    fail_moves: bool,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_note(self, path: &str, content: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .files
            .insert(path.to_string(), content.to_string());
        self
    }

    pub fn with_folder(self, path: &str) -> Self {
        self.state.lock().unwrap().folders.insert(path.to_string());
        self
    }

    pub fn failing_folders(mut self) -> Self {
        self.fail_folders = true;
        self
    }

    pub fn failing_moves(mut self) -> Self {
        self.fail_moves = true;
        self
    }

    pub fn exists(&self, path: &str) -> bool {
        self.state.lock().unwrap().files.contains_key(path)
    }

    /// Folders created through `create_folder`
    pub fn created(&self) -> Vec<String> {
        self.state.lock().unwrap().created.clone()
    }

    /// (from, to) pairs of every successful rename
    pub fn moves(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().moves.clone()
    }
}

impl Vault for MemoryVault {
    async fn read(&self, note: &Note) -> Result<String, VaultError> {
        self.state
            .lock()
            .unwrap()
            .files
            .get(note.path())
            .cloned()
            .ok_or_else(|| VaultError::NotFound {
                path: note.path().to_string(),
            })
    }

    async fn create_folder(&self, path: &str) -> FolderOutcome {
        if self.fail_folders {
            return FolderOutcome::Failed("permission denied".to_string());
        }
        let mut state = self.state.lock().unwrap();
        if state.folders.insert(path.to_string()) {
            state.created.push(path.to_string());
            FolderOutcome::Created
        } else {
            FolderOutcome::AlreadyExisted
        }
    }

    async fn rename(&self, note: &Note, new_path: &str) -> Result<(), VaultError> {
        if self.fail_moves {
            return Err(VaultError::Io {
                path: note.path().to_string(),
                source: std::io::Error::other("disk full"),
            });
        }
        let mut state = self.state.lock().unwrap();
        if state.files.contains_key(new_path) {
            return Err(VaultError::AlreadyExists {
                path: new_path.to_string(),
            });
        }
        let content = state
            .files
            .remove(note.path())
            .ok_or_else(|| VaultError::NotFound {
                path: note.path().to_string(),
            })?;
        state.files.insert(new_path.to_string(), content);
        state
            .moves
            .push((note.path().to_string(), new_path.to_string()));
        Ok(())
    }
}
