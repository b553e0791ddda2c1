//! File system watcher
//!
//! Watches the vault recursively and turns raw `notify` events into
//! per-note change events; also watches the settings file so the service
//! can reload rules while running.

mod handler;

pub use handler::EventHandler;

use anyhow::{Context, Result};
use notify::event::{CreateKind, ModifyKind, RenameMode};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, trace};

use crate::vault::Note;

/// Something the service loop should react to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// A markdown note's content may have changed
    Note(Note),
    /// The settings file was written
    ConfigChanged,
}

/// Watches a vault and its settings file
pub struct VaultWatcher {
    watcher: RecommendedWatcher,
    rx: mpsc::UnboundedReceiver<notify::Result<Event>>,
    filter: EventFilter,
    pending: VecDeque<WatchEvent>,
}

impl VaultWatcher {
    /// Start watching `root` (an existing, canonical directory) recursively
    pub fn new(root: &Path, polling_interval_secs: u64, debounce: Duration) -> Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();

        let mut watcher = RecommendedWatcher::new(
            move |res| {
                if let Err(e) = tx.send(res) {
                    error!("Failed to send watch event: {}", e);
                }
            },
            Config::default().with_poll_interval(Duration::from_secs(polling_interval_secs)),
        )?;

        watcher
            .watch(root, RecursiveMode::Recursive)
            .with_context(|| format!("Failed to watch {}", root.display()))?;
        info!("Watching vault: {}", root.display());

        Ok(Self {
            watcher,
            rx,
            filter: EventFilter::new(root.to_path_buf(), debounce),
            pending: VecDeque::new(),
        })
    }

    /// Also report changes to the settings file at `path`
    pub fn watch_config(&mut self, path: &Path) -> Result<()> {
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let parent = std::fs::canonicalize(parent)
            .with_context(|| format!("Config directory not found: {}", parent.display()))?;
        let file_name = path.file_name().context("Config path has no file name")?;

        self.watcher
            .watch(&parent, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch {}", parent.display()))?;
        let config_path = parent.join(file_name);
        info!("Watching config: {}", config_path.display());
        self.filter.config_path = Some(config_path);
        Ok(())
    }

    /// Wait for the next event. Returns `None` when the watcher has shut down.
    pub async fn next(&mut self) -> Option<WatchEvent> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(event);
            }

            match self.rx.recv().await? {
                Ok(event) => {
                    let events = self.filter.classify(&event);
                    self.pending.extend(events);
                }
                Err(e) => error!("Watch error: {}", e),
            }
        }
    }
}

/// Maps raw events to [`WatchEvent`]s
struct EventFilter {
    root: PathBuf,
    config_path: Option<PathBuf>,
    handler: EventHandler,
}

impl EventFilter {
    fn new(root: PathBuf, debounce: Duration) -> Self {
        Self {
            root,
            config_path: None,
            handler: EventHandler::new(debounce),
        }
    }

    fn classify(&mut self, event: &Event) -> Vec<WatchEvent> {
        trace!("Event: {:?}", event);

        if self.touches_config(event) {
            return vec![WatchEvent::ConfigChanged];
        }

        let changed = changed_paths(event);
        if changed.is_empty() {
            debug!("Ignoring event kind: {:?}", event.kind);
            return Vec::new();
        }

        self.handler
            .should_process(changed)
            .into_iter()
            .filter_map(|path| Note::from_fs_path(&self.root, &path))
            .filter(Note::is_markdown)
            .map(WatchEvent::Note)
            .collect()
    }

    fn touches_config(&self, event: &Event) -> bool {
        if matches!(event.kind, EventKind::Access(_)) {
            return false;
        }
        self.config_path
            .as_ref()
            .is_some_and(|config| event.paths.iter().any(|p| p == config))
    }
}

/// Paths whose content may have changed
fn changed_paths(event: &Event) -> &[PathBuf] {
    match event.kind {
        EventKind::Create(CreateKind::Folder) => &[],
        EventKind::Create(_) => event.paths.as_slice(),
        EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Any | ModifyKind::Other) => {
            event.paths.as_slice()
        }
        // Atomic saves land as renames onto the note
        EventKind::Modify(ModifyKind::Name(RenameMode::To | RenameMode::Any)) => {
            event.paths.as_slice()
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => event
            .paths
            .last()
            .map(std::slice::from_ref)
            .unwrap_or(&[]),
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, DataChange, MetadataKind};

    fn filter() -> EventFilter {
        EventFilter::new(PathBuf::from("/vault"), Duration::ZERO)
    }

    fn event(kind: EventKind, paths: &[&str]) -> Event {
        paths
            .iter()
            .fold(Event::new(kind), |e, p| e.add_path(PathBuf::from(p)))
    }

    fn note(path: &str) -> WatchEvent {
        WatchEvent::Note(Note::new(path))
    }

    #[test]
    fn test_content_change_yields_note() {
        let mut filter = filter();
        let modify = event(
            EventKind::Modify(ModifyKind::Data(DataChange::Content)),
            &["/vault/Note.md"],
        );
        assert_eq!(filter.classify(&modify), vec![note("Note.md")]);

        let create = event(EventKind::Create(CreateKind::File), &["/vault/Inbox/New.md"]);
        assert_eq!(filter.classify(&create), vec![note("Inbox/New.md")]);
    }

    #[test]
    fn test_ignores_metadata_access_and_rename_source() {
        let mut filter = filter();
        let kinds = [
            EventKind::Modify(ModifyKind::Metadata(MetadataKind::Any)),
            EventKind::Access(AccessKind::Any),
            EventKind::Modify(ModifyKind::Name(RenameMode::From)),
            EventKind::Create(CreateKind::Folder),
        ];
        for kind in kinds {
            assert!(filter.classify(&event(kind, &["/vault/Note.md"])).is_empty());
        }
    }

    #[test]
    fn test_rename_both_uses_destination() {
        let mut filter = filter();
        let rename = event(
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
            &["/vault/.Note.md.swp", "/vault/Note.md"],
        );
        assert_eq!(filter.classify(&rename), vec![note("Note.md")]);
    }

    #[test]
    fn test_drops_non_markdown_hidden_and_outside_paths() {
        let mut filter = filter();
        let modify = event(
            EventKind::Modify(ModifyKind::Any),
            &[
                "/vault/image.png",
                "/vault/.obsidian/app.md",
                "/tmp/Note.md",
                "/vault/Keep.md",
            ],
        );
        assert_eq!(filter.classify(&modify), vec![note("Keep.md")]);
    }

    #[test]
    fn test_config_change() {
        let mut filter = filter();
        filter.config_path = Some(PathBuf::from("/home/me/.config/vaultsort/config.toml"));

        let write = event(
            EventKind::Modify(ModifyKind::Data(DataChange::Any)),
            &["/home/me/.config/vaultsort/config.toml"],
        );
        assert_eq!(filter.classify(&write), vec![WatchEvent::ConfigChanged]);

        let read = event(
            EventKind::Access(AccessKind::Any),
            &["/home/me/.config/vaultsort/config.toml"],
        );
        assert!(filter.classify(&read).is_empty());
    }

    #[test]
    fn test_debounce_applies_per_path() {
        let mut filter = EventFilter::new(PathBuf::from("/vault"), Duration::from_secs(60));
        let modify = event(EventKind::Modify(ModifyKind::Any), &["/vault/Note.md"]);

        assert_eq!(filter.classify(&modify).len(), 1);
        assert!(filter.classify(&modify).is_empty());
    }
}
