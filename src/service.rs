//! Service loop - watches the vault and files notes as they change

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::mover::{MoveOutcome, Mover, Plan};
use crate::notifications::{DesktopNotifier, Notifier};
use crate::vault::{FsVault, Note, Vault};
use crate::watcher::{VaultWatcher, WatchEvent};

/// Running counters, logged on shutdown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub evaluated: u64,
    pub moved: u64,
    pub failed: u64,
}

/// Evaluate one changed note against the current settings
pub async fn handle_note<V: Vault, N: Notifier>(
    vault: &V,
    notifier: &N,
    config: &Config,
    note: &Note,
    stats: &mut Stats,
) {
    if !config.vault.scope().contains(note) {
        debug!("Out of scope: {}", note);
        return;
    }

    stats.evaluated += 1;
    let mover = Mover::new(vault, notifier, config.general.notices());
    match mover.process(config.rules.list(), note).await {
        Ok(MoveOutcome::Moved { .. }) => stats.moved += 1,
        Ok(outcome) => debug!("{}: {:?}", note, outcome),
        Err(e) if e.is_not_found() => {
            debug!("Note disappeared before processing: {}", note);
        }
        Err(e) => {
            stats.failed += 1;
            error!("Processing failed for {}: {}", note, e);
        }
    }
}

/// Evaluate every in-scope note once. With `apply` unset nothing is moved.
pub async fn scan<N: Notifier>(
    vault: &FsVault,
    notifier: &N,
    config: &Config,
    apply: bool,
) -> Result<Vec<(Note, Plan)>> {
    let scope = config.vault.scope();
    let mover = Mover::new(vault, notifier, config.general.notices());
    let mut results = Vec::new();

    for note in vault.markdown_notes()? {
        if !scope.contains(&note) {
            continue;
        }
        let plan = match mover.plan(config.rules.list(), &note).await {
            Ok(plan) => plan,
            Err(e) => {
                warn!("Skipping {}: {}", note, e);
                continue;
            }
        };
        if apply && let Plan::Move(move_plan) = &plan {
            if let Err(e) = mover.apply(&note, move_plan.clone()).await {
                error!("Processing failed for {}: {}", note, e);
                continue;
            }
        }
        results.push((note, plan));
    }

    Ok(results)
}

/// Run the watcher until Ctrl+C
pub async fn run(config_path: Option<PathBuf>, vault_override: Option<PathBuf>) -> Result<()> {
    let config_path = Config::resolve_path(config_path.as_deref())?;
    let mut config = Config::load(Some(config_path.as_path()))?;
    let root = config.vault_root(vault_override.as_deref())?;
    let vault = FsVault::open(&root)?;
    let notifier = DesktopNotifier;

    info!(
        "Loaded config with {} rules for vault {}",
        config.rules.len(),
        vault.root().display()
    );
    for warning in config.warnings() {
        warn!("Config: {}", warning);
    }

    let mut watcher = VaultWatcher::new(
        vault.root(),
        config.general.polling_interval_secs,
        Duration::from_millis(config.general.debounce_ms),
    )?;
    if let Err(e) = watcher.watch_config(&config_path) {
        warn!("Config changes will not be picked up: {:#}", e);
    }

    if config.general.scan_on_start {
        let moved = scan(&vault, &notifier, &config, true)
            .await?
            .iter()
            .filter(|(_, plan)| matches!(plan, Plan::Move(_)))
            .count();
        info!("Initial scan moved {} notes", moved);
    }

    let mut stats = Stats::default();
    info!("Watching for changes. Press Ctrl+C to stop.");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down...");
                break;
            }
            event = watcher.next() => match event {
                Some(WatchEvent::Note(note)) => {
                    handle_note(&vault, &notifier, &config, &note, &mut stats).await;
                }
                Some(WatchEvent::ConfigChanged) => reload(&mut config, &config_path),
                None => {
                    warn!("Watcher stopped");
                    break;
                }
            }
        }
    }

    info!(
        "Evaluated {} notes, moved {}, {} failures",
        stats.evaluated, stats.moved, stats.failed
    );
    Ok(())
}

/// Replace the settings with the file's current contents, keeping the old ones on error
fn reload(config: &mut Config, path: &Path) {
    match Config::load(Some(path)) {
        Ok(new_config) => {
            if new_config.vault.path != config.vault.path {
                warn!("Vault path changed; restart to watch the new vault");
            }
            info!("Reloaded config: {} rules", new_config.rules.len());
            *config = new_config;
        }
        Err(e) => error!("Keeping previous config: {:#}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::Silent;
    use crate::rules::Rule;
    use crate::vault::memory::MemoryVault;
    use assert_fs::prelude::*;
    use predicates::prelude::*;

    fn health_config() -> Config {
        let mut config = Config::default();
        config.rules.add(Rule::new("domain", "Health", "Health"));
        config
    }

    const HEALTH_NOTE: &str = "---\ndomain: Health\n---\n";

    #[tokio::test]
    async fn test_handle_note_moves_root_note() {
        let vault = MemoryVault::new().with_note("Note.md", HEALTH_NOTE);
        let mut stats = Stats::default();

        handle_note(&vault, &Silent, &health_config(), &Note::new("Note.md"), &mut stats).await;

        assert!(vault.exists("Health/Note.md"));
        assert_eq!(stats, Stats { evaluated: 1, moved: 1, failed: 0 });
    }

    #[tokio::test]
    async fn test_handle_note_respects_scope() {
        let vault = MemoryVault::new().with_note("Inbox/Note.md", HEALTH_NOTE);
        let mut stats = Stats::default();
        let mut config = health_config();

        handle_note(&vault, &Silent, &config, &Note::new("Inbox/Note.md"), &mut stats).await;
        assert!(vault.moves().is_empty());
        assert_eq!(stats.evaluated, 0);

        config.vault.watched_folders.push("Inbox".to_string());
        handle_note(&vault, &Silent, &config, &Note::new("Inbox/Note.md"), &mut stats).await;
        assert!(vault.exists("Health/Note.md"));
    }

    #[tokio::test]
    async fn test_handle_note_reads_current_rules() {
        let vault = MemoryVault::new().with_note("Note.md", HEALTH_NOTE);
        let mut stats = Stats::default();
        let mut config = Config::default();

        handle_note(&vault, &Silent, &config, &Note::new("Note.md"), &mut stats).await;
        assert!(vault.moves().is_empty());

        config.rules.add(Rule::new("domain", "Health", "Areas/Health"));
        handle_note(&vault, &Silent, &config, &Note::new("Note.md"), &mut stats).await;
        assert!(vault.exists("Areas/Health/Note.md"));
    }

    #[tokio::test]
    async fn test_handle_note_counts_failures() {
        let vault = MemoryVault::new()
            .failing_moves()
            .with_note("Note.md", HEALTH_NOTE);
        let mut stats = Stats::default();

        handle_note(&vault, &Silent, &health_config(), &Note::new("Note.md"), &mut stats).await;
        assert_eq!(stats.failed, 1);

        // A vanished note is not a failure
        handle_note(&vault, &Silent, &health_config(), &Note::new("Gone.md"), &mut stats).await;
        assert_eq!(stats.failed, 1);
    }

    #[tokio::test]
    async fn test_scan_dry_run_then_apply() {
        let tmp = assert_fs::TempDir::new().unwrap();
        tmp.child("Note.md").write_str(HEALTH_NOTE).unwrap();
        tmp.child("Plain.md").write_str("# no frontmatter").unwrap();
        tmp.child("Deep/Other.md").write_str(HEALTH_NOTE).unwrap();
        let vault = FsVault::open(tmp.path()).unwrap();
        let config = health_config();

        let plans = scan(&vault, &Silent, &config, false).await.unwrap();
        assert_eq!(plans.len(), 2, "Deep/ is out of scope");
        assert!(matches!(plans[0].1, Plan::Move(_)));
        assert_eq!(plans[1].1, Plan::NoFrontmatter);
        tmp.child("Note.md").assert(predicate::path::exists());

        scan(&vault, &Silent, &config, true).await.unwrap();
        tmp.child("Note.md").assert(predicate::path::missing());
        tmp.child("Health/Note.md").assert(HEALTH_NOTE);
        tmp.child("Deep/Other.md").assert(predicate::path::exists());
    }

    #[test]
    fn test_reload_keeps_old_config_on_error() {
        let tmp = assert_fs::TempDir::new().unwrap();
        let path = tmp.child("config.toml");
        let mut config = health_config();

        path.write_str("not = [valid").unwrap();
        reload(&mut config, path.path());
        assert_eq!(config.rules.len(), 1);

        path.write_str("").unwrap();
        reload(&mut config, path.path());
        assert!(config.rules.is_empty());
    }
}
