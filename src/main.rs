//! vaultsort CLI
//!
//! Edit move rules and settings, and run rules over a vault once.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vaultsort::mover::{MovePlan, Plan};
use vaultsort::notifications::DesktopNotifier;
use vaultsort::rules::RuleField;
use vaultsort::{Config, FsVault, Mover, Note, Rule};

#[derive(Parser, Debug)]
#[command(name = "vaultsort")]
#[command(author, version, about = "Files markdown notes into folders by frontmatter property")]
struct Cli {
    /// Path to config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Vault directory (overrides the configured one)
    #[arg(long, value_name = "DIR")]
    vault: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// List all rules
    List,

    /// Append a rule
    Add {
        /// Frontmatter property to inspect
        #[arg(short, long)]
        property: String,

        /// Value the property must have
        #[arg(long)]
        value: String,

        /// Destination folder inside the vault
        #[arg(short, long)]
        folder: String,
    },

    /// Change one field of a rule
    Edit {
        /// Rule number, as shown by `list`
        rule: usize,

        /// Field to change: property, value or folder
        field: RuleField,

        /// New value
        value: String,
    },

    /// Delete a rule
    Remove {
        /// Rule number, as shown by `list`
        rule: usize,
    },

    /// Move a rule to another position
    Reorder {
        /// Current rule number
        from: usize,

        /// New rule number
        to: usize,
    },

    /// Turn a setting on or off
    Set {
        #[arg(value_enum)]
        setting: Setting,

        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },

    /// Validate config file
    Check,

    /// Show what would happen to one note
    Eval {
        /// Note path, relative to the vault or absolute
        note: PathBuf,
    },

    /// Run rules over the vault once (dry-run by default)
    Run {
        /// Actually move notes (not just dry-run)
        #[arg(long)]
        apply: bool,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum Setting {
    /// Notify after every move
    MoveNotifications,
    /// Notify when a move fails
    DebugNotifications,
    /// Evaluate notes in the vault root
    WatchRoot,
}

/// Convert a 1-based rule number to an index
fn rule_index(number: usize) -> Result<usize> {
    number
        .checked_sub(1)
        .context("Rule numbers start at 1")
}

fn print_rules(config: &Config) {
    if config.rules.is_empty() {
        println!("No rules configured");
    } else {
        println!("Rules:");
        for (i, rule) in config.rules.list().iter().enumerate() {
            println!("  [{}] {}: {} -> {}", i + 1, rule.property, rule.value, rule.folder);
        }
    }

    let on_off = |b: bool| if b { "on" } else { "off" };
    println!("Move notifications: {}", on_off(config.general.show_move_toast));
    println!("Debug notifications: {}", on_off(config.general.show_debug_toast));
}

fn describe(config: &Config, plan: &Plan) -> String {
    match plan {
        Plan::NoFrontmatter => "no frontmatter".to_string(),
        Plan::NoMatch => "no rule matches".to_string(),
        Plan::AlreadyInPlace { rule_index } => {
            format!("already in place (rule {})", rule_index + 1)
        }
        Plan::Move(MovePlan {
            rule_index,
            kind,
            destination,
            ..
        }) => {
            let rule = &config.rules.list()[*rule_index];
            format!(
                "-> {} (rule {}: {} = {}, {:?} match)",
                destination,
                rule_index + 1,
                rule.property,
                rule.value,
                kind
            )
        }
    }
}

/// Vault-relative note for a CLI argument
fn note_arg(vault: &FsVault, path: &Path) -> Result<Note> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        let from_cwd = std::env::current_dir()?.join(path);
        if from_cwd.exists() { from_cwd } else { vault.root().join(path) }
    };
    let absolute = std::fs::canonicalize(&absolute)
        .with_context(|| format!("Note not found: {}", path.display()))?;
    Note::from_fs_path(vault.root(), &absolute)
        .with_context(|| format!("{} is not a note inside the vault", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("VAULTSORT_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::List => {
            let config = Config::load(config_path)?;
            print_rules(&config);
        }
        Commands::Add {
            property,
            value,
            folder,
        } => {
            let mut config = Config::load(config_path)?;
            config.rules.add(Rule::new(property, value, folder));
            config.save(config_path)?;
            println!("✓ Added rule {}", config.rules.len());
        }
        Commands::Edit { rule, field, value } => {
            let mut config = Config::load(config_path)?;
            config.rules.update_field(rule_index(rule)?, field, value)?;
            config.save(config_path)?;
            println!("✓ Updated {} of rule {}", field, rule);
        }
        Commands::Remove { rule } => {
            let mut config = Config::load(config_path)?;
            let removed = config.rules.remove_at(rule_index(rule)?)?;
            config.save(config_path)?;
            println!("✓ Removed rule {} ({})", rule, removed);
        }
        Commands::Reorder { from, to } => {
            let mut config = Config::load(config_path)?;
            config.rules.move_rule(rule_index(from)?, rule_index(to)?)?;
            config.save(config_path)?;
            print_rules(&config);
        }
        Commands::Set { setting, enabled } => {
            let mut config = Config::load(config_path)?;
            match setting {
                Setting::MoveNotifications => config.general.show_move_toast = enabled,
                Setting::DebugNotifications => config.general.show_debug_toast = enabled,
                Setting::WatchRoot => config.vault.watch_root = enabled,
            }
            config.save(config_path)?;
            println!("✓ {:?} = {}", setting, enabled);
        }
        Commands::Check => match Config::load(config_path) {
            Ok(config) => {
                println!("✓ Config is valid");
                println!("  {} rules", config.rules.len());
                for warning in config.warnings() {
                    println!("  ! {}", warning);
                }
            }
            Err(e) => {
                eprintln!("✗ Config error: {:#}", e);
                std::process::exit(1);
            }
        },
        Commands::Eval { note } => {
            let config = Config::load(config_path)?;
            let vault = FsVault::open(&config.vault_root(cli.vault.as_deref())?)?;
            let note = note_arg(&vault, &note)?;
            let mover = Mover::new(&vault, &DesktopNotifier, config.general.notices());
            let plan = mover.plan(config.rules.list(), &note).await?;

            let scope = if config.vault.scope().contains(&note) {
                ""
            } else {
                " [outside watched folders]"
            };
            println!("{}: {}{}", note, describe(&config, &plan), scope);
        }
        Commands::Run { apply } => {
            let config = Config::load(config_path)?;
            let vault = FsVault::open(&config.vault_root(cli.vault.as_deref())?)?;
            println!("Processing: {}", vault.root().display());

            let results = vaultsort::service::scan(&vault, &DesktopNotifier, &config, apply).await?;
            for (note, plan) in &results {
                if let Plan::Move(_) = plan {
                    let tag = if apply { "Moved" } else { "[dry-run]" };
                    println!("  {} {} {}", tag, note, describe(&config, plan));
                }
            }
        }
    }

    Ok(())
}
