//! `folgezettel` command-line host.
//!
//! # Responsibility
//! - Drive the core linking service over a vault directory.
//! - Own process setup: settings file, logging and exit codes.
//!
//! # Invariants
//! - The filesystem vault emits no events, so commands that change notes run
//!   the matching handler explicitly.
//! - Messages already shown through the terminal UI are not repeated on
//!   stderr.

mod terminal_ui;

use clap::{Parser, Subcommand};
use folgezettel_core::{
    default_log_level, init_logging, ChildCreation, CollectionIndex, FsVault, LinkService,
    LinkServiceError, Note, NoteStore, SettingsStore,
};
use log::info;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use terminal_ui::TerminalUi;

const SETTINGS_FILE_NAME: &str = ".folgezettel.json";
const STDERR_LOG_LEVEL: &str = "warn";

type CliService<'a> = LinkService<&'a FsVault, &'a TerminalUi>;

#[derive(Parser, Debug)]
#[command(name = "folgezettel", version)]
#[command(about = "Folgezettel addressing and link maintenance for markdown vaults", long_about = None)]
struct Cli {
    /// Vault root directory
    #[arg(long, global = true, default_value = ".", value_name = "DIR")]
    vault: PathBuf,

    /// Settings file (defaults to `<vault>/.folgezettel.json`)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level: trace|debug|info|warn|error
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Write rotating log files here instead of stderr
    #[arg(long, global = true, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// Answer yes to duplicate-address confirmations
    #[arg(long, short = 'y', global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the next free child address of a note
    Suggest {
        #[arg(value_name = "NOTE")]
        note: String,
    },
    /// Create the next child note beside a note and link it
    NewChild {
        #[arg(value_name = "NOTE")]
        note: String,
    },
    /// Link a note and its parent in both directions
    Backlink {
        #[arg(value_name = "NOTE")]
        note: String,
    },
    /// Run new-note processing (duplicate check, parent linking) for a note
    Process {
        #[arg(value_name = "NOTE")]
        note: String,
    },
    /// Reciprocate every outgoing link of a note
    Crosslink {
        #[arg(value_name = "NOTE")]
        note: String,
    },
    /// List addresses used by more than one note
    Check,
    /// Show settings, or update one with `--set key=value`
    Config {
        #[arg(long, value_name = "KEY=VALUE")]
        set: Option<String>,
    },
}

/// Command failure.
#[derive(Debug)]
enum CliError {
    /// Not yet shown to the user.
    Message(String),
    /// Already shown through the terminal UI.
    Reported,
}

impl From<String> for CliError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Message(message)) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
        Err(CliError::Reported) => ExitCode::FAILURE,
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let log_dir = cli.log_dir.as_deref().map(absolute_path).transpose()?;
    let level = match (&cli.log_level, &log_dir) {
        (Some(level), _) => level.as_str(),
        (None, Some(_)) => default_log_level(),
        (None, None) => STDERR_LOG_LEVEL,
    };
    init_logging(level, log_dir.as_deref()).map_err(|err| err.to_string())?;

    let vault = FsVault::open(&cli.vault)
        .map_err(|err| format!("cannot open vault `{}`: {err}", cli.vault.display()))?;
    let settings_path = cli
        .config
        .clone()
        .unwrap_or_else(|| vault.root().join(SETTINGS_FILE_NAME));
    let mut settings = SettingsStore::load(settings_path).map_err(|err| err.to_string())?;

    let ui = TerminalUi::new(cli.yes);
    let service = LinkService::new(&vault, &ui, settings.settings().clone());
    info!(
        "event=cli_start module=cli status=ok vault={} command={:?}",
        vault.root().display(),
        cli.command
    );

    match cli.command {
        Commands::Suggest { note } => run_suggest(&service, &vault, &note),
        Commands::NewChild { note } => run_new_child(&service, &vault, &note),
        Commands::Backlink { note } => run_backlink(&service, &vault, &note),
        Commands::Process { note } => run_process(&service, &vault, &note),
        Commands::Crosslink { note } => run_crosslink(&service, &vault, &note),
        Commands::Check => run_check(&vault),
        Commands::Config { set } => run_config(&mut settings, set.as_deref()),
    }
}

fn run_suggest(service: &CliService<'_>, vault: &FsVault, query: &str) -> Result<(), CliError> {
    let note = resolve_note(vault, query)?;
    service.suggest_next_child(&note).map_err(reported)?;
    Ok(())
}

fn run_new_child(service: &CliService<'_>, vault: &FsVault, query: &str) -> Result<(), CliError> {
    let note = resolve_note(vault, query)?;
    match service.create_next_child(&note).map_err(reported)? {
        ChildCreation::Created(created) => service
            .on_created(&created)
            .map_err(|err| CliError::Message(format!("Failed to link {}: {err}", created.path))),
        ChildCreation::Cancelled { .. } => Ok(()),
    }
}

fn run_backlink(service: &CliService<'_>, vault: &FsVault, query: &str) -> Result<(), CliError> {
    let note = resolve_note(vault, query)?;
    service.add_backlink_to_parent(&note).map_err(reported)?;
    Ok(())
}

fn run_process(service: &CliService<'_>, vault: &FsVault, query: &str) -> Result<(), CliError> {
    let note = resolve_note(vault, query)?;
    service
        .on_created(&note)
        .map_err(|err| CliError::Message(format!("Failed to process {}: {err}", note.path)))
}

fn run_crosslink(service: &CliService<'_>, vault: &FsVault, query: &str) -> Result<(), CliError> {
    let note = resolve_note(vault, query)?;
    service
        .on_modified(&note)
        .map_err(|err| CliError::Message(format!("Failed to cross-link {}: {err}", note.path)))
}

fn run_check(vault: &FsVault) -> Result<(), CliError> {
    let groups = CollectionIndex::new(vault)
        .duplicate_groups()
        .map_err(|err| err.to_string())?;
    if groups.is_empty() {
        println!("No duplicate folgezettel addresses.");
        return Ok(());
    }
    for group in &groups {
        println!("{}:", group.address);
        for note in &group.notes {
            println!("  {}", note.path);
        }
    }
    Err(CliError::Message(format!(
        "{} duplicate address(es) found",
        groups.len()
    )))
}

fn run_config(settings: &mut SettingsStore, assignment: Option<&str>) -> Result<(), CliError> {
    if let Some(assignment) = assignment {
        let (key, value) = parse_assignment(assignment)?;
        settings
            .update(|current| current.set_value(key, value))
            .map_err(|err| err.to_string())?;
        println!("Updated {key} in {}", settings.path().display());
    }
    let json = serde_json::to_string_pretty(settings.settings()).map_err(|err| err.to_string())?;
    println!("{json}");
    Ok(())
}

fn parse_assignment(assignment: &str) -> Result<(&str, &str), String> {
    match assignment.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value)),
        _ => Err(format!("expected KEY=VALUE, got `{assignment}`")),
    }
}

/// Finds a note by vault-relative path, then by basename (case-insensitive).
fn resolve_note(vault: &FsVault, query: &str) -> Result<Note, CliError> {
    let normalized = query.replace('\\', "/");
    let normalized = normalized.trim_start_matches("./");
    let notes = vault.list_notes().map_err(|err| err.to_string())?;
    if let Some(note) = notes.into_iter().find(|note| note.path == normalized) {
        return Ok(note);
    }
    let basename = normalized.strip_suffix(".md").unwrap_or(normalized);
    CollectionIndex::new(vault)
        .find_by_basename(basename)
        .map_err(|err| err.to_string())?
        .ok_or_else(|| CliError::Message(format!("note not found in vault: {query}")))
}

fn absolute_path(path: &Path) -> Result<PathBuf, String> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .map_err(|err| format!("cannot resolve `{}`: {err}", path.display()))
}

fn reported(err: LinkServiceError) -> CliError {
    log::debug!("event=cli_command module=cli status=error error={err}");
    CliError::Reported
}

#[cfg(test)]
mod tests {
    use super::{parse_assignment, resolve_note, Cli, CliError, Commands};
    use clap::Parser;
    use folgezettel_core::FsVault;
    use std::fs;

    #[test]
    fn global_flags_parse_after_the_subcommand() {
        let cli = Cli::try_parse_from([
            "folgezettel",
            "new-child",
            "1.2 Topic",
            "--vault",
            "/tmp/vault",
            "--yes",
        ])
        .unwrap();
        assert!(cli.yes);
        assert_eq!(cli.vault.to_str(), Some("/tmp/vault"));
        assert!(matches!(cli.command, Commands::NewChild { ref note } if note == "1.2 Topic"));
    }

    #[test]
    fn config_set_takes_an_assignment() {
        let cli = Cli::try_parse_from(["folgezettel", "config", "--set", "autoProcess=false"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config { set: Some(ref value) } if value == "autoProcess=false"
        ));
        assert_eq!(
            parse_assignment("crossLinkHeading=See = Also").unwrap(),
            ("crossLinkHeading", "See = Also")
        );
        assert!(parse_assignment("novalue").is_err());
        assert!(parse_assignment("=x").is_err());
    }

    #[test]
    fn resolve_note_by_path_or_basename() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("zettel")).unwrap();
        fs::write(dir.path().join("zettel/1.2 Topic.md"), "").unwrap();
        let vault = FsVault::open(dir.path()).unwrap();

        let by_path = resolve_note(&vault, "./zettel/1.2 Topic.md").unwrap();
        assert_eq!(by_path.path, "zettel/1.2 Topic.md");
        let by_name = resolve_note(&vault, "1.2 topic").unwrap();
        assert_eq!(by_name.path, "zettel/1.2 Topic.md");
        let by_file_name = resolve_note(&vault, "1.2 Topic.md").unwrap();
        assert_eq!(by_file_name.path, "zettel/1.2 Topic.md");
        assert!(matches!(
            resolve_note(&vault, "missing"),
            Err(CliError::Message(_))
        ));
    }
}
