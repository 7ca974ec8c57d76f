//! badgeseed - populate the camp tables from local JSON files.
//!
//! `departments` must run before `merit-badges`: badges are linked to their
//! department by looking the department up by name.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use badgeseed_core::api::{ApiClient, MemoryBackend};
use badgeseed_core::config::BackendConfig;
use badgeseed_core::schema::{DEPARTMENT_NAME, DEPARTMENT_TABLE};
use badgeseed_core::seed::{self, FailurePolicy, SeedReport};
use badgeseed_core::source::{
    self, BadgesByDepartment, DEFAULT_DEPARTMENTS_DIR, DEFAULT_MERIT_BADGES_DIR,
};
use badgeseed_core::utils::format_preview;

#[derive(Parser, Debug)]
#[command(version, about = "Seed camp departments and merit badges")]
struct Cli {
    /// Log every row written
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Insert every department listed in the department files
    Departments {
        #[arg(long, default_value = DEFAULT_DEPARTMENTS_DIR)]
        dir: PathBuf,

        /// Write to an in-memory store and print the rows instead of calling the backend
        #[arg(long)]
        dry_run: bool,
    },
    /// Insert every merit badge and its requirements
    MeritBadges {
        #[arg(long, default_value = DEFAULT_MERIT_BADGES_DIR)]
        dir: PathBuf,

        /// What to do with nested requirements when their parent fails to insert
        #[arg(long, value_enum, default_value_t = OnFailure::SkipSubtree)]
        on_requirement_failure: OnFailure,

        /// Write to an in-memory store and print the rows instead of calling the backend
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the parsed merit badges without writing anything
    Preview {
        #[arg(long, default_value = DEFAULT_MERIT_BADGES_DIR)]
        dir: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OnFailure {
    /// Leave out everything nested under the failed requirement
    SkipSubtree,
    /// Insert nested requirements under the nearest inserted ancestor
    SkipNode,
}

impl From<OnFailure> for FailurePolicy {
    fn from(value: OnFailure) -> Self {
        match value {
            OnFailure::SkipSubtree => FailurePolicy::SkipSubtree,
            OnFailure::SkipNode => FailurePolicy::SkipNode,
        }
    }
}

/// Initialize the tracing subscriber for logging
fn init_tracing(verbose: bool) {
    // RUST_LOG takes precedence over --verbose
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let report = match cli.command {
        Commands::Departments { dir, dry_run } => {
            let records = source::load_department_records(&dir)?;
            info!(count = records.len(), dir = %dir.display(), "Loaded department records");

            if dry_run {
                let memory = MemoryBackend::new();
                let report = seed::seed_departments(&memory, &records).await;
                print_attempts(&memory)?;
                report
            } else {
                let client = connect()?;
                seed::seed_departments(&client, &records).await
            }
        }
        Commands::MeritBadges {
            dir,
            on_requirement_failure,
            dry_run,
        } => {
            let mut badges = source::load_merit_badges(&dir)?;
            let policy = FailurePolicy::from(on_requirement_failure);
            info!(
                departments = badges.len(),
                badges = badges.values().map(Vec::len).sum::<usize>(),
                "Loaded merit badges"
            );

            if dry_run {
                let memory = memory_with_departments(&badges);
                let report = seed::seed_merit_badges(&memory, &mut badges, policy).await;
                print_attempts(&memory)?;
                report
            } else {
                let client = connect()?;
                seed::seed_merit_badges(&client, &mut badges, policy).await
            }
        }
        Commands::Preview { dir } => {
            let badges = source::load_merit_badges(&dir)?;
            print!("{}", format_preview(&badges));
            return Ok(());
        }
    };

    finish(&report);
    Ok(())
}

fn connect() -> Result<ApiClient> {
    let config = BackendConfig::from_env();
    let client = ApiClient::new(&config).context("Failed to create backend client")?;
    info!(url = client.base_url(), "Connected to backend");
    Ok(client)
}

/// An in-memory store that already holds every department the badges refer
/// to, so a dry run exercises the whole badge path.
fn memory_with_departments(badges: &BadgesByDepartment) -> MemoryBackend {
    let memory = MemoryBackend::new();
    for department in badges.keys() {
        memory.preload(DEPARTMENT_TABLE, serde_json::json!({ DEPARTMENT_NAME: department }));
    }
    memory
}

fn print_attempts(memory: &MemoryBackend) -> Result<()> {
    for (table, row) in memory.attempts() {
        println!("{} {}", table, serde_json::to_string(&row)?);
    }
    Ok(())
}

fn finish(report: &SeedReport) {
    // Per-record failures were already logged; the run itself still succeeded.
    println!("{}", report.summary());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_merit_badge_options() {
        let cli = Cli::try_parse_from([
            "badgeseed",
            "merit-badges",
            "--dir",
            "data/badges",
            "--on-requirement-failure",
            "skip-node",
            "--dry-run",
        ])
        .unwrap();

        match cli.command {
            Commands::MeritBadges {
                dir,
                on_requirement_failure,
                dry_run,
            } => {
                assert!(dry_run);
                assert_eq!(dir, PathBuf::from("data/badges"));
                assert_eq!(FailurePolicy::from(on_requirement_failure), FailurePolicy::SkipNode);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["badgeseed", "departments"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Departments { dir, dry_run: false } if dir == PathBuf::from(DEFAULT_DEPARTMENTS_DIR)
        ));
    }

    #[test]
    fn test_dry_run_only_applies_to_seeding_commands() {
        assert!(Cli::try_parse_from(["badgeseed", "preview", "--dry-run"]).is_err());
        assert!(Cli::try_parse_from(["badgeseed", "--dry-run", "departments"]).is_err());

        let cli = Cli::try_parse_from(["badgeseed", "departments", "--dry-run"]).unwrap();
        assert!(matches!(cli.command, Commands::Departments { dry_run: true, .. }));
    }

    #[test]
    fn test_dry_run_store_knows_every_department() {
        let mut badges = BadgesByDepartment::new();
        badges.insert("NATURE".to_string(), Vec::new());
        badges.insert("AQUATICS".to_string(), Vec::new());

        let memory = memory_with_departments(&badges);
        let names: Vec<_> = memory
            .rows(DEPARTMENT_TABLE)
            .iter()
            .map(|r| r[DEPARTMENT_NAME].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["AQUATICS", "NATURE"]);
    }
}
