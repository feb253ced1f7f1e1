use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use bs_core::{Clock, SystemClock};
use chrono::Local;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use bs_cli::commands::{baby, log, report, sleep, summary, targets};
use bs_cli::{BabyAction, Cli, Commands, Config, LogAction, ReportKind, SleepAction};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(bs_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = bs_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    // One reference time per invocation
    let utc_now = SystemClock.now();
    let now = utc_now.with_timezone(&Local);
    let timezone = iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string());

    let (mut db, config) = open_database(cli.config.as_deref())?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match command {
        Commands::Baby(action) => match action {
            BabyAction::Add(args) => {
                baby::add(&mut out, &mut db, args, &now)?;
            }
            BabyAction::List(args) => baby::list(&mut out, &db, args, &now)?,
        },
        Commands::Log(action) => match action {
            LogAction::Sleep(args) => {
                log::sleep(&mut out, &mut db, args, &config, utc_now)?;
            }
            LogAction::Feed(args) => {
                log::feed(&mut out, &mut db, args, &config, utc_now)?;
            }
            LogAction::Diaper(args) => {
                log::diaper(&mut out, &mut db, args, &config, utc_now)?;
            }
            LogAction::Milestone(args) => {
                log::milestone(&mut out, &mut db, args, &config, utc_now)?;
            }
        },
        Commands::Sleep(SleepAction::End(args)) => {
            sleep::end(&mut out, &mut db, args, &config, utc_now)?;
        }
        Commands::Report(kind) => match kind {
            ReportKind::Sleep(args) => {
                report::sleep(&mut out, &db, args, &config, &now, &timezone)?;
            }
            ReportKind::Feeding(args) => {
                report::feeding(&mut out, &db, args, &config, &now, &timezone)?;
            }
        },
        Commands::Summary(args) => {
            summary::run(&mut out, &db, args, &config, &now)?;
        }
        Commands::Targets(args) => targets::run(&mut out, &db, args, &config, &now)?,
    }

    out.flush()?;
    Ok(())
}
