//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::baby::{AddBabyArgs, ListBabiesArgs};
use crate::commands::log::{LogDiaperArgs, LogFeedArgs, LogMilestoneArgs, LogSleepArgs};
use crate::commands::report::ReportArgs;
use crate::commands::sleep::EndSleepArgs;
use crate::commands::summary::SummaryArgs;
use crate::commands::targets::TargetsArgs;

/// Shared infant care log.
///
/// Records sleeps, feeds, diapers and milestones, and reports sleep and
/// feeding patterns against age-appropriate targets.
#[derive(Debug, Parser)]
#[command(name = "bs", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage baby profiles.
    #[command(subcommand)]
    Baby(BabyAction),

    /// Log a care event.
    #[command(subcommand)]
    Log(LogAction),

    /// Act on the sleep in progress.
    #[command(subcommand)]
    Sleep(SleepAction),

    /// Sleep or feeding analytics over a date range.
    #[command(subcommand)]
    Report(ReportKind),

    /// Per-day overview of every event kind.
    Summary(SummaryArgs),

    /// Age-appropriate sleep, feeding and wake-window targets.
    Targets(TargetsArgs),
}

/// Profile actions.
#[derive(Debug, Subcommand)]
pub enum BabyAction {
    /// Add a baby profile.
    Add(AddBabyArgs),
    /// List baby profiles.
    List(ListBabiesArgs),
}

/// Event kinds that can be logged.
#[derive(Debug, Subcommand)]
pub enum LogAction {
    /// Log a sleep, ongoing unless --end is given.
    Sleep(LogSleepArgs),
    /// Log a feed.
    Feed(LogFeedArgs),
    /// Log a diaper change.
    Diaper(LogDiaperArgs),
    /// Log a milestone.
    Milestone(LogMilestoneArgs),
}

/// Sleep lifecycle actions.
#[derive(Debug, Subcommand)]
pub enum SleepAction {
    /// End the sleep in progress.
    End(EndSleepArgs),
}

/// Report kinds.
#[derive(Debug, Subcommand)]
pub enum ReportKind {
    /// Sleep totals, averages and wake windows.
    Sleep(ReportArgs),
    /// Feeding counts, volumes and intervals.
    Feeding(ReportArgs),
}
