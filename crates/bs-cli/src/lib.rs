//! BabySync CLI library.
//!
//! This crate provides the `bs` command-line interface over the care log.

mod cli;
pub mod commands;
mod config;

pub use cli::{BabyAction, Cli, Commands, LogAction, ReportKind, SleepAction};
pub use config::Config;
