//! CLI subcommand implementations.

pub mod baby;
pub mod log;
pub mod report;
pub mod sleep;
pub mod summary;
pub mod targets;
pub mod util;
