//! CLI subcommand implementations.

pub mod daily;
pub mod events;
pub mod util;
