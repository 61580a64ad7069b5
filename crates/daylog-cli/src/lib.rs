//! daylog CLI library.
//!
//! This crate provides the CLI interface for daylog.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, FilterArgs};
pub use config::Config;
