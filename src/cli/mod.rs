//! CLI module for reviewcount - command-line interface and subcommands.
//!
//! Provides the main entry point with subcommands for watching reviews,
//! managing the API token, and one-off status checks.

pub mod commands;
pub mod render;

pub use commands::Cli;
