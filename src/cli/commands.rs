//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - watch: keep polling and report changes (default)
//! - login / logout: manage the stored API token
//! - status: check once and exit

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// reviewcount - know when your WaniKani reviews are ready
#[derive(Parser, Debug)]
#[command(name = "reviewcount")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Poll for reviews and print a line whenever the count changes
    Watch,

    /// Validate and store an API token
    Login {
        /// Personal API token (read-only access is enough)
        token: String,
    },

    /// Remove the stored API token
    Logout,

    /// Check reviews once and exit
    Status,
}

/// Commands read from stdin while watching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchInput {
    /// The user is starting a review session
    Start,
    /// Poll right away
    Reload,
    Quit,
}

impl WatchInput {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "s" | "start" => Some(WatchInput::Start),
            "r" | "reload" => Some(WatchInput::Reload),
            "q" | "quit" | "exit" => Some(WatchInput::Quit),
            _ => None,
        }
    }
}
