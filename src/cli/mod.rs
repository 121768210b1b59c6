//! CLI interface using clap
//!
//! Provides the command-line interface for DocPolish

mod commands;

pub use commands::*;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// DocPolish - AI-assisted markdown fixing and release tooling
#[derive(Parser, Debug)]
#[command(name = "docpolish")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the project (defaults to current directory)
    #[arg(short, long, global = true, default_value = ".")]
    pub path: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fix spelling, grammar and formatting in markdown files (pre-commit hook)
    CheckMarkdown(CheckMarkdownArgs),

    /// Bump the version and publish a release
    Bump(BumpArgs),

    /// Print a greeting
    Hello,

    /// Install git hooks for automatic markdown checks
    Hooks(HooksArgs),

    /// Show configuration
    Config(ConfigArgs),
}

/// Arguments for check-markdown command
#[derive(Parser, Debug)]
pub struct CheckMarkdownArgs {
    /// Files to check; anything not ending in `.md` is skipped
    pub files: Vec<PathBuf>,

    /// Model used by the correction service
    #[arg(long, env = "DOCPOLISH_MODEL")]
    pub model: Option<String>,

    /// Maximum service turns per file
    #[arg(long, env = "DOCPOLISH_MAX_TURNS")]
    pub max_turns: Option<u32>,

    /// Correction service executable
    #[arg(long, env = "DOCPOLISH_CLAUDE")]
    pub program: Option<String>,
}

/// Arguments for bump command
#[derive(Parser, Debug)]
pub struct BumpArgs {
    /// Version component to bump (major, minor, patch)
    pub kind: String,

    /// Version file, relative to the project root
    #[arg(short, long)]
    pub file: Option<String>,

    /// Print the planned release steps without changing anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for hooks command
#[derive(Parser, Debug)]
pub struct HooksArgs {
    /// Install hooks
    #[arg(long)]
    pub install: bool,

    /// Uninstall hooks
    #[arg(long)]
    pub uninstall: bool,
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Write the default configuration file
    #[arg(long)]
    pub init: bool,

    /// Overwrite an existing configuration file
    #[arg(long, requires = "init")]
    pub force: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
