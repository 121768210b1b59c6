//! DocPolish - Developer workflow tooling
//!
//! This library provides a pre-commit markdown fixer backed by an AI
//! assistant service, version bump and release automation, and the
//! supporting project configuration.

pub mod cli;
pub mod fixer;
pub mod repo;
pub mod service;
pub mod version;

/// Re-export commonly used types
pub use fixer::{FileOutcome, MarkdownFixer, RunDisposition};
pub use repo::{Project, ProjectConfig};
pub use service::{ClaudeCli, CorrectionService};
pub use version::{BumpKind, Version};

/// Application-wide error type
pub use anyhow::Result;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "docpolish";

/// Greeting printed by the `hello` command
pub fn greeting() -> String {
    format!("Hello from {}!", APP_NAME)
}
