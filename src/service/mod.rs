//! Text-correction service integration
//!
//! This module handles:
//! - The correction request submitted for one file
//! - The streaming event model returned by the service
//! - Backends: the `claude` CLI and a scripted backend for tests

mod claude;
mod events;
mod mock;

pub use claude::ClaudeCli;
pub use events::{
    content_text, ContentBlock, Message, MessageContent, ServiceEvent, EDIT_TOOL,
    MAX_TURNS_SUBTYPE,
};
pub use mock::ScriptedService;

use async_trait::async_trait;
use futures::stream::BoxStream;
use std::fmt;
use std::path::{Path, PathBuf};

/// Lazy, finite, non-restartable stream of events for one request
pub type EventStream = BoxStream<'static, Result<ServiceEvent, ServiceError>>;

/// Errors raised while talking to the correction service
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read service output: {0}")]
    Io(#[from] std::io::Error),

    #[error("service process has no stdout handle")]
    MissingStdout,

    #[error("malformed service event `{line}`: {source}")]
    Decode {
        line: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("service exited with {status}: {stderr}")]
    ProcessFailed { status: String, stderr: String },

    #[error("{0}")]
    Other(String),
}

/// How the service may apply edits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionMode {
    /// Prompt before each edit
    Default,
    /// Apply file edits without confirmation
    #[default]
    AcceptEdits,
}

impl fmt::Display for PermissionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermissionMode::Default => write!(f, "default"),
            PermissionMode::AcceptEdits => write!(f, "acceptEdits"),
        }
    }
}

/// Service configuration attached to a request
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceOptions {
    /// Model identifier
    pub model: String,
    /// Edit permission mode
    pub permission_mode: PermissionMode,
    /// Tool permissions, e.g. `Edit(/abs/path.md)`
    pub allowed_tools: Vec<String>,
    /// Maximum number of agent turns
    pub max_turns: u32,
    /// Working directory of the service
    pub cwd: PathBuf,
}

/// Everything submitted to the service for one file
#[derive(Debug, Clone)]
pub struct CorrectionRequest {
    /// Absolute path of the target file
    pub path: PathBuf,
    /// File content at submission time
    pub content: String,
    /// Instruction prompt
    pub prompt: String,
    /// Service configuration
    pub options: ServiceOptions,
}

impl CorrectionRequest {
    /// Build a request whose edit capability is scoped to `path` only
    pub fn new(
        path: &Path,
        content: String,
        prompt: String,
        model: &str,
        max_turns: u32,
        cwd: &Path,
    ) -> Self {
        Self {
            path: path.to_path_buf(),
            content,
            prompt,
            options: ServiceOptions {
                model: model.to_string(),
                permission_mode: PermissionMode::AcceptEdits,
                allowed_tools: vec![edit_permission(path)],
                max_turns,
                cwd: cwd.to_path_buf(),
            },
        }
    }
}

/// Tool permission granting edits to exactly one file
pub fn edit_permission(path: &Path) -> String {
    format!("{}({})", EDIT_TOOL, path.display())
}

/// A backend that turns a correction request into an event stream
#[async_trait]
pub trait CorrectionService: Send + Sync {
    /// Start the exchange for one request
    async fn open(&self, request: &CorrectionRequest) -> Result<EventStream, ServiceError>;

    /// Backend name for diagnostics
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_scopes_edit_to_one_file() {
        let request = CorrectionRequest::new(
            Path::new("/repo/docs/guide.md"),
            "# Guide".to_string(),
            "fix it".to_string(),
            "haiku",
            2,
            Path::new("/repo"),
        );

        assert_eq!(request.options.allowed_tools, vec!["Edit(/repo/docs/guide.md)"]);
        assert_eq!(request.options.permission_mode, PermissionMode::AcceptEdits);
        assert_eq!(request.options.max_turns, 2);
        assert_eq!(request.options.model, "haiku");
    }

    #[test]
    fn test_permission_mode_display() {
        assert_eq!(PermissionMode::AcceptEdits.to_string(), "acceptEdits");
        assert_eq!(PermissionMode::Default.to_string(), "default");
    }
}
