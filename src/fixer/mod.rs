//! Markdown fixer
//!
//! This module handles:
//! - Selecting markdown files from a list of paths
//! - Submitting each file to the correction service
//! - Aggregating per-file outcomes into a run disposition

mod prompts;
mod tracker;

pub use prompts::CorrectionPrompt;
pub use tracker::EditTracker;

use crate::service::{CorrectionRequest, CorrectionService};
use anyhow::{Context, Result};
use futures::TryStreamExt;
use std::path::{Path, PathBuf};

/// Default model for corrections
pub const DEFAULT_MODEL: &str = "haiku";

/// Default service turn limit per file
pub const DEFAULT_MAX_TURNS: u32 = 2;

/// Outcome of checking one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    /// Path as given on the command line
    pub path: PathBuf,
    /// Whether the service applied an edit
    pub modified: bool,
    /// Error raised while reading or talking to the service
    pub error: Option<String>,
}

impl FileOutcome {
    fn completed(path: &Path, modified: bool) -> Self {
        Self {
            path: path.to_path_buf(),
            modified,
            error: None,
        }
    }

    fn failed(path: &Path, error: &anyhow::Error) -> Self {
        Self {
            path: path.to_path_buf(),
            modified: false,
            error: Some(format!("{:#}", error)),
        }
    }
}

/// Aggregate over all outcomes of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    pub had_errors: bool,
    pub files_modified: bool,
}

impl BatchSummary {
    /// Summarize a set of outcomes
    pub fn from_outcomes(outcomes: &[FileOutcome]) -> Self {
        Self {
            had_errors: outcomes.iter().any(|o| o.error.is_some()),
            files_modified: outcomes.iter().any(|o| o.modified),
        }
    }

    /// Errors take priority over modifications
    pub fn disposition(&self) -> RunDisposition {
        if self.had_errors {
            RunDisposition::Failed
        } else if self.files_modified {
            RunDisposition::Modified
        } else {
            RunDisposition::Clean
        }
    }
}

/// How a fixer run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunDisposition {
    /// No markdown files among the inputs
    NothingToDo,
    /// All files checked, nothing changed
    Clean,
    /// At least one file was fixed
    Modified,
    /// At least one file could not be checked
    Failed,
}

impl RunDisposition {
    /// Process exit code; modified and failed both gate the commit
    pub fn exit_code(&self) -> u8 {
        match self {
            RunDisposition::NothingToDo | RunDisposition::Clean => 0,
            RunDisposition::Modified | RunDisposition::Failed => 1,
        }
    }
}

/// Keep only paths with the exact extension `md`
pub fn select_targets<P: AsRef<Path>>(paths: &[P]) -> Vec<PathBuf> {
    paths
        .iter()
        .map(|p| p.as_ref())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("md"))
        .map(Path::to_path_buf)
        .collect()
}

/// Select targets, logging why there is nothing to do when none remain
pub fn markdown_targets<P: AsRef<Path>>(paths: &[P]) -> Option<Vec<PathBuf>> {
    if paths.is_empty() {
        tracing::info!("No files provided");
        return None;
    }

    let targets = select_targets(paths);
    if targets.is_empty() {
        tracing::info!("No markdown files to check");
        return None;
    }

    Some(targets)
}

/// Runs corrections for markdown files against a service
pub struct MarkdownFixer<'a> {
    service: &'a dyn CorrectionService,
    model: String,
    max_turns: u32,
    cwd: PathBuf,
}

impl<'a> MarkdownFixer<'a> {
    /// Create a fixer whose service runs in `cwd`
    pub fn new(service: &'a dyn CorrectionService, cwd: &Path) -> Self {
        Self {
            service,
            model: DEFAULT_MODEL.to_string(),
            max_turns: DEFAULT_MAX_TURNS,
            cwd: cwd.to_path_buf(),
        }
    }

    /// Set the model identifier
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    /// Set the service turn limit
    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// Check every markdown file among `paths` concurrently
    pub async fn run<P: AsRef<Path>>(&self, paths: &[P]) -> RunDisposition {
        match markdown_targets(paths) {
            Some(targets) => self.run_targets(&targets).await,
            None => RunDisposition::NothingToDo,
        }
    }

    /// Check already selected targets and aggregate their outcomes
    pub async fn run_targets(&self, targets: &[PathBuf]) -> RunDisposition {
        let outcomes = self.run_all(targets).await;

        for outcome in &outcomes {
            if let Some(ref error) = outcome.error {
                tracing::error!("Error processing {}: {}", outcome.path.display(), error);
            }
        }

        BatchSummary::from_outcomes(&outcomes).disposition()
    }

    /// Fan out one task per path and wait for all of them
    pub async fn run_all(&self, paths: &[PathBuf]) -> Vec<FileOutcome> {
        let tasks = paths.iter().map(|path| self.process_file(path));
        futures::future::join_all(tasks).await
    }

    /// Check one file, capturing any failure in the outcome
    pub async fn process_file(&self, path: &Path) -> FileOutcome {
        tracing::info!("Checking {}...", path.display());

        match self.check_file(path).await {
            Ok(modified) => {
                if modified {
                    tracing::info!("File modified: {}", path.display());
                }
                FileOutcome::completed(path, modified)
            }
            Err(e) => FileOutcome::failed(path, &e),
        }
    }

    /// Submit one file to the service and report whether it was edited
    async fn check_file(&self, path: &Path) -> Result<bool> {
        let abs_path = std::path::absolute(path)
            .with_context(|| format!("Failed to resolve path {}", path.display()))?;

        let content = tokio::fs::read_to_string(&abs_path)
            .await
            .with_context(|| format!("Failed to read {}", abs_path.display()))?;

        let prompt = CorrectionPrompt::generate(&abs_path, &content);
        let request = CorrectionRequest::new(
            &abs_path,
            content,
            prompt,
            &self.model,
            self.max_turns,
            &self.cwd,
        );

        let events = self
            .service
            .open(&request)
            .await
            .with_context(|| format!("{} service failed to start", self.service.name()))?;

        let tracker = events
            .try_fold(EditTracker::new(&abs_path), |tracker, event| {
                futures::future::ready(Ok(tracker.observe(&event)))
            })
            .await
            .with_context(|| format!("{} service exchange failed", self.service.name()))?;

        if tracker.modified() {
            log_diff(&abs_path, &request.content).await;
        }

        Ok(tracker.modified())
    }
}

/// Log the applied changes at debug level
async fn log_diff(path: &Path, before: &str) {
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }

    let after = match tokio::fs::read_to_string(path).await {
        Ok(after) => after,
        Err(e) => {
            tracing::debug!("Could not re-read {}: {}", path.display(), e);
            return;
        }
    };

    let name = path.display().to_string();
    tracing::debug!("Changes to {}:\n{}", name, render_diff(&name, before, &after));
}

/// Render a unified diff between two versions of a file
pub fn render_diff(name: &str, before: &str, after: &str) -> String {
    let diff = similar::TextDiff::from_lines(before, after);
    let mut unified = diff.unified_diff();
    unified.header(name, name).to_string()
}
