//! Project discovery and configuration module
//!
//! This module handles:
//! - Locating the project root (git working tree or plain directory)
//! - Loading the project configuration
//! - Locating the git hooks directory

mod config;

pub use config::{FixerConfig, ProjectConfig, ReleaseConfig, CONFIG_DIR, CONFIG_FILE};

use anyhow::{Context, Result};
use git2::Repository as GitRepo;
use std::path::{Path, PathBuf};

/// The project DocPolish operates on
pub struct Project {
    /// Git repository, when the project is inside one
    git: Option<GitRepo>,
    /// Path to the project root
    root: PathBuf,
    /// Project configuration
    config: ProjectConfig,
}

impl Project {
    /// Open the project containing `path`
    ///
    /// Falls back to `path` itself as the root outside a git repository.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let (git, root) = match GitRepo::discover(path) {
            Ok(repo) => {
                let root = repo
                    .workdir()
                    .ok_or_else(|| anyhow::anyhow!("Repository has no working directory (bare repo?)"))?
                    .to_path_buf();
                (Some(repo), root)
            }
            Err(e) => {
                tracing::debug!("No git repository at {:?}: {}", path, e.message());
                let root = std::path::absolute(path)
                    .with_context(|| format!("Failed to resolve project path {:?}", path))?;
                (None, root)
            }
        };

        let config = ProjectConfig::load_or_default(&root)?;

        Ok(Self { git, root, config })
    }

    /// Open the project, requiring a git repository
    pub fn open_git<P: AsRef<Path>>(path: P) -> Result<Self> {
        let project = Self::open(path.as_ref())?;
        if project.git.is_none() {
            anyhow::bail!("Not a git repository: {:?}", path.as_ref());
        }
        Ok(project)
    }

    /// Get the project root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the project configuration
    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// Whether the project is a git working tree
    pub fn is_git(&self) -> bool {
        self.git.is_some()
    }

    /// Path to the git hooks directory
    pub fn hooks_dir(&self) -> Result<PathBuf> {
        let repo = self
            .git
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Not a git repository: {:?}", self.root))?;
        Ok(repo.path().join("hooks"))
    }

    /// Absolute path of a project-relative file
    pub fn resolve(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }
}
