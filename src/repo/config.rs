//! Project configuration for DocPolish

use crate::fixer::{DEFAULT_MAX_TURNS, DEFAULT_MODEL};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory holding DocPolish state inside a project
pub const CONFIG_DIR: &str = ".docpolish";

/// Configuration file name inside `CONFIG_DIR`
pub const CONFIG_FILE: &str = "config.toml";

/// Configuration for a project using DocPolish
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Markdown fixer settings
    #[serde(default)]
    pub fixer: FixerConfig,

    /// Version bump and release settings
    #[serde(default)]
    pub release: ReleaseConfig,
}

/// Markdown fixer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixerConfig {
    /// Executable of the correction service
    #[serde(default = "default_program")]
    pub program: String,

    /// Model identifier passed to the service
    #[serde(default = "default_model")]
    pub model: String,

    /// Maximum agent turns per file
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,
}

/// Release configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseConfig {
    /// File holding the `__version__` assignment, relative to the project root
    #[serde(default = "default_version_file")]
    pub version_file: String,

    /// Prefix for release tags
    #[serde(default = "default_tag_prefix")]
    pub tag_prefix: String,

    /// Commit message; `{version}` is replaced with the new version
    #[serde(default = "default_commit_message")]
    pub commit_message: String,

    /// Hosted release title; `{version}` is replaced with the new version
    #[serde(default = "default_release_title")]
    pub release_title: String,

    /// Push the commit and tags
    #[serde(default = "default_true")]
    pub push: bool,

    /// Create a hosted release with `gh`
    #[serde(default = "default_true")]
    pub create_release: bool,
}

fn default_program() -> String {
    "claude".to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_max_turns() -> u32 {
    DEFAULT_MAX_TURNS
}

fn default_version_file() -> String {
    "src/__init__.py".to_string()
}

fn default_tag_prefix() -> String {
    "v".to_string()
}

fn default_commit_message() -> String {
    "release {version}: version bump commit".to_string()
}

fn default_release_title() -> String {
    "Release {version}".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for FixerConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            model: default_model(),
            max_turns: default_max_turns(),
        }
    }
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            version_file: default_version_file(),
            tag_prefix: default_tag_prefix(),
            commit_message: default_commit_message(),
            release_title: default_release_title(),
            push: default_true(),
            create_release: default_true(),
        }
    }
}

impl ProjectConfig {
    /// Path of the configuration file under a project root
    pub fn path(root: &Path) -> PathBuf {
        root.join(CONFIG_DIR).join(CONFIG_FILE)
    }

    /// Load configuration from the project or return defaults
    pub fn load_or_default(root: &Path) -> Result<Self> {
        let config_path = Self::path(root);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config file: {:?}", config_path))?;
            let config: ProjectConfig = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the project
    pub fn save(&self, root: &Path) -> Result<()> {
        let config_dir = root.join(CONFIG_DIR);
        std::fs::create_dir_all(&config_dir)?;

        let config_path = Self::path(root);
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        std::fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        Ok(())
    }
}
