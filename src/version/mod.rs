//! Version bumping and release automation
//!
//! This module handles:
//! - Reading the `__version__` assignment from a version file
//! - Major/minor/patch bump arithmetic
//! - The ordered git/gh release pipeline

mod release;

pub use release::{CommandRunner, ReleaseError, ReleasePipeline, ReleaseStep, SystemRunner};

use regex::{NoExpand, Regex};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::LazyLock;

static VERSION_ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"__version__ = ["']([^"']+)["']"#).expect("version pattern is valid")
});

/// Errors raised while reading or bumping a version
#[derive(Debug, thiserror::Error)]
pub enum VersionError {
    #[error("failed to read version file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write version file {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not find __version__ in {0:?}")]
    NotFound(PathBuf),

    #[error("malformed version '{0}', expected MAJOR.MINOR.PATCH")]
    Malformed(String),

    #[error("invalid version type '{0}'. Use 'major', 'minor', or 'patch'")]
    UnknownBump(String),

    #[error("cannot bump {kind} component of {version}: value out of range")]
    Overflow { version: Version, kind: BumpKind },
}

/// Which component of the version to increment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpKind {
    Major,
    Minor,
    Patch,
}

impl FromStr for BumpKind {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "major" => Ok(BumpKind::Major),
            "minor" => Ok(BumpKind::Minor),
            "patch" => Ok(BumpKind::Patch),
            other => Err(VersionError::UnknownBump(other.to_string())),
        }
    }
}

impl fmt::Display for BumpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BumpKind::Major => write!(f, "major"),
            BumpKind::Minor => write!(f, "minor"),
            BumpKind::Patch => write!(f, "patch"),
        }
    }
}

/// A `MAJOR.MINOR.PATCH` version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// The next version for the given bump kind
    pub fn bump(&self, kind: BumpKind) -> Result<Self, VersionError> {
        let overflow = || VersionError::Overflow {
            version: *self,
            kind,
        };

        let next = match kind {
            BumpKind::Major => Version::new(self.major.checked_add(1).ok_or_else(overflow)?, 0, 0),
            BumpKind::Minor => {
                Version::new(self.major, self.minor.checked_add(1).ok_or_else(overflow)?, 0)
            }
            BumpKind::Patch => Version::new(
                self.major,
                self.minor,
                self.patch.checked_add(1).ok_or_else(overflow)?,
            ),
        };

        Ok(next)
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() != 3 {
            return Err(VersionError::Malformed(s.to_string()));
        }

        let parse = |part: &str| {
            part.parse::<u64>()
                .map_err(|_| VersionError::Malformed(s.to_string()))
        };

        Ok(Version::new(parse(parts[0])?, parse(parts[1])?, parse(parts[2])?))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Extract the version from file content
pub fn find_version(content: &str, path: &Path) -> Result<Version, VersionError> {
    let captures = VERSION_ASSIGNMENT
        .captures(content)
        .ok_or_else(|| VersionError::NotFound(path.to_path_buf()))?;

    captures[1].parse()
}

/// Replace every version assignment with `version`
pub fn rewrite_version(content: &str, version: &Version) -> String {
    let replacement = format!("__version__ = \"{}\"", version);
    VERSION_ASSIGNMENT
        .replace_all(content, NoExpand(&replacement))
        .into_owned()
}

/// A file holding a `__version__` assignment
#[derive(Debug, Clone)]
pub struct VersionFile {
    path: PathBuf,
    content: String,
    version: Version,
}

impl VersionFile {
    /// Read and parse a version file
    pub fn load(path: &Path) -> Result<Self, VersionError> {
        let content = std::fs::read_to_string(path).map_err(|source| VersionError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let version = find_version(&content, path)?;

        Ok(Self {
            path: path.to_path_buf(),
            content,
            version,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The version currently recorded in the file
    pub fn version(&self) -> Version {
        self.version
    }

    /// Write `version` back to the file
    pub fn write(&self, version: &Version) -> Result<(), VersionError> {
        let updated = rewrite_version(&self.content, version);
        std::fs::write(&self.path, updated).map_err(|source| VersionError::Write {
            path: self.path.clone(),
            source,
        })
    }
}
