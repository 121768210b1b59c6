//! Release pipeline: ordered git/gh steps with abort on first failure

use super::Version;
use crate::repo::ReleaseConfig;
use std::fmt;
use std::path::Path;
use std::process::Command;

/// Errors raised while running release steps
#[derive(Debug, thiserror::Error)]
pub enum ReleaseError {
    #[error("failed to execute `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("command `{command}` failed with {status}")]
    StepFailed { command: String, status: String },
}

/// One external command in the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseStep {
    pub program: String,
    pub args: Vec<String>,
}

impl ReleaseStep {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

impl fmt::Display for ReleaseStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Executes release steps
pub trait CommandRunner {
    fn run(&self, step: &ReleaseStep, cwd: &Path) -> Result<(), ReleaseError>;
}

/// Runs steps as child processes sharing this process's stdio
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, step: &ReleaseStep, cwd: &Path) -> Result<(), ReleaseError> {
        let status = Command::new(&step.program)
            .args(&step.args)
            .current_dir(cwd)
            .status()
            .map_err(|source| ReleaseError::Spawn {
                command: step.to_string(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(ReleaseError::StepFailed {
                command: step.to_string(),
                status: status.to_string(),
            })
        }
    }
}

/// Ordered steps publishing a new version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleasePipeline {
    steps: Vec<ReleaseStep>,
}

impl ReleasePipeline {
    /// Plan the release of `version` after `version_file` was rewritten
    pub fn plan(version: &Version, version_file: &str, config: &ReleaseConfig) -> Self {
        let version = version.to_string();
        let tag = format!("{}{}", config.tag_prefix, version);
        let message = config.commit_message.replace("{version}", &version);
        let title = config.release_title.replace("{version}", &version);

        let mut steps = vec![
            ReleaseStep::new("git", &["add", version_file]),
            ReleaseStep::new("git", &["commit", "-m", &message]),
        ];

        if config.push {
            steps.push(ReleaseStep::new("git", &["push"]));
        }

        steps.push(ReleaseStep::new("git", &["tag", &tag]));

        if config.push {
            steps.push(ReleaseStep::new("git", &["push", "--tags"]));
        }

        if config.create_release {
            steps.push(ReleaseStep::new(
                "gh",
                &["release", "create", &tag, "--title", &title, "--generate-notes"],
            ));
        }

        Self { steps }
    }

    pub fn steps(&self) -> &[ReleaseStep] {
        &self.steps
    }

    /// Run every step in order, stopping at the first failure
    pub fn run(&self, runner: &dyn CommandRunner, cwd: &Path) -> Result<(), ReleaseError> {
        for step in &self.steps {
            tracing::info!("Running: {}", step);
            runner.run(step, cwd).inspect_err(|e| {
                tracing::error!("Error executing command: {}", step);
                tracing::error!("Error: {}", e);
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Records steps and fails the one at `fail_at`
    struct RecordingRunner {
        ran: RefCell<Vec<String>>,
        fail_at: Option<usize>,
    }

    impl RecordingRunner {
        fn new(fail_at: Option<usize>) -> Self {
            Self {
                ran: RefCell::new(Vec::new()),
                fail_at,
            }
        }
    }

    impl CommandRunner for RecordingRunner {
        fn run(&self, step: &ReleaseStep, _cwd: &Path) -> Result<(), ReleaseError> {
            let index = self.ran.borrow().len();
            self.ran.borrow_mut().push(step.to_string());
            if self.fail_at == Some(index) {
                return Err(ReleaseError::StepFailed {
                    command: step.to_string(),
                    status: "exit status: 1".to_string(),
                });
            }
            Ok(())
        }
    }

    #[test]
    fn test_default_plan() {
        let plan = ReleasePipeline::plan(
            &Version::new(1, 3, 0),
            "src/pkg/__init__.py",
            &ReleaseConfig::default(),
        );

        let commands: Vec<String> = plan.steps().iter().map(|s| s.to_string()).collect();
        assert_eq!(
            commands,
            vec![
                "git add src/pkg/__init__.py",
                "git commit -m \"release 1.3.0: version bump commit\"",
                "git push",
                "git tag v1.3.0",
                "git push --tags",
                "gh release create v1.3.0 --title \"Release 1.3.0\" --generate-notes",
            ]
        );
    }

    #[test]
    fn test_plan_without_push_or_release() {
        let config = ReleaseConfig {
            push: false,
            create_release: false,
            ..Default::default()
        };
        let plan = ReleasePipeline::plan(&Version::new(0, 1, 0), "VERSION.py", &config);

        let programs: Vec<&str> = plan
            .steps()
            .iter()
            .map(|s| s.args[0].as_str())
            .collect();
        assert_eq!(programs, vec!["add", "commit", "tag"]);
    }

    #[test]
    fn test_run_aborts_at_first_failure() {
        let plan = ReleasePipeline::plan(
            &Version::new(2, 0, 0),
            "__init__.py",
            &ReleaseConfig::default(),
        );
        let runner = RecordingRunner::new(Some(2));

        let err = plan.run(&runner, Path::new(".")).unwrap_err();
        assert!(matches!(err, ReleaseError::StepFailed { ref command, .. } if command == "git push"));
        assert_eq!(runner.ran.borrow().len(), 3);
    }

    #[test]
    fn test_run_all_steps() {
        let plan = ReleasePipeline::plan(
            &Version::new(2, 0, 0),
            "__init__.py",
            &ReleaseConfig::default(),
        );
        let runner = RecordingRunner::new(None);

        plan.run(&runner, Path::new(".")).unwrap();
        assert_eq!(runner.ran.borrow().len(), plan.steps().len());
    }

    #[test]
    fn test_system_runner_reports_missing_program() {
        let step = ReleaseStep::new("docpolish-no-such-program", &["--help"]);
        let err = SystemRunner.run(&step, Path::new(".")).unwrap_err();
        assert!(matches!(err, ReleaseError::Spawn { .. }));
    }
}
