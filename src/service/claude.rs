//! Backend driving the `claude` command-line agent in streaming JSON mode

use super::{CorrectionRequest, CorrectionService, EventStream, ServiceError, ServiceEvent};
use async_trait::async_trait;
use futures::StreamExt;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStdout, Command};
use tokio::task::JoinHandle;

/// Runs one `claude -p` process per request and streams its events
#[derive(Debug, Clone)]
pub struct ClaudeCli {
    program: String,
}

impl ClaudeCli {
    /// Create a backend that invokes the given executable
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }

    /// Command-line arguments for a request
    pub fn args(request: &CorrectionRequest) -> Vec<String> {
        let options = &request.options;
        let mut args = vec![
            "-p".to_string(),
            request.prompt.clone(),
            "--output-format".to_string(),
            "stream-json".to_string(),
            "--verbose".to_string(),
            "--model".to_string(),
            options.model.clone(),
            "--permission-mode".to_string(),
            options.permission_mode.to_string(),
            "--max-turns".to_string(),
            options.max_turns.to_string(),
        ];

        if !options.allowed_tools.is_empty() {
            args.push("--allowedTools".to_string());
            args.push(options.allowed_tools.join(","));
        }

        args
    }
}

impl Default for ClaudeCli {
    fn default() -> Self {
        Self::new("claude")
    }
}

#[async_trait]
impl CorrectionService for ClaudeCli {
    async fn open(&self, request: &CorrectionRequest) -> Result<EventStream, ServiceError> {
        tracing::debug!(
            program = %self.program,
            file = %request.path.display(),
            model = %request.options.model,
            "Starting correction service"
        );

        let mut child = Command::new(&self.program)
            .args(Self::args(request))
            .current_dir(&request.options.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ServiceError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let stdout = child.stdout.take().ok_or(ServiceError::MissingStdout)?;

        // Drained concurrently so a chatty child cannot block on a full pipe
        let stderr = child.stderr.take().map(|mut pipe| {
            tokio::spawn(async move {
                let mut buf = String::new();
                let _ = pipe.read_to_string(&mut buf).await;
                buf
            })
        });

        let state = StreamState {
            lines: BufReader::new(stdout).lines(),
            child,
            stderr,
            saw_result: false,
            done: false,
        };

        Ok(futures::stream::unfold(state, StreamState::next_event).boxed())
    }

    fn name(&self) -> &'static str {
        "claude"
    }
}

struct StreamState {
    lines: Lines<BufReader<ChildStdout>>,
    child: Child,
    stderr: Option<JoinHandle<String>>,
    saw_result: bool,
    done: bool,
}

impl StreamState {
    async fn next_event(
        mut self,
    ) -> Option<(Result<ServiceEvent, ServiceError>, StreamState)> {
        if self.done {
            return None;
        }

        loop {
            match self.lines.next_line().await {
                Ok(Some(line)) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    return match serde_json::from_str::<ServiceEvent>(line) {
                        Ok(event) => {
                            self.saw_result |= event.is_result();
                            Some((Ok(event), self))
                        }
                        Err(source) => {
                            self.done = true;
                            let error = ServiceError::Decode {
                                line: line.to_string(),
                                source,
                            };
                            Some((Err(error), self))
                        }
                    };
                }
                Ok(None) => {
                    self.done = true;
                    let failure = self.finish().await;
                    return failure.map(|error| (Err(error), self));
                }
                Err(e) => {
                    self.done = true;
                    return Some((Err(ServiceError::Io(e)), self));
                }
            }
        }
    }

    /// Reap the child once stdout is exhausted
    async fn finish(&mut self) -> Option<ServiceError> {
        let status = match self.child.wait().await {
            Ok(status) => status,
            Err(e) => return Some(ServiceError::Io(e)),
        };

        let stderr = match self.stderr.take() {
            Some(handle) => handle.await.unwrap_or_default(),
            None => String::new(),
        };

        if status.success() {
            return None;
        }

        // A completed exchange may still exit non-zero, e.g. at the turn limit
        if self.saw_result {
            tracing::debug!(%status, "Correction service exited after final result");
            return None;
        }

        Some(ServiceError::ProcessFailed {
            status: status.to_string(),
            stderr: stderr.trim().to_string(),
        })
    }
}
