//! Scripted correction service for testing

use super::{CorrectionRequest, CorrectionService, EventStream, ServiceError, ServiceEvent};
use async_trait::async_trait;
use futures::StreamExt;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, Clone)]
enum Script {
    Events {
        events: Vec<ServiceEvent>,
        trailing_error: Option<String>,
    },
    OpenError(String),
}

/// Replays canned event streams keyed by target file path
///
/// Unscripted files receive an empty stream.
#[derive(Debug, Default)]
pub struct ScriptedService {
    scripts: HashMap<PathBuf, Script>,
    requests: Mutex<Vec<CorrectionRequest>>,
}

impl ScriptedService {
    /// Create a service with no scripts
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply to requests for `path` with `events`
    pub fn with_events(mut self, path: &Path, events: Vec<ServiceEvent>) -> Self {
        self.scripts.insert(
            path.to_path_buf(),
            Script::Events {
                events,
                trailing_error: None,
            },
        );
        self
    }

    /// Reply with `events`, then fail the stream with `message`
    pub fn with_stream_error(
        mut self,
        path: &Path,
        events: Vec<ServiceEvent>,
        message: &str,
    ) -> Self {
        self.scripts.insert(
            path.to_path_buf(),
            Script::Events {
                events,
                trailing_error: Some(message.to_string()),
            },
        );
        self
    }

    /// Fail to start the exchange for `path`
    pub fn with_open_error(mut self, path: &Path, message: &str) -> Self {
        self.scripts
            .insert(path.to_path_buf(), Script::OpenError(message.to_string()));
        self
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<CorrectionRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CorrectionService for ScriptedService {
    async fn open(&self, request: &CorrectionRequest) -> Result<EventStream, ServiceError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        match self.scripts.get(&request.path) {
            Some(Script::OpenError(message)) => Err(ServiceError::Other(message.clone())),
            Some(Script::Events {
                events,
                trailing_error,
            }) => {
                let mut items: Vec<Result<ServiceEvent, ServiceError>> =
                    events.iter().cloned().map(Ok).collect();
                if let Some(message) = trailing_error {
                    items.push(Err(ServiceError::Other(message.clone())));
                }
                Ok(futures::stream::iter(items).boxed())
            }
            None => Ok(futures::stream::empty::<Result<ServiceEvent, ServiceError>>().boxed()),
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}
