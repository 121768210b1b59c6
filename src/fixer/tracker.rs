//! Fold state over one service event stream

use crate::service::{content_text, ContentBlock, ServiceEvent, EDIT_TOOL, MAX_TURNS_SUBTYPE};
use serde_json::Value;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Maximum characters of old/new text shown in edit traces
const SNIPPET_LEN: usize = 100;

/// Tracks whether an edit to one file was requested and applied
#[derive(Debug, Clone)]
pub struct EditTracker {
    target: PathBuf,
    requested: bool,
    pending: HashSet<String>,
    modified: bool,
}

impl EditTracker {
    /// Start tracking edits to `target` (an absolute path)
    pub fn new(target: &Path) -> Self {
        Self {
            target: target.to_path_buf(),
            requested: false,
            pending: HashSet::new(),
            modified: false,
        }
    }

    /// Whether an edit to the target was requested
    pub fn requested(&self) -> bool {
        self.requested
    }

    /// Whether a requested edit was applied successfully
    pub fn modified(&self) -> bool {
        self.modified
    }

    /// Fold one event into the state
    pub fn observe(self, event: &ServiceEvent) -> Self {
        if let ServiceEvent::Result {
            subtype, num_turns, ..
        } = event
        {
            if subtype == MAX_TURNS_SUBTYPE {
                tracing::debug!(
                    file = %self.target.display(),
                    turns = ?num_turns,
                    "Correction service reached its turn limit"
                );
            }
            return self;
        }

        event
            .blocks()
            .iter()
            .fold(self, |tracker, block| tracker.observe_block(block))
    }

    fn observe_block(mut self, block: &ContentBlock) -> Self {
        match block {
            ContentBlock::ToolUse { id, name, input } => {
                if name == EDIT_TOOL && self.targets_self(input) {
                    tracing::info!("Edit requested for {}:", self.target.display());
                    tracing::info!("  Old: {:?}", snippet(input, "old_string"));
                    tracing::info!("  New: {:?}", snippet(input, "new_string"));
                    self.requested = true;
                    if !id.is_empty() {
                        self.pending.insert(id.clone());
                    }
                }
            }
            ContentBlock::ToolResult {
                tool_use_id,
                content,
                is_error,
            } => {
                if self.requested && self.corresponds(tool_use_id) {
                    if is_error.unwrap_or(false) {
                        tracing::warn!("Edit failed: {}", content_text(content));
                    } else {
                        tracing::info!("Edit successfully applied");
                        self.modified = true;
                    }
                }
            }
            _ => {}
        }
        self
    }

    fn targets_self(&self, input: &Value) -> bool {
        input
            .get("file_path")
            .and_then(Value::as_str)
            .map(|path| Path::new(path) == self.target)
            .unwrap_or(false)
    }

    /// Ids are only compared when both sides carry one
    fn corresponds(&self, tool_use_id: &str) -> bool {
        tool_use_id.is_empty() || self.pending.is_empty() || self.pending.contains(tool_use_id)
    }
}

/// First `SNIPPET_LEN` characters of a string field
fn snippet(input: &Value, key: &str) -> String {
    input
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or("")
        .chars()
        .take(SNIPPET_LEN)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TARGET: &str = "/repo/README.md";

    fn fold(events: &[ServiceEvent]) -> EditTracker {
        events
            .iter()
            .fold(EditTracker::new(Path::new(TARGET)), |t, e| t.observe(e))
    }

    #[test]
    fn test_successful_edit_marks_modified() {
        let tracker = fold(&[
            ServiceEvent::assistant(vec![ContentBlock::edit("t1", TARGET, "teh", "the")]),
            ServiceEvent::user(vec![ContentBlock::tool_result("t1", false, "ok")]),
        ]);

        assert!(tracker.requested());
        assert!(tracker.modified());
    }

    #[test]
    fn test_failed_edit_leaves_unmodified() {
        let tracker = fold(&[
            ServiceEvent::assistant(vec![ContentBlock::edit("t1", TARGET, "teh", "the")]),
            ServiceEvent::user(vec![ContentBlock::tool_result(
                "t1",
                true,
                "String to replace not found",
            )]),
        ]);

        assert!(tracker.requested());
        assert!(!tracker.modified());
    }

    #[test]
    fn test_edit_to_other_file_is_ignored() {
        let tracker = fold(&[
            ServiceEvent::assistant(vec![ContentBlock::edit(
                "t1",
                "/repo/OTHER.md",
                "a",
                "b",
            )]),
            ServiceEvent::user(vec![ContentBlock::tool_result("t1", false, "ok")]),
        ]);

        assert!(!tracker.requested());
        assert!(!tracker.modified());
    }

    #[test]
    fn test_result_before_request_is_ignored() {
        let tracker = fold(&[
            ServiceEvent::user(vec![ContentBlock::tool_result("t0", false, "ok")]),
            ServiceEvent::assistant(vec![ContentBlock::edit("t1", TARGET, "a", "b")]),
        ]);

        assert!(tracker.requested());
        assert!(!tracker.modified());
    }

    #[test]
    fn test_result_for_unrelated_tool_is_ignored() {
        let tracker = fold(&[
            ServiceEvent::assistant(vec![
                ContentBlock::edit("t1", TARGET, "a", "b"),
                ContentBlock::ToolUse {
                    id: "t2".to_string(),
                    name: "Read".to_string(),
                    input: serde_json::json!({"file_path": TARGET}),
                },
            ]),
            ServiceEvent::user(vec![ContentBlock::tool_result("t2", false, "contents")]),
        ]);

        assert!(!tracker.modified());
    }

    #[test]
    fn test_result_without_id_matches_requested_edit() {
        let tracker = fold(&[
            ServiceEvent::assistant(vec![ContentBlock::edit("t1", TARGET, "a", "b")]),
            ServiceEvent::assistant(vec![ContentBlock::tool_result("", false, "ok")]),
        ]);

        assert!(tracker.modified());
    }

    #[test]
    fn test_edit_without_id_matches_any_result() {
        let tracker = fold(&[
            ServiceEvent::assistant(vec![ContentBlock::edit("", TARGET, "a", "b")]),
            ServiceEvent::user(vec![ContentBlock::tool_result("t9", false, "ok")]),
        ]);

        assert!(tracker.modified());
    }

    #[test]
    fn test_snippet_truncates_on_char_boundary() {
        let long = "é".repeat(150);
        let input = serde_json::json!({ "old_string": long });
        assert_eq!(snippet(&input, "old_string").chars().count(), SNIPPET_LEN);
        assert_eq!(snippet(&input, "missing"), "");
    }
}
