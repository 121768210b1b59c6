//! Markdown fixer behaviour against a scripted correction service

use docpolish::fixer::{MarkdownFixer, RunDisposition};
use docpolish::service::{ContentBlock, ScriptedService, ServiceEvent};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_doc(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn edit_exchange(path: &Path, succeeded: bool) -> Vec<ServiceEvent> {
    let target = path.to_str().unwrap();
    let reply = if succeeded {
        "The file has been updated."
    } else {
        "String to replace not found in file."
    };

    vec![
        ServiceEvent::System {
            subtype: Some("init".to_string()),
        },
        ServiceEvent::assistant(vec![
            ContentBlock::Text {
                text: "Fixing a typo.".to_string(),
            },
            ContentBlock::edit("toolu_1", target, "teh", "the"),
        ]),
        ServiceEvent::user(vec![ContentBlock::tool_result("toolu_1", !succeeded, reply)]),
        ServiceEvent::Result {
            subtype: "success".to_string(),
            is_error: false,
            num_turns: Some(2),
        },
    ]
}

#[tokio::test]
async fn successful_edit_marks_file_modified() {
    let dir = tempfile::tempdir().unwrap();
    let doc = write_doc(&dir, "README.md", "# Teh title\n");

    let service = ScriptedService::new().with_events(&doc, edit_exchange(&doc, true));
    let fixer = MarkdownFixer::new(&service, dir.path());

    let outcomes = fixer.run_all(std::slice::from_ref(&doc)).await;
    assert_eq!(outcomes.len(), 1);
    assert!(outcomes[0].modified);
    assert!(outcomes[0].error.is_none());

    assert_eq!(fixer.run(&[&doc]).await, RunDisposition::Modified);
}

#[tokio::test]
async fn failed_edit_is_logged_not_raised() {
    let dir = tempfile::tempdir().unwrap();
    let doc = write_doc(&dir, "guide.md", "Some text.\n");

    let service = ScriptedService::new().with_events(&doc, edit_exchange(&doc, false));
    let fixer = MarkdownFixer::new(&service, dir.path());

    let outcome = fixer.process_file(&doc).await;
    assert!(!outcome.modified);
    assert!(outcome.error.is_none());
    assert_eq!(fixer.run(&[&doc]).await, RunDisposition::Clean);
}

#[tokio::test]
async fn edit_of_another_file_does_not_count() {
    let dir = tempfile::tempdir().unwrap();
    let doc = write_doc(&dir, "a.md", "alpha\n");
    let other = dir.path().join("b.md");

    let service = ScriptedService::new().with_events(&doc, edit_exchange(&other, true));
    let fixer = MarkdownFixer::new(&service, dir.path());

    let outcome = fixer.process_file(&doc).await;
    assert!(!outcome.modified);
    assert!(outcome.error.is_none());
}

#[tokio::test]
async fn read_failure_does_not_block_other_files() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_doc(&dir, "good.md", "fine\n");
    let fixed = write_doc(&dir, "fixed.md", "teh\n");
    let missing = dir.path().join("missing.md");

    let service = ScriptedService::new().with_events(&fixed, edit_exchange(&fixed, true));
    let fixer = MarkdownFixer::new(&service, dir.path());

    let targets = vec![missing.clone(), good.clone(), fixed.clone()];
    let outcomes = fixer.run_all(&targets).await;

    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0].path, missing);
    assert!(outcomes[0].error.as_deref().unwrap().contains("Failed to read"));
    assert!(!outcomes[0].modified);
    assert!(outcomes[1].error.is_none());
    assert!(!outcomes[1].modified);
    assert!(outcomes[2].modified);

    // Only readable files reach the service
    assert_eq!(service.requests().len(), 2);

    assert_eq!(fixer.run(&targets).await, RunDisposition::Failed);
}

#[tokio::test]
async fn service_failures_become_file_errors() {
    let dir = tempfile::tempdir().unwrap();
    let unreachable = write_doc(&dir, "a.md", "a\n");
    let broken = write_doc(&dir, "b.md", "b\n");

    let service = ScriptedService::new()
        .with_open_error(&unreachable, "not logged in")
        .with_stream_error(&broken, edit_exchange(&broken, true), "connection reset");
    let fixer = MarkdownFixer::new(&service, dir.path());

    let outcomes = fixer.run_all(&[unreachable, broken]).await;

    let first = outcomes[0].error.as_deref().unwrap();
    assert!(first.contains("not logged in"));
    let second = outcomes[1].error.as_deref().unwrap();
    assert!(second.contains("connection reset"));
    assert!(!outcomes[1].modified);
}

#[tokio::test]
async fn no_markdown_files_means_nothing_to_do() {
    let dir = tempfile::tempdir().unwrap();
    let service = ScriptedService::new();
    let fixer = MarkdownFixer::new(&service, dir.path());

    let disposition = fixer.run(&["a.txt", "b.MD", "Makefile"]).await;
    assert_eq!(disposition, RunDisposition::NothingToDo);

    let none: Vec<PathBuf> = Vec::new();
    assert_eq!(fixer.run(&none).await, RunDisposition::NothingToDo);

    assert!(service.requests().is_empty());
}

#[tokio::test]
async fn request_carries_content_and_scoped_options() {
    let dir = tempfile::tempdir().unwrap();
    let doc = write_doc(&dir, "notes.md", "# Notes\n");

    let service = ScriptedService::new();
    let fixer = MarkdownFixer::new(&service, dir.path())
        .with_model("sonnet")
        .with_max_turns(3);

    fixer.process_file(&doc).await;

    let requests = service.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.path, doc);
    assert_eq!(request.content, "# Notes\n");
    assert!(request.prompt.contains("# Notes"));
    assert_eq!(request.options.model, "sonnet");
    assert_eq!(request.options.max_turns, 3);
    assert_eq!(request.options.cwd, dir.path());
    assert_eq!(
        request.options.allowed_tools,
        vec![format!("Edit({})", doc.display())]
    );
}
