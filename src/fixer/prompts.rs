//! Prompt template for markdown correction

use std::path::Path;

/// Instructions appended after the file content
const CORRECTION_INSTRUCTIONS: &str = r#"Make corrections directly to the file using the Edit tool.

Fix **ONLY**:
- Spelling mistakes
- Grammar errors
- Markdown formatting issues

DO NOT change the content or meaning of the file, only fix clear errors.
Do not add explanations, just make the necessary edits."#;

/// Prompt asking the service to fix one markdown file in place
pub struct CorrectionPrompt;

impl CorrectionPrompt {
    /// Generate the prompt for a file and its current content
    pub fn generate(path: &Path, content: &str) -> String {
        let mut prompt = String::new();

        prompt.push_str(&format!(
            "Fix spelling/grammar errors and ensure proper markdown formatting in the file at {}.\n\n",
            path.display()
        ));

        prompt.push_str("Current content of the file:\n");
        prompt.push_str("```markdown\n");
        prompt.push_str(content);
        if !content.ends_with('\n') {
            prompt.push('\n');
        }
        prompt.push_str("```\n\n");

        prompt.push_str(CORRECTION_INSTRUCTIONS);

        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_path_and_content() {
        let prompt = CorrectionPrompt::generate(Path::new("/repo/README.md"), "# Titel\n");

        assert!(prompt.contains("in the file at /repo/README.md."));
        assert!(prompt.contains("```markdown\n# Titel\n```"));
        assert!(prompt.contains("Edit tool"));
        assert!(prompt.contains("DO NOT change the content or meaning"));
        assert!(prompt.ends_with("just make the necessary edits."));
    }

    #[test]
    fn test_prompt_closes_fence_without_trailing_newline() {
        let prompt = CorrectionPrompt::generate(Path::new("a.md"), "text");
        assert!(prompt.contains("```markdown\ntext\n```"));
    }
}
