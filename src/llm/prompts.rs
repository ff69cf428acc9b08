//! Fixed prompts describing the plan and file-review schemas.
//!
//! The schemas are a request, not a contract - responses go through the
//! recovery pipeline regardless of how well the model followed them.

/// Character cap for file content embedded in a prompt.
const MAX_FILE_PROMPT_CHARS: usize = 24000;

pub const PLAN_SYSTEM: &str = r#"You are a senior engineer planning a code review of an unfamiliar repository. You are given the repository's file tree. Group the files into review categories, ordered by how urgently a reviewer should look at them.

OUTPUT FORMAT (JSON):
{
  "title": "short name for the review plan",
  "description": "2-3 sentence overview of the repository and review focus",
  "techStack": ["language or framework", "..."],
  "categories": [
    {
      "name": "category name",
      "priority": 1,
      "description": "what this category covers and why it matters",
      "files": [
        { "path": "relative/path/from/tree", "reason": "why this file belongs here" }
      ]
    }
  ]
}

RULES:
- priority is a small integer, 1 = review first
- every "path" must be copied verbatim from the provided tree
- keep categories focused: 3-7 categories, the most important files only
- Output ONLY the JSON object, no explanations, no markdown fences"#;

pub const FILE_REVIEW_SYSTEM: &str = r#"You are a senior engineer surveying a single source file before reviewing it. List the methods (or functions) a reviewer should read, with the type that owns each one.

OUTPUT FORMAT (JSON):
{
  "methods": [
    { "name": "method or function name", "source": "owning type, or the module for free functions" }
  ]
}

RULES:
- include only methods worth a reviewer's attention, not trivial accessors
- Output ONLY the JSON object, no explanations, no markdown fences"#;

pub fn plan_user_prompt(repo_name: &str, tree_markdown: &str) -> String {
    format!(
        "Repository: {}\n\nFile tree:\n\n{}\n\nProduce the review plan JSON.",
        repo_name, tree_markdown
    )
}

pub fn file_review_user_prompt(path: &str, content: &str) -> String {
    format!(
        "File: {}\n\n```\n{}\n```\n\nProduce the methods JSON.",
        path,
        truncate_content(content, MAX_FILE_PROMPT_CHARS)
    )
}

/// Truncate file contents for prompt safety (keep beginning + end)
pub(crate) fn truncate_content(content: &str, max_chars: usize) -> String {
    if content.chars().count() <= max_chars {
        content.to_string()
    } else {
        let head: String = content.chars().take(max_chars / 2).collect();
        let tail: String = content.chars().rev().take(max_chars / 2).collect::<String>();
        format!(
            "{}\n\n... [truncated] ...\n\n{}",
            head,
            tail.chars().rev().collect::<String>()
        )
    }
}
