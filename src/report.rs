//! Markdown report rendering for plans and file reviews.
//!
//! Consumes validated objects only; everything here trusts the data-model
//! invariants the assembler guarantees.

use crate::plan::{Category, FileReview, ReviewPlan};
use std::path::{Path, PathBuf};

/// Render a plan as a markdown report: categories grouped by ascending
/// priority, a path/reason table per category. When the plan is empty and
/// diagnostic side files were written, points the reader at them.
pub fn render_plan_markdown(plan: &ReviewPlan, diagnostics: &[PathBuf]) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {}\n\n{}\n", plan.title, plan.description));

    if !plan.tech_stack.is_empty() {
        out.push_str("\n## Tech stack\n\n");
        for entry in &plan.tech_stack {
            out.push_str(&format!("- {}\n", entry));
        }
    }

    let mut ordered: Vec<&Category> = plan.categories.iter().collect();
    ordered.sort_by_key(|c| c.priority);

    for category in ordered {
        out.push_str(&format!(
            "\n## {} (priority {})\n\n",
            category.name, category.priority
        ));
        if !category.description.is_empty() {
            out.push_str(&format!("{}\n\n", category.description));
        }
        if category.files.is_empty() {
            out.push_str("No files listed.\n");
            continue;
        }
        out.push_str("| Path | Reason |\n| --- | --- |\n");
        for file in &category.files {
            out.push_str(&format!(
                "| {} | {} |\n",
                escape_cell(&file.path),
                escape_cell(&file.reason)
            ));
        }
    }

    if plan.categories.is_empty() && !diagnostics.is_empty() {
        out.push_str("\n## Diagnostics\n\n");
        out.push_str(
            "The model response could not be recovered into a plan. \
             The raw material was saved for inspection:\n\n",
        );
        out.push_str("| Path | Reason |\n| --- | --- |\n");
        for path in diagnostics {
            out.push_str(&format!(
                "| {} | {} |\n",
                escape_cell(&path.display().to_string()),
                pointer_reason(path)
            ));
        }
    }

    out
}

/// Render a file review as a method/source table.
pub fn render_review_markdown(review: &FileReview) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "# Review: {}\n\nGenerated {}\n",
        review.file_path,
        review.review_date.format("%Y-%m-%d %H:%M UTC")
    ));

    if review.methods.is_empty() {
        out.push_str("\nNo methods were recovered for this file.\n");
        return out;
    }

    out.push_str("\n| Method | Source |\n| --- | --- |\n");
    for method in &review.methods {
        out.push_str(&format!(
            "| {} | {} |\n",
            escape_cell(&method.name),
            escape_cell(&method.source)
        ));
    }
    out
}

fn pointer_reason(path: &Path) -> &'static str {
    match path.file_name().and_then(|n| n.to_str()) {
        Some(name) if name.starts_with("response") => "Raw model response",
        _ => "Best-effort extracted candidate",
    }
}

/// Table cells cannot hold pipes or newlines.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{FileEntry, MethodEntry};
    use chrono::Utc;

    fn category(name: &str, priority: u32, paths: &[&str]) -> Category {
        Category {
            name: name.to_string(),
            priority,
            description: String::new(),
            files: paths
                .iter()
                .map(|p| FileEntry {
                    path: p.to_string(),
                    reason: "because".to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_render_orders_categories_by_ascending_priority() {
        let plan = ReviewPlan {
            title: "T".to_string(),
            description: "D".to_string(),
            tech_stack: vec!["Rust".to_string()],
            categories: vec![
                category("Later", 3, &["b.rs"]),
                category("First", 1, &["a.rs"]),
            ],
        };
        let report = render_plan_markdown(&plan, &[]);
        let first = report.find("## First (priority 1)").unwrap();
        let later = report.find("## Later (priority 3)").unwrap();
        assert!(first < later);
        assert!(report.contains("| a.rs | because |"));
        assert!(report.contains("- Rust"));
    }

    #[test]
    fn test_render_escapes_pipes_in_cells() {
        let plan = ReviewPlan {
            title: "T".to_string(),
            description: "D".to_string(),
            tech_stack: vec![],
            categories: vec![Category {
                name: "Core".to_string(),
                priority: 1,
                description: String::new(),
                files: vec![FileEntry {
                    path: "weird|name.rs".to_string(),
                    reason: "multi\nline".to_string(),
                }],
            }],
        };
        let report = render_plan_markdown(&plan, &[]);
        assert!(report.contains("| weird\\|name.rs | multi line |"));
    }

    #[test]
    fn test_render_empty_plan_with_diagnostics_section() {
        let plan = ReviewPlan {
            title: "T".to_string(),
            description: "D".to_string(),
            tech_stack: vec![],
            categories: vec![],
        };
        let diagnostics = vec![
            PathBuf::from(".compass/diagnostics/response_20250101_120000.txt"),
            PathBuf::from(".compass/diagnostics/candidate_20250101_120000.txt"),
        ];
        let report = render_plan_markdown(&plan, &diagnostics);
        assert!(report.contains("## Diagnostics"));
        assert!(report.contains("Raw model response"));
        assert!(report.contains("Best-effort extracted candidate"));
    }

    #[test]
    fn test_render_empty_plan_without_diagnostics_has_no_section() {
        let plan = ReviewPlan {
            title: "T".to_string(),
            description: "D".to_string(),
            tech_stack: vec![],
            categories: vec![],
        };
        assert!(!render_plan_markdown(&plan, &[]).contains("## Diagnostics"));
    }

    #[test]
    fn test_render_review_markdown_table() {
        let review = FileReview {
            file_path: "src/lib.rs".to_string(),
            methods: vec![MethodEntry {
                name: "scan".to_string(),
                source: "RepoScanner".to_string(),
            }],
            review_date: Utc::now(),
        };
        let report = render_review_markdown(&review);
        assert!(report.contains("# Review: src/lib.rs"));
        assert!(report.contains("| scan | RepoScanner |"));
    }
}
