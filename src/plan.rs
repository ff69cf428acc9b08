//! Review-plan data model and the assemblers that guard its invariants.
//!
//! Two families of types live here. The `ReviewPlan`/`FileReview` structs
//! are the validated artifacts handed to the store and report renderer:
//! title and description are never empty, collections are never absent.
//! The `*Wire` mirrors are what parse attempts and field recovery produce;
//! every field is defaulted so any JSON object deserializes into a bundle
//! the assemblers can finalize.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Title applied when the response yields no usable title.
pub const FALLBACK_TITLE: &str = "Untitled review plan";

/// Description applied when the response yields no usable description.
pub const FALLBACK_DESCRIPTION: &str =
    "No description was recovered from the model response.";

/// The top-level structured recommendation for a repository review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPlan {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

/// A named, prioritized grouping of files within a plan.
///
/// Priorities are conventionally 1-3 ascending; 0 means the model never
/// supplied one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub priority: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub files: Vec<FileEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: String,
    #[serde(default)]
    pub reason: String,
}

/// Per-file review artifact: the methods worth a reviewer's attention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReview {
    pub file_path: String,
    pub methods: Vec<MethodEntry>,
    pub review_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodEntry {
    pub name: String,
    #[serde(default)]
    pub source: String,
}

// ═══════════════════════════════════════════════════════════════════════════
//  WIRE STRUCTS - tolerant parse targets
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlanWire {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "techStack")]
    pub tech_stack: Vec<String>,
    #[serde(default, alias = "components")]
    pub categories: Vec<CategoryWire>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryWire {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub priority: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub files: Vec<FileWire>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileWire {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileReviewWire {
    #[serde(default)]
    pub methods: Vec<MethodWire>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MethodWire {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub source: String,
}

// ═══════════════════════════════════════════════════════════════════════════
//  ASSEMBLY - the single exit point of the recovery pipeline
// ═══════════════════════════════════════════════════════════════════════════

/// Finalize a wire bundle into a valid plan.
///
/// Total: every input yields a plan satisfying the data-model invariants.
/// Categories without a name and file entries without a path are dropped;
/// everything else keeps its documented default.
pub fn assemble_plan(wire: PlanWire) -> ReviewPlan {
    let categories = wire
        .categories
        .into_iter()
        .filter(|c| !c.name.trim().is_empty())
        .map(|c| Category {
            name: c.name,
            priority: c.priority,
            description: c.description,
            files: c
                .files
                .into_iter()
                .filter(|f| !f.path.trim().is_empty())
                .map(|f| FileEntry {
                    path: f.path,
                    reason: f.reason,
                })
                .collect(),
        })
        .collect();

    ReviewPlan {
        title: non_empty_or(wire.title, FALLBACK_TITLE),
        description: non_empty_or(wire.description, FALLBACK_DESCRIPTION),
        tech_stack: wire.tech_stack,
        categories,
    }
}

/// Finalize a wire bundle into a valid file review, stamping the review
/// date. Methods without a name are dropped.
pub fn assemble_file_review(file_path: &str, wire: FileReviewWire) -> FileReview {
    FileReview {
        file_path: file_path.to_string(),
        methods: wire
            .methods
            .into_iter()
            .filter(|m| !m.name.trim().is_empty())
            .map(|m| MethodEntry {
                name: m.name,
                source: m.source,
            })
            .collect(),
        review_date: Utc::now(),
    }
}

fn non_empty_or(value: String, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value
    }
}
