//! Hand extraction of plan fields from text that refused to parse.
//!
//! Last stage of the escalation staircase. Works object by object: the
//! categories array is sliced into `{...}` substrings, and each substring
//! goes back through the same scalar lookups and slicer for its own files
//! array. A pure function of the input text - identical broken input
//! yields identical recovered structure.

use super::scan::{array_span, number_property, slice_objects, split_quoted_items, string_property};
use crate::plan::{CategoryWire, FileReviewWire, FileWire, MethodWire, PlanWire};

pub(crate) fn recover_plan_fields(text: &str) -> PlanWire {
    let tech_stack = array_span(text, "techStack")
        .or_else(|| array_span(text, "tech_stack"))
        .map(split_quoted_items)
        .unwrap_or_default();

    // The locator accepts "components" as an anchor, so the extractor
    // honors the same spelling.
    let categories = array_span(text, "categories")
        .or_else(|| array_span(text, "components"))
        .map(recover_categories)
        .unwrap_or_default();

    PlanWire {
        title: string_property(text, "title"),
        description: string_property(text, "description"),
        tech_stack,
        categories,
    }
}

fn recover_categories(span: &str) -> Vec<CategoryWire> {
    slice_objects(span)
        .into_iter()
        .filter_map(|object| {
            let name = string_property(object, "name");
            if name.is_empty() {
                return None;
            }
            Some(CategoryWire {
                name,
                priority: number_property(object, "priority"),
                description: string_property(object, "description"),
                files: array_span(object, "files")
                    .map(recover_files)
                    .unwrap_or_default(),
            })
        })
        .collect()
}

fn recover_files(span: &str) -> Vec<FileWire> {
    slice_objects(span)
        .into_iter()
        .filter_map(|object| {
            let path = string_property(object, "path");
            if path.is_empty() {
                return None;
            }
            Some(FileWire {
                path,
                reason: string_property(object, "reason"),
            })
        })
        .collect()
}

pub(crate) fn recover_review_fields(text: &str) -> FileReviewWire {
    let methods = array_span(text, "methods")
        .map(|span| {
            slice_objects(span)
                .into_iter()
                .filter_map(|object| {
                    let name = string_property(object, "name");
                    if name.is_empty() {
                        return None;
                    }
                    Some(MethodWire {
                        name,
                        source: string_property(object, "source"),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    FileReviewWire { methods }
}
