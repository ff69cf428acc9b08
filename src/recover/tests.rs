//! End-to-end tests for the recovery staircase.

use super::{recover_file_review, recover_plan};
use crate::diagnostics::DiagnosticSink;
use crate::plan::{FALLBACK_DESCRIPTION, FALLBACK_TITLE};

const WELL_FORMED: &str = r#"{"title":"T","description":"D","techStack":["X"],"categories":[{"name":"Core","priority":1,"description":"d","files":[{"path":"a.txt","reason":"r"}]}]}"#;

fn fenced(json: &str) -> String {
    format!("Here is the plan:\n```json\n{}\n```", json)
}

#[test]
fn test_well_formed_input_is_lossless() {
    let mut sink = DiagnosticSink::disabled();
    let recovery = recover_plan(WELL_FORMED, &mut sink);
    let plan = recovery.plan;

    assert_eq!(plan.title, "T");
    assert_eq!(plan.description, "D");
    assert_eq!(plan.tech_stack, vec!["X"]);
    assert_eq!(plan.categories.len(), 1);
    let core = &plan.categories[0];
    assert_eq!(core.name, "Core");
    assert_eq!(core.priority, 1);
    assert_eq!(core.files.len(), 1);
    assert_eq!(core.files[0].path, "a.txt");
    assert_eq!(core.files[0].reason, "r");
    assert!(
        recovery.diagnostics.is_empty(),
        "a direct parse must not write diagnostics"
    );
}

#[test]
fn test_fenced_and_prose_wrapped_input() {
    let mut sink = DiagnosticSink::disabled();
    let plan = recover_plan(&fenced(WELL_FORMED), &mut sink).plan;
    assert_eq!(plan.title, "T");
    assert_eq!(plan.categories.len(), 1);
    assert_eq!(plan.categories[0].name, "Core");
    assert_eq!(plan.categories[0].priority, 1);
    assert_eq!(plan.categories[0].files[0].path, "a.txt");
}

#[test]
fn test_truncated_final_brace_recovers_identically() {
    let mut sink = DiagnosticSink::disabled();
    let intact = recover_plan(&fenced(WELL_FORMED), &mut sink).plan;

    let truncated = fenced(&WELL_FORMED[..WELL_FORMED.len() - 1]);
    let repaired = recover_plan(&truncated, &mut sink).plan;

    assert_eq!(repaired, intact);
}

#[test]
fn test_trailing_commas_recover_identically() {
    let mut sink = DiagnosticSink::disabled();
    let intact = recover_plan(WELL_FORMED, &mut sink).plan;

    let with_commas = WELL_FORMED
        .replace("\"r\"}", "\"r\",}")
        .replace("\"X\"]", "\"X\",]");
    let repaired = recover_plan(&fenced(&with_commas), &mut sink).plan;

    assert_eq!(repaired, intact);
}

#[test]
fn test_pipeline_fixed_point() {
    // Recover from badly broken input, serialize the result, and run it
    // through again: the second pass must succeed on the direct parse and
    // change nothing.
    let broken = "Sure thing! {\"title\":\"T\",\"description\":\"D\",\"techStack\":[\"X\"],\"categories\":[{\"name\":\"Core\",\"priority\":1,\"files\":[{\"path\":\"a.txt\"";
    let mut sink = DiagnosticSink::disabled();
    let first = recover_plan(broken, &mut sink).plan;

    let serialized = serde_json::to_string(&first).unwrap();
    let second = recover_plan(&serialized, &mut sink);

    assert_eq!(second.plan, first);
    assert!(
        second.diagnostics.is_empty(),
        "reserialized output must re-enter via the direct parse"
    );
}

#[test]
fn test_empty_name_category_discarded_empty_files_retained() {
    let response = r#"{"title":"T","description":"D","techStack":[],"categories":[{"name":"","priority":1,"description":"dropped","files":[{"path":"a.txt"}]},{"name":"Kept","priority":2,"description":"","files":[]},]}"#;
    let mut sink = DiagnosticSink::disabled();
    let plan = recover_plan(response, &mut sink).plan;

    assert_eq!(plan.categories.len(), 1);
    assert_eq!(plan.categories[0].name, "Kept");
    assert!(plan.categories[0].files.is_empty());
}

#[test]
fn test_braceless_input_yields_placeholder_plan_with_pointers() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = DiagnosticSink::rooted_at(dir.path());
    let recovery = recover_plan("I am unable to produce a plan today.", &mut sink);

    assert_eq!(recovery.plan.title, FALLBACK_TITLE);
    assert_eq!(recovery.plan.description, FALLBACK_DESCRIPTION);
    assert!(recovery.plan.tech_stack.is_empty());
    assert!(recovery.plan.categories.is_empty());
    assert!(!recovery.diagnostics.is_empty());
    for path in &recovery.diagnostics {
        assert!(path.exists());
    }
}

#[test]
fn test_truncated_mid_array_salvages_complete_categories() {
    // Cut off inside the second category: repair cannot produce valid
    // JSON here, so field recovery takes over and keeps what is whole.
    let response = "```json\n{\"title\":\"T\",\"description\":\"D\",\"techStack\":[\"Rust\"],\"categories\":[{\"name\":\"Core\",\"priority\":1,\"description\":\"d\",\"files\":[{\"path\":\"a.txt\",\"reason\":\"r\"}]},{\"name\":\"Second\",\"pri";
    let mut sink = DiagnosticSink::disabled();
    let plan = recover_plan(response, &mut sink).plan;

    assert_eq!(plan.title, "T");
    assert_eq!(plan.tech_stack, vec!["Rust"]);
    assert!(!plan.categories.is_empty());
    let core = &plan.categories[0];
    assert_eq!(core.name, "Core");
    assert_eq!(core.priority, 1);
    assert_eq!(core.files.len(), 1);
    assert_eq!(core.files[0].path, "a.txt");
}

#[test]
fn test_recover_file_review_direct_and_salvaged() {
    let mut sink = DiagnosticSink::disabled();

    let clean = r#"{"methods":[{"name":"Scan","source":"Walker"}]}"#;
    let review = recover_file_review(clean, "src/walker.rs", &mut sink);
    assert_eq!(review.file_path, "src/walker.rs");
    assert_eq!(review.methods.len(), 1);
    assert_eq!(review.methods[0].name, "Scan");

    let broken = "Methods found:\n```json\n{\"methods\":[{\"name\":\"Scan\",\"source\":\"Walker\"},{\"name\":\"Render\",\"sou";
    let salvaged = recover_file_review(broken, "src/walker.rs", &mut sink);
    assert_eq!(salvaged.methods.len(), 1, "incomplete method is dropped");
    assert_eq!(salvaged.methods[0].name, "Scan");
}

#[test]
fn test_recover_file_review_garbage_falls_back_to_empty_methods() {
    let mut sink = DiagnosticSink::disabled();
    let review = recover_file_review("no usable output", "src/lib.rs", &mut sink);
    assert_eq!(review.file_path, "src/lib.rs");
    assert!(review.methods.is_empty());
}
