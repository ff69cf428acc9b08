//! Resilient extraction-and-repair pipeline for model responses.
//!
//! Model output is supposed to contain a JSON plan and frequently does
//! not: prose wrapping, fenced blocks, truncation, unbalanced brackets,
//! trailing commas. The pipeline escalates through a fixed staircase -
//! direct parse, locate + parse, repair + parse, field recovery - and
//! always exits through the assembler with a valid object. Parse failures
//! never surface to the caller; only the transport layer can error.
//!
//! The pipeline is purely computational and keeps no state across calls;
//! concurrent invocations on independent inputs are safe. Diagnostic side
//! writes are best-effort and advisory.

mod fields;
mod locate;
mod repair;
mod scan;
#[cfg(test)]
mod tests;

use crate::diagnostics::DiagnosticSink;
use crate::plan::{
    assemble_file_review, assemble_plan, FileReview, FileReviewWire, PlanWire, ReviewPlan,
};
use std::path::PathBuf;

/// A recovered plan plus pointers to any diagnostic side files written
/// while recovering it. The plan itself always satisfies the data-model
/// invariants; the pointers let reports reference the raw material when
/// nothing usable was recovered.
#[derive(Debug)]
pub struct PlanRecovery {
    pub plan: ReviewPlan,
    pub diagnostics: Vec<PathBuf>,
}

/// Turn a raw model response into a valid plan. Total: never fails.
pub fn recover_plan(response: &str, sink: &mut DiagnosticSink) -> PlanRecovery {
    // Fast path: the whole response is already the document.
    if let Ok(wire) = serde_json::from_str::<PlanWire>(response.trim()) {
        return PlanRecovery {
            plan: assemble_plan(wire),
            diagnostics: Vec::new(),
        };
    }

    let candidate = locate::locate_candidate(response);
    sink.record_response(response);
    sink.record_candidate(candidate);

    let wire = parse_or_salvage::<PlanWire>(candidate, fields::recover_plan_fields);
    PlanRecovery {
        plan: assemble_plan(wire),
        diagnostics: sink.pointers(),
    }
}

/// Sibling pipeline for the smaller per-file review schema.
pub fn recover_file_review(
    response: &str,
    file_path: &str,
    sink: &mut DiagnosticSink,
) -> FileReview {
    if let Ok(wire) = serde_json::from_str::<FileReviewWire>(response.trim()) {
        return assemble_file_review(file_path, wire);
    }

    let candidate = locate::locate_candidate(response);
    sink.record_response(response);
    sink.record_candidate(candidate);

    let wire = parse_or_salvage::<FileReviewWire>(candidate, fields::recover_review_fields);
    assemble_file_review(file_path, wire)
}

/// Shared tail of the staircase: parse the candidate, then parse its
/// repaired form, then hand the repaired text to the field extractor.
fn parse_or_salvage<T>(candidate: &str, salvage: fn(&str) -> T) -> T
where
    T: serde::de::DeserializeOwned,
{
    if let Ok(wire) = serde_json::from_str::<T>(candidate) {
        return wire;
    }
    let repaired = repair::repair(candidate);
    match serde_json::from_str::<T>(&repaired) {
        Ok(wire) => wire,
        Err(_) => salvage(&repaired),
    }
}
