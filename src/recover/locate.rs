//! Locates the best candidate JSON substring inside a model response.

/// Best-guess JSON-shaped substring of `text`, unvalidated.
///
/// Escalating heuristics, first match wins: a ```json fenced block, then
/// the first-`{`-to-last-`}` span, re-anchored on `"title"` when that span
/// does not look like a plan. Never fails; text without a single `{` is
/// returned unchanged and left for downstream stages to reject.
pub(crate) fn locate_candidate(text: &str) -> &str {
    if let Some(inner) = fenced_json_block(text) {
        return inner;
    }

    let (Some(first), Some(last)) = (text.find('{'), text.rfind('}')) else {
        return text;
    };
    if first > last {
        return text;
    }

    let span = &text[first..=last];
    if looks_like_plan(span) {
        return span;
    }

    // The first `{` may belong to prose or a worked example preceding the
    // real document. Re-anchor on the title key and widen to the nearest
    // enclosing unmatched brace.
    if let Some(anchor) = text.find("\"title\"") {
        if let Some(start) = unmatched_open_before(text, anchor) {
            if start <= last {
                return &text[start..=last];
            }
        }
    }
    span
}

/// Inner content of a ```json fenced block; a missing closing fence
/// (truncated response) yields everything after the tag.
fn fenced_json_block(text: &str) -> Option<&str> {
    const TAG: &str = "```json";
    let start = text.find(TAG)? + TAG.len();
    let rest = &text[start..];
    let inner = match rest.find("```") {
        Some(end) => &rest[..end],
        None => rest,
    };
    Some(inner.trim())
}

fn looks_like_plan(span: &str) -> bool {
    span.contains("\"title\"")
        && span.contains("\"description\"")
        && (span.contains("\"categories\"") || span.contains("\"components\""))
}

/// Position of the nearest `{` before `from` that no `}` closes.
fn unmatched_open_before(text: &str, from: usize) -> Option<usize> {
    let mut closes = 0usize;
    for (i, c) in text[..from].char_indices().rev() {
        match c {
            '}' => closes += 1,
            '{' => {
                if closes == 0 {
                    return Some(i);
                }
                closes -= 1;
            }
            _ => {}
        }
    }
    None
}
