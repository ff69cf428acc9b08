//! Quote-aware scanning primitives for salvaging fields from broken JSON.
//!
//! These deliberately stop short of parsing: they find spans and values
//! by scanning, so they keep working on text serde has already rejected.

use regex::Regex;

/// Look up the first `"key": "value"` occurrence and return the unescaped
/// value. First match only, not depth-aware; empty string if absent.
pub(crate) fn string_property(text: &str, key: &str) -> String {
    let pattern = format!(r#""{}"\s*:\s*""#, regex::escape(key));
    let re = Regex::new(&pattern).unwrap();
    let Some(found) = re.find(text) else {
        return String::new();
    };

    // Scan to the closing quote; an unterminated value (truncated response)
    // takes the rest of the text.
    let rest = &text[found.end()..];
    let mut end = rest.len();
    let mut escaped = false;
    for (i, c) in rest.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' => {
                end = i;
                break;
            }
            _ => {}
        }
    }
    unescape(&rest[..end])
}

/// Look up the first `"key": <integer>` occurrence. 0 if absent.
pub(crate) fn number_property(text: &str, key: &str) -> u32 {
    let pattern = format!(r#""{}"\s*:\s*(\d+)"#, regex::escape(key));
    Regex::new(&pattern)
        .unwrap()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Return the inner text of the first `"key": [ ... ]` array, honoring
/// bracket nesting and quoted spans. `None` when absent. An unterminated
/// array (truncated response) yields everything after the opening bracket;
/// the object slicer simply drops the trailing partial element.
pub(crate) fn array_span<'a>(text: &'a str, key: &str) -> Option<&'a str> {
    let pattern = format!(r#""{}"\s*:\s*\["#, regex::escape(key));
    let found = Regex::new(&pattern).unwrap().find(text)?;
    let inner = &text[found.end()..];

    let mut depth = 1i32;
    let mut in_quotes = false;
    let mut escaped = false;
    for (i, c) in inner.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            '[' if !in_quotes => depth += 1,
            ']' if !in_quotes => {
                depth -= 1;
                if depth == 0 {
                    return Some(&inner[..i]);
                }
            }
            _ => {}
        }
    }
    Some(inner)
}

/// Split array inner text on commas outside quoted spans, then trim and
/// unquote each item. Empty segments are dropped.
pub(crate) fn split_quoted_items(inner: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut segment_start = 0;
    let mut in_quotes = false;
    let mut escaped = false;

    for (i, c) in inner.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                push_item(&mut items, &inner[segment_start..i]);
                segment_start = i + 1;
            }
            _ => {}
        }
    }
    push_item(&mut items, &inner[segment_start..]);
    items
}

fn push_item(items: &mut Vec<String>, raw: &str) {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return;
    }
    items.push(unquote(trimmed));
}

fn unquote(raw: &str) -> String {
    let inner = raw
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(raw);
    unescape(inner)
}

/// Emit complete `{...}` substrings from an array's text, tracking brace
/// nesting and quoted spans. Nested structures inside each slice are kept
/// verbatim for the caller to recurse into.
pub(crate) fn slice_objects(array_text: &str) -> Vec<&str> {
    let mut slices = Vec::new();
    let mut depth: i32 = 0;
    let mut start = None;
    let mut in_quotes = false;
    let mut escaped = false;

    for (i, c) in array_text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            '{' if !in_quotes => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            '}' if !in_quotes => {
                if depth == 0 {
                    continue;
                }
                depth -= 1;
                if depth == 0 {
                    if let Some(s) = start {
                        slices.push(&array_text[s..=i]);
                    }
                    start = None;
                }
            }
            _ => {}
        }
    }
    slices
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('u') => {
                let code: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&code, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push('u');
                        out.push_str(&code);
                    }
                }
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
