//! Structural repair passes for candidate JSON text.
//!
//! Exactly two repairs are performed: delimiter balancing and
//! trailing-comma removal. Both are pure, idempotent string transforms;
//! neither guarantees the result parses. Anything they cannot fix is the
//! field-recovery stage's problem.

/// Apply both repair passes in order.
pub(crate) fn repair(candidate: &str) -> String {
    let balanced = balance_delimiters(candidate);
    strip_trailing_commas(&balanced)
}

/// Close unmatched `{`/`[` delimiters by appending the missing closers in
/// nesting order. Quoted spans are skipped; unmatched closers are ignored
/// rather than repaired.
fn balance_delimiters(text: &str) -> String {
    let mut open: Vec<char> = Vec::new();
    let mut in_quotes = false;
    let mut escaped = false;

    for c in text.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            '{' | '[' if !in_quotes => open.push(c),
            '}' if !in_quotes => {
                if open.last() == Some(&'{') {
                    open.pop();
                }
            }
            ']' if !in_quotes => {
                if open.last() == Some(&'[') {
                    open.pop();
                }
            }
            _ => {}
        }
    }

    if open.is_empty() {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() + open.len());
    out.push_str(text);
    while let Some(delimiter) = open.pop() {
        out.push(if delimiter == '{' { '}' } else { ']' });
    }
    out
}

/// Drop commas that directly precede a closing `}` or `]`, tolerating
/// intervening whitespace. Quoted spans are untouched.
fn strip_trailing_commas(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_quotes = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if escaped {
            out.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => {
                out.push(c);
                escaped = true;
            }
            '"' => {
                out.push(c);
                in_quotes = !in_quotes;
            }
            ',' if !in_quotes => {
                let mut j = i + 1;
                while j < chars.len() && chars[j].is_whitespace() {
                    j += 1;
                }
                let closes_next = j < chars.len() && (chars[j] == '}' || chars[j] == ']');
                if !closes_next {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }
    out
}
