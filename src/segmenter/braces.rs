//! Bounded-depth balanced-brace scanning for brace-delimited families.
//!
//! Headers are located by regex; block extents by counting braces up to a
//! fixed nesting cap. Blocks nested deeper than the cap are abandoned and
//! left to the residual bucket.

use regex::Regex;
use std::ops::Range;

/// Nesting the scanner follows inside a matched block, the block's own
/// braces included. Matches the original's three nested `{ }` levels.
const MAX_BRACE_DEPTH: usize = 4;

/// Byte index just past the `}` closing the brace opened at `open`, or
/// `None` when the block never closes or nests deeper than the scanner
/// follows.
pub(super) fn balanced_block_end(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, b) in text.as_bytes()[open..].iter().enumerate() {
        match b {
            b'{' => {
                depth += 1;
                if depth > MAX_BRACE_DEPTH {
                    return None;
                }
            }
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(open + offset + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Spans of "header + balanced block" matches of `header` in `buffer`.
///
/// `header` must end its match at the opening `{`. A `name` capture group,
/// when present and listed in `skip_names`, rejects the match — this filters
/// control-flow keywords the header patterns cannot exclude on their own.
pub(super) fn block_spans(buffer: &str, header: &Regex, skip_names: &[&str]) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut pos = 0;
    while pos < buffer.len() {
        let Some(caps) = header.captures_at(buffer, pos) else {
            break;
        };
        let Some(m) = caps.get(0) else {
            break;
        };
        if let Some(name) = caps.name("name") {
            if skip_names.contains(&name.as_str()) {
                pos = m.end();
                continue;
            }
        }
        let open = m.end() - 1;
        match balanced_block_end(buffer, open) {
            Some(end) => {
                spans.push(m.start()..end);
                pos = end;
            }
            None => pos = m.end(),
        }
    }
    spans
}

/// Spans of arrow functions: block bodies are brace-scanned, expression
/// bodies run to the terminating semicolon.
pub(super) fn arrow_spans(buffer: &str, header: &Regex) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut pos = 0;
    while pos < buffer.len() {
        let Some(m) = header.find_at(buffer, pos) else {
            break;
        };
        let body = m.end();
        let end = if buffer[body..].starts_with('{') {
            balanced_block_end(buffer, body)
        } else {
            buffer[body..].find(';').map(|i| body + i + 1)
        };
        match end {
            Some(end) => {
                spans.push(m.start()..end);
                pos = end;
            }
            None => pos = m.end(),
        }
    }
    spans
}
