//! Indentation-boundary scanning for Python-style sources.
//!
//! A block runs from its header line to the first following non-blank line
//! at the same or shallower indentation; blank lines inside a block do not
//! end it. Methods are re-scanned one indentation level deeper inside each
//! captured class body and stored under composite ids referencing the class
//! fragment.

use super::{find_spans, Splitter};
use crate::models::{Fragment, FragmentKind};
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

static PY_IMPORTS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^(?:import|from)\s[^\n]*$").unwrap());
static PY_CLASS_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^class\s+\w+(?:\([^)\n]*\))?\s*:").unwrap());
static PY_FUNCTION_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(?:async\s+)?def\s+\w+\s*\([^)]*\)(?:\s*->\s*[^:\n]+)?\s*:").unwrap()
});
static PY_METHOD_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]+(?:async\s+)?def\s+\w+\s*\([^)]*\)(?:\s*->\s*[^:\n]+)?\s*:").unwrap()
});

pub(super) fn segment_python(content: &str) -> Vec<Fragment> {
    let mut sp = Splitter::new(content);

    let import_spans = find_spans(&sp.buffer, &PY_IMPORTS);
    sp.consume_joined(FragmentKind::Imports, &import_spans);

    // Classes keep their full body; methods are nested views re-scanned from
    // the class text, so they do not participate in buffer consumption.
    let class_spans = indent_block_spans(&sp.buffer, &PY_CLASS_HEADER);
    let class_texts = sp.cut(&class_spans);
    for class_text in class_texts {
        let methods = method_blocks(&class_text);
        let class_index = sp.push(FragmentKind::Class, class_text);
        for (i, method) in methods.into_iter().enumerate() {
            sp.push_method(class_index, (i + 1) as u32, method);
        }
    }

    let function_spans = indent_block_spans(&sp.buffer, &PY_FUNCTION_HEADER);
    sp.consume_each(FragmentKind::Function, &function_spans);

    sp.finish()
}

/// Span of each header match extended over its indentation block.
fn indent_block_spans(buffer: &str, header: &Regex) -> Vec<Range<usize>> {
    let mut spans: Vec<Range<usize>> = Vec::new();
    for m in header.find_iter(buffer) {
        if spans.last().is_some_and(|prev| m.start() < prev.end) {
            continue;
        }
        spans.push(m.start()..indented_block_end(buffer, m.start(), 0));
    }
    spans
}

/// Method blocks inside a captured class body.
fn method_blocks(class_text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut skip_until = 0;
    for m in PY_METHOD_HEADER.find_iter(class_text) {
        if m.start() < skip_until {
            continue;
        }
        let header_indent = indent_width(&class_text[m.start()..]);
        let end = indented_block_end(class_text, m.start(), header_indent);
        blocks.push(class_text[m.start()..end].trim().to_string());
        skip_until = end;
    }
    blocks
}

/// End of the block whose header line starts at `start`: the block extends
/// over blank lines and lines indented deeper than `header_indent`, and ends
/// before the first non-blank line at or above the header's level.
fn indented_block_end(text: &str, start: usize, header_indent: usize) -> usize {
    let end = match text[start..].find('\n') {
        Some(i) => start + i,
        None => return text.len(),
    };
    let mut last_content_end = end;
    let mut cursor = end + 1;
    while cursor < text.len() {
        let line_end = text[cursor..]
            .find('\n')
            .map(|i| cursor + i)
            .unwrap_or(text.len());
        let line = &text[cursor..line_end];
        if line.trim().is_empty() {
            // blank lines stay inside the block
        } else if indent_width(line) > header_indent {
            last_content_end = line_end;
        } else {
            break;
        }
        cursor = line_end + 1;
    }
    last_content_end
}

fn indent_width(line: &str) -> usize {
    line.bytes()
        .take_while(|b| *b == b' ' || *b == b'\t')
        .count()
}
