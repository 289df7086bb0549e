//! Language-aware segmentation of file text into typed fragments.
//!
//! Splitting is heuristic by design: headers are located with regular
//! expressions and block extents with a bounded-depth brace scanner or an
//! indentation-boundary scanner, never a parser. The contract is
//! "semantically coherent, non-overlapping slices", not syntactic validity;
//! constructs the scanners cannot follow fall through to the residual
//! bucket.

mod braces;
mod indent;

use crate::models::{Fragment, FragmentId, FragmentKind, Language, LanguageFamily};
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

/// Residual text at or below this length, after whitespace collapsing, is
/// discarded rather than kept as an `other_code` fragment.
const MIN_RESIDUAL_LEN: usize = 10;

/// Control-flow keywords the method/function header patterns cannot exclude
/// on their own.
const CONTROL_KEYWORDS: &[&str] = &[
    "if", "for", "while", "switch", "catch", "return", "function", "else", "do",
];

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

// Script family (JavaScript / TypeScript).
static SCRIPT_IMPORTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:import\s[^\n]*;|const\s+[^\n=]*=\s*require\([^\n]*\);|export\s+[^\n]*;)[ \t]*$")
        .unwrap()
});
static SCRIPT_CLASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:export\s+)?(?:default\s+)?(?:abstract\s+)?class\s+\w+(?:\s+extends\s+[\w.]+)?(?:\s+implements\s+[\w,\s.]+?)?\s*\{")
        .unwrap()
});
static SCRIPT_INTERFACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:export\s+)?interface\s+\w+(?:\s+extends\s+[\w,\s.]+?)?\s*\{").unwrap()
});
static SCRIPT_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:(?:export\s+)?(?:default\s+)?(?:async\s+)?function\s*\*?\s*\w*|(?:(?:const|let|var)\s+)?[\w.]+\s*=\s*(?:async\s+)?function\s*\w*)\s*\([^)]*\)\s*\{")
        .unwrap()
});
static SCRIPT_METHOD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]+(?:async\s+)?(?P<name>\w+)\s*\([^)]*\)\s*\{").unwrap());
static SCRIPT_ARROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:export\s+)?(?:const|let|var)\s+\w+\s*=\s*(?:async\s+)?(?:\([^)]*\)|\w+)\s*=>\s*")
        .unwrap()
});

// C-style family (Java / C / C++ / C#).
static C_IMPORTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:#include[^\n]*|import\s+[^\n]*;|using\s+[^\n]*;)[ \t]*$").unwrap()
});
static C_CLASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:(?:public|private|protected|abstract|final|static|sealed|partial)\s+)*class\s+\w+(?:\s*:\s*[\w,\s<>.]+?|\s+(?:extends|implements)\s+[\w,\s<>.]+?)?\s*\{")
        .unwrap()
});
static C_INTERFACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:(?:public|private|protected)\s+)*interface\s+\w+(?:\s*:\s*[\w,\s<>.]+?|\s+extends\s+[\w,\s<>.]+?)?\s*\{")
        .unwrap()
});
static C_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:(?:public|private|protected|static|final|virtual|override|inline|constexpr|unsigned|signed)\s+)*[\w:<>,\[\]*&~]+[ \t]+(?P<name>[\w:~]+)\s*\([^;{}]*\)\s*(?:const\s*)?(?:throws\s+[\w,\s]+?)?\s*\{")
        .unwrap()
});

// PHP family.
static PHP_CLASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:(?:abstract|final)\s+)?class\s+\w+(?:\s+extends\s+[\w\\]+)?(?:\s+implements\s+[\w,\s\\]+?)?\s*\{")
        .unwrap()
});
static PHP_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:(?:public|private|protected|static|final|abstract)\s+)*function\s+&?\w+\s*\([^)]*\)\s*(?::\s*\??[\w|\\]+)?\s*\{")
        .unwrap()
});

// Generic brace family (Go / Ruby / Rust / Swift / Kotlin).
static GENERIC_IMPORTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:import\s+[^\n]*|use\s+[^\n]*;|require\s+[^\n]*)[ \t]*$").unwrap()
});
static GENERIC_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:pub(?:\([^)]*\))?\s+)?(?:async\s+)?(?:unsafe\s+)?(?:func|fn|def)\b[^\n{]*\{")
        .unwrap()
});

/// Splits file text into an ordered set of typed fragments.
///
/// Never fails: input with no recognizable structure yields a single
/// `complete_file` fragment holding the entire text. When an import block
/// is extracted it always occupies id 1.
pub fn segment(content: &str, language: Language) -> Vec<Fragment> {
    let fragments = match language.family() {
        LanguageFamily::Script => segment_script(content),
        LanguageFamily::Indentation => indent::segment_python(content),
        LanguageFamily::CStyle => segment_c_style(content),
        LanguageFamily::Php => segment_php(content),
        LanguageFamily::GenericBrace => segment_generic(content),
        LanguageFamily::Plain => Vec::new(),
    };

    if fragments.is_empty() {
        return vec![Fragment::new(
            FragmentId::top(1),
            FragmentKind::CompleteFile,
            content,
        )];
    }
    fragments
}

fn segment_script(content: &str) -> Vec<Fragment> {
    let mut sp = Splitter::new(content);

    let import_spans = find_spans(&sp.buffer, &SCRIPT_IMPORTS);
    sp.consume_joined(FragmentKind::Imports, &import_spans);

    let class_spans = braces::block_spans(&sp.buffer, &SCRIPT_CLASS, &[]);
    sp.consume_each(FragmentKind::Class, &class_spans);

    let interface_spans = braces::block_spans(&sp.buffer, &SCRIPT_INTERFACE, &[]);
    sp.consume_each(FragmentKind::Interface, &interface_spans);

    let function_spans = braces::block_spans(&sp.buffer, &SCRIPT_FUNCTION, &[]);
    sp.consume_each(FragmentKind::Function, &function_spans);

    let method_spans = braces::block_spans(&sp.buffer, &SCRIPT_METHOD, CONTROL_KEYWORDS);
    sp.consume_each(FragmentKind::Method, &method_spans);

    let arrow_spans = braces::arrow_spans(&sp.buffer, &SCRIPT_ARROW);
    sp.consume_each(FragmentKind::ArrowFunction, &arrow_spans);

    sp.finish()
}

fn segment_c_style(content: &str) -> Vec<Fragment> {
    let mut sp = Splitter::new(content);

    let import_spans = find_spans(&sp.buffer, &C_IMPORTS);
    sp.consume_joined(FragmentKind::Imports, &import_spans);

    let class_spans = braces::block_spans(&sp.buffer, &C_CLASS, &[]);
    sp.consume_each(FragmentKind::Class, &class_spans);

    let interface_spans = braces::block_spans(&sp.buffer, &C_INTERFACE, &[]);
    sp.consume_each(FragmentKind::Interface, &interface_spans);

    let function_spans = braces::block_spans(&sp.buffer, &C_FUNCTION, CONTROL_KEYWORDS);
    sp.consume_each(FragmentKind::Function, &function_spans);

    sp.finish()
}

fn segment_php(content: &str) -> Vec<Fragment> {
    let mut sp = Splitter::new(content);

    if let Some(at) = sp.buffer.find("<?php") {
        sp.cut(&[at..at + "<?php".len()]);
        sp.push(FragmentKind::PhpOpening, "<?php".to_string());
    }

    let class_spans = braces::block_spans(&sp.buffer, &PHP_CLASS, &[]);
    sp.consume_each(FragmentKind::Class, &class_spans);

    let function_spans = braces::block_spans(&sp.buffer, &PHP_FUNCTION, &[]);
    sp.consume_each(FragmentKind::Function, &function_spans);

    sp.finish()
}

fn segment_generic(content: &str) -> Vec<Fragment> {
    let mut sp = Splitter::new(content);

    let import_spans = find_spans(&sp.buffer, &GENERIC_IMPORTS);
    sp.consume_joined(FragmentKind::Imports, &import_spans);

    let function_spans = braces::block_spans(&sp.buffer, &GENERIC_FUNCTION, &[]);
    sp.consume_each(FragmentKind::Function, &function_spans);

    sp.finish()
}

/// All non-overlapping matches of `pattern` as byte ranges.
fn find_spans(buffer: &str, pattern: &Regex) -> Vec<Range<usize>> {
    pattern.find_iter(buffer).map(|m| m.range()).collect()
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text, " ").trim().to_string()
}

/// Working buffer that fragments are carved out of.
///
/// Spans claimed by an earlier pattern are removed before later patterns
/// run, so top-level fragments never contain overlapping source text.
struct Splitter {
    buffer: String,
    fragments: Vec<Fragment>,
    next_index: u32,
}

impl Splitter {
    fn new(content: &str) -> Self {
        Self {
            buffer: content.to_string(),
            fragments: Vec::new(),
            next_index: 1,
        }
    }

    /// Appends a top-level fragment and returns its index.
    fn push(&mut self, kind: FragmentKind, content: String) -> u32 {
        let index = self.next_index;
        self.next_index += 1;
        self.fragments
            .push(Fragment::new(FragmentId::top(index), kind, content));
        index
    }

    /// Appends a method fragment nested under the class fragment `class_index`.
    fn push_method(&mut self, class_index: u32, method_index: u32, content: String) {
        self.fragments.push(Fragment::new(
            FragmentId::nested(class_index, method_index),
            FragmentKind::Method,
            content,
        ));
    }

    /// Carves `spans` out of the buffer, pushing one fragment per span.
    fn consume_each(&mut self, kind: FragmentKind, spans: &[Range<usize>]) {
        for text in self.cut(spans) {
            self.push(kind, text);
        }
    }

    /// Carves `spans` out of the buffer, newline-joined into one fragment.
    fn consume_joined(&mut self, kind: FragmentKind, spans: &[Range<usize>]) {
        let texts = self.cut(spans);
        if !texts.is_empty() {
            self.push(kind, texts.join("\n"));
        }
    }

    /// Removes `spans` (sorted, non-overlapping) from the buffer and returns
    /// their trimmed texts in order.
    fn cut(&mut self, spans: &[Range<usize>]) -> Vec<String> {
        if spans.is_empty() {
            return Vec::new();
        }
        let mut texts = Vec::with_capacity(spans.len());
        let mut rebuilt = String::with_capacity(self.buffer.len());
        let mut last = 0;
        for span in spans {
            rebuilt.push_str(&self.buffer[last..span.start]);
            rebuilt.push('\n');
            texts.push(self.buffer[span.clone()].trim().to_string());
            last = span.end;
        }
        rebuilt.push_str(&self.buffer[last..]);
        self.buffer = rebuilt;
        texts
    }

    /// Collapses whatever is left of the buffer into an `other_code`
    /// fragment when it is long enough to be worth keeping.
    fn finish(mut self) -> Vec<Fragment> {
        let residue = collapse_whitespace(&self.buffer);
        if residue.len() > MIN_RESIDUAL_LEN {
            self.push(FragmentKind::OtherCode, residue);
        }
        self.fragments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_JS: &str = include_str!("../../fixtures/sample.js");
    const SAMPLE_PY: &str = include_str!("../../fixtures/sample.py");

    fn non_ws_len(text: &str) -> usize {
        text.chars().filter(|c| !c.is_whitespace()).count()
    }

    #[test]
    fn test_two_line_python_example() {
        let fragments = segment("import os\ndef foo(): return 1", Language::Python);

        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].id, FragmentId::top(1));
        assert_eq!(fragments[0].kind, FragmentKind::Imports);
        assert_eq!(fragments[0].content, "import os");
        assert_eq!(fragments[1].id, FragmentId::top(2));
        assert_eq!(fragments[1].kind, FragmentKind::Function);
        assert_eq!(fragments[1].content, "def foo(): return 1");
    }

    #[test]
    fn test_plain_file_becomes_complete_file() {
        let content = "just a readme paragraph with no structure";
        let fragments = segment(content, Language::Other);

        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].id, FragmentId::top(1));
        assert_eq!(fragments[0].kind, FragmentKind::CompleteFile);
        assert_eq!(fragments[0].content, content);
    }

    #[test]
    fn test_empty_content_still_yields_a_fragment() {
        let fragments = segment("", Language::Python);
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].kind, FragmentKind::CompleteFile);
    }

    #[test]
    fn test_javascript_fixture() {
        let fragments = segment(SAMPLE_JS, Language::JavaScript);

        assert_eq!(fragments[0].kind, FragmentKind::Imports);
        assert!(fragments[0].content.contains("require('express')"));
        assert!(fragments
            .iter()
            .any(|f| f.kind == FragmentKind::Class && f.content.contains("class Store")));
        assert!(fragments
            .iter()
            .any(|f| f.kind == FragmentKind::Function && f.content.contains("function makeStore")));
        assert!(fragments
            .iter()
            .any(|f| f.kind == FragmentKind::ArrowFunction && f.content.contains("const handler")));
    }

    #[test]
    fn test_ids_unique_and_monotonic() {
        let fragments = segment(SAMPLE_JS, Language::JavaScript);

        let mut seen = std::collections::HashSet::new();
        for fragment in &fragments {
            assert!(seen.insert(fragment.id), "duplicate id {}", fragment.id);
        }

        let top_indices: Vec<u32> = fragments
            .iter()
            .filter(|f| !f.id.is_nested())
            .map(|f| f.id.index)
            .collect();
        let mut sorted = top_indices.clone();
        sorted.sort_unstable();
        assert_eq!(top_indices, sorted);
        assert_eq!(top_indices.first(), Some(&1));
    }

    #[test]
    fn test_reconstruction_without_overlap() {
        for (content, language) in [
            (SAMPLE_JS, Language::JavaScript),
            (SAMPLE_PY, Language::Python),
        ] {
            let fragments = segment(content, language);
            // Nested methods are views into their class text and are not
            // counted; top-level fragments partition the source up to the
            // discarded residual.
            let covered: usize = fragments
                .iter()
                .filter(|f| !f.id.is_nested())
                .map(|f| non_ws_len(&f.content))
                .sum();
            let total = non_ws_len(content);

            assert!(covered <= total, "fragments overlap: {} > {}", covered, total);
            assert!(
                total - covered <= MIN_RESIDUAL_LEN,
                "lost more than the residual threshold: {} of {}",
                total - covered,
                total
            );
        }
    }

    #[test]
    fn test_c_style_segmentation() {
        let source = "\
#include <stdio.h>
import java.util.List;

public class Account extends Base {
    private int balance;
}

public interface Ledger {
    void post();
}

static int add(int a, int b) {
    return a + b;
}
";
        let fragments = segment(source, Language::Java);

        assert_eq!(fragments[0].kind, FragmentKind::Imports);
        assert_eq!(
            fragments[0].content,
            "#include <stdio.h>\nimport java.util.List;"
        );
        assert!(fragments
            .iter()
            .any(|f| f.kind == FragmentKind::Class && f.content.contains("class Account")));
        assert!(fragments
            .iter()
            .any(|f| f.kind == FragmentKind::Interface && f.content.contains("interface Ledger")));
        assert!(fragments
            .iter()
            .any(|f| f.kind == FragmentKind::Function && f.content.contains("add(int a, int b)")));
    }

    #[test]
    fn test_php_opening_tag_takes_first_id() {
        let source = "<?php\nfunction render($page) {\n    echo $page;\n}\n";
        let fragments = segment(source, Language::Php);

        assert_eq!(fragments[0].id, FragmentId::top(1));
        assert_eq!(fragments[0].kind, FragmentKind::PhpOpening);
        assert_eq!(fragments[0].content, "<?php");
        assert_eq!(fragments[1].kind, FragmentKind::Function);
        assert!(fragments[1].content.contains("function render"));
    }

    #[test]
    fn test_generic_brace_function() {
        let source = "use std::fmt;\n\nfn main() {\n    println!(\"hi\");\n}\n";
        let fragments = segment(source, Language::Rust);

        assert_eq!(fragments[0].kind, FragmentKind::Imports);
        assert_eq!(fragments[0].content, "use std::fmt;");
        assert_eq!(fragments[1].kind, FragmentKind::Function);
        assert!(fragments[1].content.starts_with("fn main()"));
    }

    #[test]
    fn test_deeply_nested_block_falls_to_residual() {
        // Nesting beyond the brace cap: the scanner abandons the block and
        // the residual bucket keeps the text instead.
        let source = "function deep() { a { b { c { d { e } } } } }\n";
        let fragments = segment(source, Language::JavaScript);

        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].kind, FragmentKind::OtherCode);
        assert!(fragments[0].content.contains("function deep"));
    }

    #[test]
    fn test_short_residual_is_discarded() {
        let source = "import os\nx=1\n";
        let fragments = segment(source, Language::Python);

        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].kind, FragmentKind::Imports);
    }
}
