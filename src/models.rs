//! Data models for the code summarizer.
//!
//! This module contains the tree structures exchanged between the extraction
//! stage and the aggregator: directories, files, and the typed fragments
//! produced by segmentation. The serialized shape matches the tree produced
//! by the extraction stage (`type`-tagged nodes) so trees can round-trip
//! through JSON.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Placeholder content stored for binary or unreadable files.
pub const BINARY_CONTENT_PLACEHOLDER: &str = "Binary file content not included";

/// Kind of a fragment produced by segmentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentKind {
    /// Leading import/include/require/use block.
    Imports,
    Class,
    Interface,
    Function,
    /// Method re-scanned from inside a class body.
    Method,
    ArrowFunction,
    /// Residual code that matched no structural pattern.
    OtherCode,
    /// Whole-file fallback when nothing else was extractable.
    CompleteFile,
    /// The `<?php` opening tag.
    PhpOpening,
}

impl fmt::Display for FragmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FragmentKind::Imports => "imports",
            FragmentKind::Class => "class",
            FragmentKind::Interface => "interface",
            FragmentKind::Function => "function",
            FragmentKind::Method => "method",
            FragmentKind::ArrowFunction => "arrow_function",
            FragmentKind::OtherCode => "other_code",
            FragmentKind::CompleteFile => "complete_file",
            FragmentKind::PhpOpening => "php_opening",
        };
        write!(f, "{}", name)
    }
}

/// Identifier of a fragment, unique within its owning file.
///
/// Top-level fragments are numbered from 1 in discovery order and render as
/// `snip3`. Method fragments re-scanned from inside a class body carry a
/// composite id referencing the enclosing class fragment and render as
/// `snip3snip1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FragmentId {
    /// Index of the enclosing class fragment for nested method fragments.
    pub parent: Option<u32>,
    /// Position in discovery order, 1-based.
    pub index: u32,
}

impl FragmentId {
    /// A top-level fragment id.
    pub fn top(index: u32) -> Self {
        Self {
            parent: None,
            index,
        }
    }

    /// A method id nested under the class fragment `parent`.
    pub fn nested(parent: u32, index: u32) -> Self {
        Self {
            parent: Some(parent),
            index,
        }
    }

    /// True for method fragments that live inside a class fragment.
    pub fn is_nested(&self) -> bool {
        self.parent.is_some()
    }
}

impl fmt::Display for FragmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.parent {
            Some(parent) => write!(f, "snip{}snip{}", parent, self.index),
            None => write!(f, "snip{}", self.index),
        }
    }
}

impl FromStr for FragmentId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix("snip")
            .ok_or_else(|| format!("invalid fragment id: {}", s))?;

        let parse = |part: &str| {
            part.parse::<u32>()
                .map_err(|_| format!("invalid fragment id: {}", s))
        };

        match rest.split_once("snip") {
            Some((parent, index)) => Ok(Self::nested(parse(parent)?, parse(index)?)),
            None => Ok(Self::top(parse(rest)?)),
        }
    }
}

impl Serialize for FragmentId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FragmentId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One semantically coherent slice of a file's text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fragment {
    /// Identifier, unique within the owning file.
    pub id: FragmentId,
    /// What the slice represents.
    pub kind: FragmentKind,
    /// Raw text of the slice.
    pub content: String,
    /// Prompt sent to the backend, set during aggregation.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub prompt: Option<String>,
    /// Generated summary, or the fallback sentinel on backend failure.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub summary: Option<String>,
}

impl Fragment {
    /// Creates a fragment with no prompt or summary yet.
    pub fn new(id: FragmentId, kind: FragmentKind, content: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            content: content.into(),
            prompt: None,
            summary: None,
        }
    }
}

/// Programming language derived from a file's extension tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    JavaScript,
    TypeScript,
    Python,
    Java,
    C,
    Cpp,
    CSharp,
    Php,
    Go,
    Ruby,
    Rust,
    Swift,
    Kotlin,
    Other,
}

impl Language {
    /// Maps an extension tag (no leading dot) to a language.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "js" | "jsx" | "mjs" => Language::JavaScript,
            "ts" | "tsx" => Language::TypeScript,
            "py" => Language::Python,
            "java" => Language::Java,
            "c" | "h" => Language::C,
            "cpp" | "cc" | "cxx" | "hpp" => Language::Cpp,
            "cs" => Language::CSharp,
            "php" => Language::Php,
            "go" => Language::Go,
            "rb" => Language::Ruby,
            "rs" => Language::Rust,
            "swift" => Language::Swift,
            "kt" | "kts" => Language::Kotlin,
            _ => Language::Other,
        }
    }

    /// Extraction family the segmenter applies to this language.
    pub fn family(&self) -> LanguageFamily {
        match self {
            Language::JavaScript | Language::TypeScript => LanguageFamily::Script,
            Language::Python => LanguageFamily::Indentation,
            Language::Java | Language::C | Language::Cpp | Language::CSharp => {
                LanguageFamily::CStyle
            }
            Language::Php => LanguageFamily::Php,
            Language::Go | Language::Ruby | Language::Rust | Language::Swift | Language::Kotlin => {
                LanguageFamily::GenericBrace
            }
            Language::Other => LanguageFamily::Plain,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Language::JavaScript => "JavaScript",
            Language::TypeScript => "TypeScript",
            Language::Python => "Python",
            Language::Java => "Java",
            Language::C => "C",
            Language::Cpp => "C++",
            Language::CSharp => "C#",
            Language::Php => "PHP",
            Language::Go => "Go",
            Language::Ruby => "Ruby",
            Language::Rust => "Rust",
            Language::Swift => "Swift",
            Language::Kotlin => "Kotlin",
            Language::Other => "Other",
        };
        write!(f, "{}", name)
    }
}

/// Families of languages sharing one extraction policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageFamily {
    /// Brace-delimited script languages (JavaScript, TypeScript).
    Script,
    /// Indentation-delimited languages (Python).
    Indentation,
    /// Brace-delimited languages with C-like declarations (Java, C, C++, C#).
    CStyle,
    /// PHP, with its opening-tag fragment.
    Php,
    /// Other brace languages matched only by function headers (Go, Rust, ...).
    GenericBrace,
    /// No recognized structure; the whole file becomes one fragment.
    Plain,
}

/// A node of the tree: either a directory or a file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    Directory(DirectoryNode),
    File(FileNode),
}

impl Node {
    /// The summary assigned by aggregation, if any.
    pub fn summary(&self) -> Option<&str> {
        match self {
            Node::Directory(dir) => dir.summary.as_deref(),
            Node::File(file) => file.summary.as_deref(),
        }
    }

    /// Label used in directory-level prompt lines.
    pub fn type_label(&self) -> &'static str {
        match self {
            Node::Directory(_) => "Directory",
            Node::File(_) => "File",
        }
    }
}

/// One directory of the tree.
///
/// Children keep directory-listing order; names are unique within a
/// directory by construction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectoryNode {
    /// Child nodes keyed by name.
    pub content: IndexMap<String, Node>,
    /// Prompt sent to the backend, set during aggregation.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub prompt: Option<String>,
    /// Generated summary, or the empty-directory sentinel.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub summary: Option<String>,
}

/// One source file of the tree.
///
/// `content` holds the raw text as extracted; segmentation moves it into
/// `fragments` + `original_content` during aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileNode {
    /// Extension tag (e.g. `"py"`, `"js"`), `"unknown"` for files without one.
    pub file_type: String,
    /// Raw text, or [`BINARY_CONTENT_PLACEHOLDER`]. Cleared by segmentation.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub content: Option<String>,
    /// Ordered fragments, insertion order = discovery order.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub fragments: Vec<Fragment>,
    /// Raw text preserved after segmentation.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub original_content: Option<String>,
    /// Prompt sent to the backend, set during aggregation.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub prompt: Option<String>,
    /// Generated summary, or the no-content sentinel.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub summary: Option<String>,
}

impl FileNode {
    /// Creates a file node holding raw content.
    pub fn new(file_type: impl Into<String>, content: Option<String>) -> Self {
        Self {
            file_type: file_type.into(),
            content,
            fragments: Vec::new(),
            original_content: None,
            prompt: None,
            summary: None,
        }
    }

    /// The language derived from this file's extension tag.
    pub fn language(&self) -> Language {
        Language::from_extension(&self.file_type)
    }

    /// True when the node carries text that can be segmented and summarized.
    pub fn has_readable_content(&self) -> bool {
        match self.content.as_deref() {
            None => false,
            Some(BINARY_CONTENT_PLACEHOLDER) => false,
            Some(_) => true,
        }
    }
}

/// Node counts for a tree, the root directory included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TreeStats {
    pub directories: usize,
    pub files: usize,
    pub fragments: usize,
}

impl TreeStats {
    /// Counts nodes and fragments under (and including) `root`.
    pub fn collect(root: &DirectoryNode) -> Self {
        let mut stats = TreeStats {
            directories: 1,
            ..TreeStats::default()
        };
        Self::walk(root, &mut stats);
        stats
    }

    fn walk(dir: &DirectoryNode, stats: &mut TreeStats) {
        for child in dir.content.values() {
            match child {
                Node::Directory(sub) => {
                    stats.directories += 1;
                    Self::walk(sub, stats);
                }
                Node::File(file) => {
                    stats.files += 1;
                    stats.fragments += file.fragments.len();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_id_display() {
        assert_eq!(FragmentId::top(1).to_string(), "snip1");
        assert_eq!(FragmentId::nested(3, 2).to_string(), "snip3snip2");
    }

    #[test]
    fn test_fragment_id_parse() {
        assert_eq!("snip4".parse::<FragmentId>().unwrap(), FragmentId::top(4));
        assert_eq!(
            "snip2snip1".parse::<FragmentId>().unwrap(),
            FragmentId::nested(2, 1)
        );
        assert!("frag1".parse::<FragmentId>().is_err());
        assert!("snipx".parse::<FragmentId>().is_err());
    }

    #[test]
    fn test_language_from_extension() {
        assert_eq!(Language::from_extension("py"), Language::Python);
        assert_eq!(Language::from_extension("TSX"), Language::TypeScript);
        assert_eq!(Language::from_extension("weird"), Language::Other);
    }

    #[test]
    fn test_language_families() {
        assert_eq!(Language::Python.family(), LanguageFamily::Indentation);
        assert_eq!(Language::Java.family(), LanguageFamily::CStyle);
        assert_eq!(Language::JavaScript.family(), LanguageFamily::Script);
        assert_eq!(Language::Other.family(), LanguageFamily::Plain);
    }

    #[test]
    fn test_node_round_trip() {
        let mut root = DirectoryNode::default();
        root.content.insert(
            "main.py".to_string(),
            Node::File(FileNode::new("py", Some("import os".to_string()))),
        );

        let json = serde_json::to_string(&Node::Directory(root)).unwrap();
        assert!(json.contains(r#""type":"directory""#));
        assert!(json.contains(r#""file_type":"py""#));

        let parsed: Node = serde_json::from_str(&json).unwrap();
        match parsed {
            Node::Directory(dir) => {
                assert!(matches!(dir.content.get("main.py"), Some(Node::File(_))));
            }
            Node::File(_) => panic!("expected a directory"),
        }
    }

    #[test]
    fn test_unknown_node_type_is_rejected() {
        let json = r#"{"type": "symlink", "content": {}}"#;
        assert!(serde_json::from_str::<Node>(json).is_err());
    }

    #[test]
    fn test_binary_content_is_not_readable() {
        let file = FileNode::new("png", Some(BINARY_CONTENT_PLACEHOLDER.to_string()));
        assert!(!file.has_readable_content());

        let file = FileNode::new("py", Some(String::new()));
        assert!(file.has_readable_content());
    }

    #[test]
    fn test_tree_stats() {
        let mut sub = DirectoryNode::default();
        sub.content.insert(
            "a.py".to_string(),
            Node::File(FileNode::new("py", Some("x = 1".to_string()))),
        );

        let mut root = DirectoryNode::default();
        root.content.insert("src".to_string(), Node::Directory(sub));
        root.content.insert(
            "README.md".to_string(),
            Node::File(FileNode::new("md", Some("# hi".to_string()))),
        );

        let stats = TreeStats::collect(&root);
        assert_eq!(stats.directories, 2);
        assert_eq!(stats.files, 2);
        assert_eq!(stats.fragments, 0);
    }
}
