//! Filesystem extraction: builds the raw tree the summarizer consumes.
//!
//! A recursive walk turns a directory into the nested node mapping, reading
//! text content for every file that is not ignored. Binary files (by
//! extension or non-UTF-8 content) and oversized files carry a fixed
//! placeholder instead of their bytes; hidden entries and the ignore list
//! are skipped entirely.

use crate::models::{DirectoryNode, FileNode, Node, BINARY_CONTENT_PLACEHOLDER};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration for tree extraction.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Directory and file names to skip entirely.
    pub excludes: Vec<String>,
    /// Extensions treated as binary without reading the file.
    pub binary_extensions: Vec<String>,
    /// Files larger than this get the binary placeholder.
    pub max_file_size: u64,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            excludes: vec![
                "node_modules",
                ".git",
                ".github",
                ".vscode",
                ".idea",
                "build",
                "dist",
                "coverage",
                "target",
                "__pycache__",
                ".pytest_cache",
                "venv",
                ".venv",
                "package-lock.json",
                "yarn.lock",
                "Cargo.lock",
                ".DS_Store",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            binary_extensions: vec![
                "jpg", "jpeg", "png", "gif", "svg", "ico", "pdf", "zip", "tar", "gz", "rar",
                "exe", "dll", "so", "pyc", "class", "woff", "woff2",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            max_file_size: 1024 * 1024, // 1MB
        }
    }
}

impl From<&crate::config::ExtractorConfig> for ExtractOptions {
    fn from(config: &crate::config::ExtractorConfig) -> Self {
        Self {
            excludes: config.excludes.clone(),
            binary_extensions: config.binary_extensions.clone(),
            max_file_size: config.max_file_size,
        }
    }
}

/// Recursive directory walker producing the raw tree.
pub struct TreeExtractor {
    root: PathBuf,
    options: ExtractOptions,
}

impl TreeExtractor {
    pub fn new(root: PathBuf, options: ExtractOptions) -> Self {
        Self { root, options }
    }

    /// Walks the root directory into a raw tree.
    ///
    /// Children are inserted in name order so the listing order (and with
    /// it every downstream prompt) is deterministic across platforms.
    pub fn extract(&self) -> Result<DirectoryNode> {
        if !self.root.is_dir() {
            anyhow::bail!(
                "The path '{}' does not exist or is not a directory",
                self.root.display()
            );
        }

        let mut root = DirectoryNode::default();
        self.process_directory(&self.root, &mut root)?;
        Ok(root)
    }

    fn process_directory(&self, path: &Path, node: &mut DirectoryNode) -> Result<()> {
        let mut entries: Vec<_> = fs::read_dir(path)
            .with_context(|| format!("Failed to read directory: {}", path.display()))?
            .flatten()
            .collect();
        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let name = entry.file_name().to_string_lossy().to_string();
            if self.is_excluded(&name) {
                continue;
            }

            let entry_path = entry.path();
            if entry_path.is_dir() {
                let mut child = DirectoryNode::default();
                self.process_directory(&entry_path, &mut child)?;
                node.content.insert(name, Node::Directory(child));
            } else if entry_path.is_file() {
                node.content
                    .insert(name, Node::File(self.extract_file(&entry_path)));
            }
        }

        Ok(())
    }

    fn extract_file(&self, path: &Path) -> FileNode {
        let file_type = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("unknown")
            .to_string();

        let content = if self.is_binary(path) || self.is_oversized(path) {
            BINARY_CONTENT_PLACEHOLDER.to_string()
        } else {
            match fs::read_to_string(path) {
                Ok(text) => text,
                Err(e) => {
                    // Not valid UTF-8 (or unreadable): treat like binary.
                    debug!("Cannot read {} as text: {}", path.display(), e);
                    BINARY_CONTENT_PLACEHOLDER.to_string()
                }
            }
        };

        FileNode::new(file_type, Some(content))
    }

    fn is_excluded(&self, name: &str) -> bool {
        if name.starts_with('.') {
            return true;
        }
        self.options.excludes.iter().any(|pattern| name == pattern)
    }

    fn is_binary(&self, path: &Path) -> bool {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        self.options.binary_extensions.contains(&ext)
    }

    fn is_oversized(&self, path: &Path) -> bool {
        fs::metadata(path)
            .map(|meta| meta.len() > self.options.max_file_size)
            .unwrap_or(true)
    }
}
