//! Post-order tree summarization.
//!
//! The aggregator owns the tree for the duration of one run. It walks the
//! tree depth-first, segments file leaves that still carry raw text,
//! summarizes every fragment, composes file summaries from fragment
//! summaries and directory summaries from child summaries — strictly bottom
//! up, so a node's summary is computed only after all of its children have
//! one. A failed backend call is replaced by a fixed fallback sentinel and
//! never aborts the run.

pub mod prompts;

use crate::backend::TextGenerationBackend;
use crate::models::{DirectoryNode, FileNode, Node};
use crate::segmenter;
use futures::future::BoxFuture;
use tracing::{debug, warn};

/// Counters for one aggregation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateStats {
    /// Backend calls issued (fragment + file + directory level).
    pub backend_calls: usize,
    /// Calls that failed and were replaced by the fallback sentinel.
    pub backend_failures: usize,
    pub files: usize,
    pub directories: usize,
    pub fragments: usize,
}

impl AggregateStats {
    /// True when at least one summary fell back to the sentinel.
    pub fn degraded(&self) -> bool {
        self.backend_failures > 0
    }
}

/// Bottom-up summarizer over a fully-owned tree.
pub struct Aggregator<'a> {
    backend: &'a dyn TextGenerationBackend,
    stats: AggregateStats,
}

impl<'a> Aggregator<'a> {
    pub fn new(backend: &'a dyn TextGenerationBackend) -> Self {
        Self {
            backend,
            stats: AggregateStats::default(),
        }
    }

    /// Summarizes the whole tree, leaf to root.
    ///
    /// Takes the raw tree by value and returns the summarized tree: every
    /// node carries a summary afterwards, children strictly before parents.
    pub async fn aggregate(mut self, mut root: DirectoryNode) -> (DirectoryNode, AggregateStats) {
        self.aggregate_directory(&mut root).await;
        (root, self.stats)
    }

    fn aggregate_node<'b>(&'b mut self, node: &'b mut Node) -> BoxFuture<'b, Option<String>> {
        Box::pin(async move {
            match node {
                Node::Directory(dir) => self.aggregate_directory(dir).await,
                Node::File(file) => self.aggregate_file(file).await,
            }
        })
    }

    /// Summarizes every child first, then the directory itself from the
    /// collected "`name` (File|Directory): `summary`" lines. A directory
    /// whose children produced nothing gets the empty sentinel without a
    /// backend call.
    async fn aggregate_directory(&mut self, dir: &mut DirectoryNode) -> Option<String> {
        self.stats.directories += 1;

        let mut lines = Vec::new();
        for (name, child) in dir.content.iter_mut() {
            let label = child.type_label();
            if let Some(summary) = self.aggregate_node(child).await {
                if !summary.is_empty() {
                    lines.push(format!("{} ({}): {}", name, label, summary));
                }
            }
        }

        if lines.is_empty() {
            debug!("Directory has no summarizable content");
            dir.summary = Some(prompts::DIRECTORY_EMPTY.to_string());
        } else {
            let prompt = prompts::directory_prompt(&lines.join("\n"));
            let summary = self.generate(&prompt).await;
            dir.prompt = Some(prompt);
            dir.summary = Some(summary);
        }

        dir.summary.clone()
    }

    /// Segments the file if it still carries raw text, summarizes each
    /// fragment in id order, then the file from its fragment summaries.
    /// Files without readable content get the no-content sentinel without a
    /// backend call.
    async fn aggregate_file(&mut self, file: &mut FileNode) -> Option<String> {
        self.stats.files += 1;

        if file.fragments.is_empty() && file.has_readable_content() {
            if let Some(content) = file.content.take() {
                file.fragments = segmenter::segment(&content, file.language());
                file.original_content = Some(content);
            }
        }

        if file.fragments.is_empty() {
            file.summary = Some(prompts::FILE_NO_CONTENT.to_string());
            return file.summary.clone();
        }

        self.stats.fragments += file.fragments.len();
        for fragment in &mut file.fragments {
            let prompt = prompts::fragment_prompt(&fragment.content);
            let summary = self.generate(&prompt).await;
            fragment.prompt = Some(prompt);
            fragment.summary = Some(summary);
        }

        let lines: Vec<String> = file
            .fragments
            .iter()
            .filter_map(|f| {
                f.summary
                    .as_ref()
                    .map(|s| format!("{} ({}): {}", f.id, f.kind, s))
            })
            .collect();

        let prompt = prompts::file_prompt(&lines.join("\n"));
        let summary = self.generate(&prompt).await;
        file.prompt = Some(prompt);
        file.summary = Some(summary);

        file.summary.clone()
    }

    /// Issues one backend call; a failure yields the fallback sentinel and
    /// the traversal continues.
    async fn generate(&mut self, prompt: &str) -> String {
        self.stats.backend_calls += 1;
        match self.backend.generate(prompt).await {
            Ok(text) => text,
            Err(err) => {
                warn!("Backend call failed: {}", err);
                self.stats.backend_failures += 1;
                prompts::GENERATION_FAILED.to_string()
            }
        }
    }
}
