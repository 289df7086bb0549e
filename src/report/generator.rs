//! Markdown and JSON report generation.
//!
//! This module renders the summarized tree: run metadata, statistics
//! tables, and the hierarchical summary itself.

use crate::aggregator::AggregateStats;
use crate::models::{DirectoryNode, Node};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// Metadata about one summarization run.
#[derive(Debug, Clone, Serialize)]
pub struct RunMetadata {
    /// Repository URL, local path, or tree file the run started from.
    pub source: String,
    /// Date and time of the run.
    pub run_date: DateTime<Utc>,
    /// Name of the LLM model used.
    pub model_used: String,
    /// Duration of the run in seconds.
    pub duration_seconds: f64,
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(
    metadata: &RunMetadata,
    tree: &DirectoryNode,
    stats: &AggregateStats,
) -> String {
    let mut output = String::new();

    output.push_str("# YoSummarizer Report\n\n");
    output.push_str(&generate_metadata_section(metadata));
    output.push_str(&generate_statistics_section(tree, stats));
    output.push_str(&generate_overview_section(tree));
    output.push_str(&generate_tree_section(tree));
    output.push_str(&generate_footer());

    output
}

/// Generate a JSON report: metadata, statistics, and the summarized tree.
pub fn generate_json_report(
    metadata: &RunMetadata,
    tree: &DirectoryNode,
    stats: &AggregateStats,
) -> Result<String> {
    let report = serde_json::json!({
        "metadata": metadata,
        "statistics": {
            "directories": stats.directories,
            "files": stats.files,
            "fragments": stats.fragments,
            "backend_calls": stats.backend_calls,
            "backend_failures": stats.backend_failures,
        },
        "tree": tree,
    });

    Ok(serde_json::to_string_pretty(&report)?)
}

/// Serialize the summarized tree alone, for `--save-tree`.
pub fn tree_json(tree: &DirectoryNode) -> Result<String> {
    Ok(serde_json::to_string_pretty(&tree.content)?)
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &RunMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** {}\n", metadata.source));
    section.push_str(&format!(
        "- **Run Date:** {}\n",
        metadata.run_date.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Model Used:** `{}`\n", metadata.model_used));
    section.push_str(&format!(
        "- **Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the statistics section.
fn generate_statistics_section(tree: &DirectoryNode, stats: &AggregateStats) -> String {
    let mut section = String::new();

    section.push_str("## Statistics\n\n");
    section.push_str("| Directories | Files | Fragments | Backend Calls | Failures |\n");
    section.push_str("|:---:|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} | {} | {} |\n\n",
        stats.directories, stats.files, stats.fragments, stats.backend_calls, stats.backend_failures
    ));

    if stats.backend_failures > 0 {
        section.push_str(&format!(
            "> ⚠️ {} backend call(s) failed; the affected summaries hold a fallback notice.\n\n",
            stats.backend_failures
        ));
    }

    let languages = language_distribution(tree);
    if !languages.is_empty() {
        section.push_str("### Files by Language\n\n");
        section.push_str("| Language | Files |\n");
        section.push_str("|:---|:---:|\n");

        let mut langs: Vec<_> = languages.iter().collect();
        langs.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

        for (lang, count) in langs {
            section.push_str(&format!("| {} | {} |\n", lang, count));
        }
        section.push('\n');
    }

    section
}

/// Generate the project overview section from the root summary.
fn generate_overview_section(tree: &DirectoryNode) -> String {
    let Some(summary) = tree.summary.as_deref() else {
        return String::new();
    };

    let mut section = String::new();
    section.push_str("## Project Overview\n\n");
    section.push_str(summary);
    section.push_str("\n\n");

    section
}

/// Generate the hierarchical summary tree section.
fn generate_tree_section(tree: &DirectoryNode) -> String {
    let mut section = String::new();

    section.push_str("## Summary Tree\n\n");
    render_children(tree, 0, &mut section);
    section.push('\n');

    section
}

fn render_children(dir: &DirectoryNode, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    for (name, child) in &dir.content {
        match child {
            Node::Directory(sub) => {
                out.push_str(&format!(
                    "{}- **{}/** — {}\n",
                    indent,
                    name,
                    child.summary().unwrap_or("(no summary)")
                ));
                render_children(sub, depth + 1, out);
            }
            Node::File(_) => {
                out.push_str(&format!(
                    "{}- **{}** — {}\n",
                    indent,
                    name,
                    child.summary().unwrap_or("(no summary)")
                ));
            }
        }
    }
}

/// Count files per language across the tree.
fn language_distribution(tree: &DirectoryNode) -> HashMap<String, usize> {
    let mut dist: HashMap<String, usize> = HashMap::new();
    walk_languages(tree, &mut dist);
    dist
}

fn walk_languages(dir: &DirectoryNode, dist: &mut HashMap<String, usize>) {
    for child in dir.content.values() {
        match child {
            Node::Directory(sub) => walk_languages(sub, dist),
            Node::File(file) => {
                *dist.entry(file.language().to_string()).or_default() += 1;
            }
        }
    }
}

/// Generate the report footer.
fn generate_footer() -> String {
    format!(
        "---\n\n*Generated by YoSummarizer v{}*\n",
        env!("CARGO_PKG_VERSION")
    )
}
