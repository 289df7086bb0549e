//! Report generation.
//!
//! This module renders the summarized tree as a Markdown report or JSON.

pub mod generator;

pub use generator::{generate_json_report, generate_markdown_report, tree_json, RunMetadata};
