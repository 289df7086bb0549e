//! YoSummarizer - LLM-powered hierarchical code summarizer
//!
//! A CLI tool that segments every file of a repository into semantic
//! fragments, summarizes them with Ollama, and composes file and directory
//! summaries bottom-up, leaf to root.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (connection, config, clone failure, malformed tree)
//!   2 - Completed, but some backend calls failed (degraded summaries)

mod aggregator;
mod backend;
mod cli;
mod config;
mod extract;
mod models;
mod repo;
mod report;
mod segmenter;

use aggregator::Aggregator;
use anyhow::{Context, Result};
use backend::{OllamaBackend, OllamaConfig};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::Config;
use indexmap::IndexMap;
use models::{DirectoryNode, Node, TreeStats};
use report::RunMetadata;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("YoSummarizer v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    // Run the summarization
    match run_summarize(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Summarization failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .yosummarizer.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".yosummarizer.toml");

    if path.exists() {
        eprintln!("⚠️  .yosummarizer.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .yosummarizer.toml")?;

    println!("✅ Created .yosummarizer.toml with default settings.");
    println!("   Edit it to customize model, excludes, timeouts, and more.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete summarization workflow. Returns exit code (0 or 2).
async fn run_summarize(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    // Step 1: Obtain the raw tree
    let (raw_tree, source) = obtain_tree(&args, &mut config)?;

    let raw_stats = TreeStats::collect(&raw_tree);
    info!(
        "Extracted tree: {} directories, {} files",
        raw_stats.directories, raw_stats.files
    );

    // Handle --dry-run: list the tree and exit
    if args.dry_run {
        return handle_dry_run(&raw_tree, &raw_stats);
    }

    // Step 2: Initialize the backend
    println!("🤖 Initializing summarization backend...");
    println!("   Model: {}", config.model.name);
    println!("   Ollama: {}", config.model.ollama_url);
    println!("   Timeout: {}s per call", config.model.timeout_seconds);

    let ollama = OllamaBackend::new(OllamaConfig {
        url: config.model.ollama_url.clone(),
        model: config.model.name.clone(),
        temperature: config.model.temperature,
        timeout_seconds: config.model.timeout_seconds,
    });

    // Step 3: Segment and summarize, bottom-up
    println!("\n🔬 Summarizing {} files, leaf to root...", raw_stats.files);
    println!("   Each fragment, file, and directory costs one model call.\n");

    let (tree, stats) = Aggregator::new(&ollama).aggregate(raw_tree).await;

    // Step 4: Render and write the report
    println!("📝 Generating report...");

    let metadata = RunMetadata {
        source,
        run_date: Utc::now(),
        model_used: config.model.name.clone(),
        duration_seconds: start_time.elapsed().as_secs_f64(),
    };

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&metadata, &tree, &stats)?,
        OutputFormat::Markdown => report::generate_markdown_report(&metadata, &tree, &stats),
    };

    std::fs::write(&args.output, &output)
        .with_context(|| format!("Failed to write report to {}", args.output.display()))?;

    // Optionally persist the summarized tree as JSON
    if let Some(ref save_tree) = config.general.save_tree {
        let json = report::tree_json(&tree)?;
        std::fs::write(save_tree, json)
            .with_context(|| format!("Failed to write tree to {}", save_tree))?;
        println!("   Summarized tree saved to: {}", save_tree);
    }

    // Print summary
    println!("\n📊 Run Summary:");
    println!(
        "   Directories: {} | Files: {} | Fragments: {}",
        stats.directories, stats.files, stats.fragments
    );
    println!(
        "   Backend calls: {} ({} failed)",
        stats.backend_calls, stats.backend_failures
    );
    println!("   Duration: {:.1}s", metadata.duration_seconds);
    println!(
        "\n✅ Summarization complete! Report saved to: {}",
        args.output.display()
    );

    if stats.degraded() {
        eprintln!(
            "\n⚠️  {} backend call(s) failed; affected summaries hold a fallback notice (exit code 2).",
            stats.backend_failures
        );
        return Ok(2);
    }

    Ok(0)
}

/// Obtain the raw tree from --from-tree, --local, or by cloning --repo.
/// Returns the tree and a human-readable source label.
fn obtain_tree(args: &Args, config: &mut Config) -> Result<(DirectoryNode, String)> {
    // Load a previously extracted tree
    if let Some(ref tree_path) = args.from_tree {
        println!("📂 Loading tree from: {}", tree_path.display());
        let tree = load_tree(tree_path)?;
        return Ok((tree, tree_path.display().to_string()));
    }

    // Extract from a local directory
    if let Some(ref local) = args.local {
        println!("📂 Extracting local directory: {}", local.display());
        let tree = extract_tree(local.clone(), config)?;
        return Ok((tree, local.display().to_string()));
    }

    // Clone the repository, then extract
    let repo_url = args.repo.as_deref().unwrap_or_default();
    println!("📥 Cloning repository: {}", repo_url);

    let clone_options = repo::CloneOptions {
        branch: args.branch.clone(),
        depth: Some(1), // Shallow clone
        show_progress: !args.quiet,
        target_dir: None,
    };

    let clone_result = repo::clone_repository(repo_url, clone_options)?;
    let repo_path = clone_result.into_path();
    info!("Repository at: {}", repo_path.display());

    // Repository-local config takes over, CLI args still win
    if let Ok(Some(repo_config)) = Config::load_from_repo(&repo_path) {
        info!("Found .yosummarizer.toml in repository");
        *config = repo_config;
        config.merge_with_args(args);
    }

    let tree = extract_tree(repo_path, config)?;

    let label = match repo::parse_github_url(repo_url) {
        Some((owner, name)) => format!("{}/{}", owner, name),
        None => repo_url.to_string(),
    };
    Ok((tree, label))
}

/// Extract the raw tree from a directory on disk.
fn extract_tree(root: PathBuf, config: &Config) -> Result<DirectoryNode> {
    let options = extract::ExtractOptions::from(&config.extractor);
    let extractor = extract::TreeExtractor::new(root, options);
    extractor.extract()
}

/// Load a raw tree from a JSON file holding the name-to-node mapping.
///
/// A malformed tree (unknown node type, mistyped fields) fails the whole
/// run here, before any backend call is made.
fn load_tree(path: &std::path::Path) -> Result<DirectoryNode> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read tree file: {}", path.display()))?;

    let content: IndexMap<String, Node> = serde_json::from_str(&json)
        .with_context(|| format!("Malformed input tree in {}", path.display()))?;

    Ok(DirectoryNode {
        content,
        ..DirectoryNode::default()
    })
}

/// Handle --dry-run: list the tree, print counts, exit.
fn handle_dry_run(tree: &DirectoryNode, stats: &TreeStats) -> Result<i32> {
    println!("\n🔍 Dry run: extracted tree (no LLM calls)...\n");

    if tree.content.is_empty() {
        println!("   No files found.");
    } else {
        print_tree(tree, 1);
        println!(
            "\n   Total: {} directories, {} files",
            stats.directories, stats.files
        );
    }

    println!("\n✅ Dry run complete. No LLM calls were made.");
    Ok(0)
}

fn print_tree(dir: &DirectoryNode, depth: usize) {
    let indent = "  ".repeat(depth);
    for (name, child) in &dir.content {
        match child {
            Node::Directory(sub) => {
                println!("{}📁 {}/", indent, name);
                print_tree(sub, depth + 1);
            }
            Node::File(file) => {
                let size = file.content.as_deref().map(str::len).unwrap_or(0);
                println!("{}📄 {} ({} bytes)", indent, name, size);
            }
        }
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .yosummarizer.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
