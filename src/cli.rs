//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// YoSummarizer - LLM-powered hierarchical code summarizer for GitHub repos
///
/// Turn any repository into a bottom-up summary: files are split into
/// semantic fragments, fragments are summarized with local AI, and file and
/// directory summaries are composed from them, leaf to root.
///
/// Examples:
///   yosummarizer --repo https://github.com/owner/repo.git
///   yosummarizer --local ./my-project --model mistral:latest
///   yosummarizer --from-tree extracted_tree.json --format json
///   yosummarizer --repo https://github.com/owner/repo.git --dry-run
///   yosummarizer --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// GitHub repository URL to summarize
    ///
    /// Supports HTTPS URLs (e.g., https://github.com/owner/repo.git).
    /// Not required when using --local, --from-tree, or --init-config.
    #[arg(
        short,
        long,
        value_name = "URL",
        required_unless_present_any = ["local", "from_tree", "init_config"]
    )]
    pub repo: Option<String>,

    /// Local directory to summarize instead of cloning
    #[arg(long, value_name = "DIR", conflicts_with = "repo")]
    pub local: Option<PathBuf>,

    /// Previously extracted raw tree (JSON) to summarize
    ///
    /// Skips cloning and extraction entirely; the file must hold the nested
    /// name-to-node mapping an extraction run produces.
    #[arg(long, value_name = "FILE", conflicts_with_all = ["repo", "local"])]
    pub from_tree: Option<PathBuf>,

    /// Ollama model to use for summarization
    ///
    /// Can also be set via YOSUMMARIZER_MODEL env var or .yosummarizer.toml.
    #[arg(short, long, default_value = "mistral:latest", env = "YOSUMMARIZER_MODEL")]
    pub model: String,

    /// Ollama API endpoint URL
    #[arg(long, default_value = "http://localhost:11434", env = "OLLAMA_URL")]
    pub ollama_url: String,

    /// Output file path for the report
    #[arg(
        short,
        long,
        default_value = "yosummary_report.md",
        value_name = "FILE"
    )]
    pub output: PathBuf,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Also write the summarized tree as JSON to this path
    #[arg(long, value_name = "FILE")]
    pub save_tree: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .yosummarizer.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Specific branch to clone
    ///
    /// If not specified, uses the default branch
    #[arg(short, long, value_name = "BRANCH")]
    pub branch: Option<String>,

    /// Patterns to exclude from extraction (comma-separated)
    ///
    /// Example: --exclude "vendor,generated"
    #[arg(long, value_name = "PATTERNS", value_delimiter = ',')]
    pub exclude: Option<Vec<String>>,

    /// Request timeout in seconds for one backend call
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Temperature for LLM responses (0.0 - 1.0)
    ///
    /// Lower values produce more consistent/deterministic output
    #[arg(long, default_value = "0.1")]
    pub temperature: f32,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Dry run: extract the tree and list it without calling the LLM
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .yosummarizer.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Validate repository URL format when cloning
        if let Some(ref repo) = self.repo {
            if !repo.starts_with("https://") && !repo.starts_with("git@") {
                return Err("Repository URL must start with 'https://' or 'git@'".to_string());
            }
        }

        // Validate Ollama URL format (not needed for dry-run)
        if !self.dry_run
            && !self.ollama_url.starts_with("http://")
            && !self.ollama_url.starts_with("https://")
        {
            return Err("Ollama URL must start with 'http://' or 'https://'".to_string());
        }

        // Validate temperature range
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err("Temperature must be between 0.0 and 1.0".to_string());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        // Validate timeout if provided
        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        // Validate local directory if provided
        if let Some(ref local_path) = self.local {
            if !local_path.exists() {
                return Err(format!(
                    "Local directory does not exist: {}",
                    local_path.display()
                ));
            }
            if !local_path.is_dir() {
                return Err(format!(
                    "Local path is not a directory: {}",
                    local_path.display()
                ));
            }
        }

        // Validate tree file if provided
        if let Some(ref tree_path) = self.from_tree {
            if !tree_path.is_file() {
                return Err(format!("Tree file does not exist: {}", tree_path.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            repo: Some("https://github.com/test/repo".to_string()),
            local: None,
            from_tree: None,
            model: "mistral:latest".to_string(),
            ollama_url: "http://localhost:11434".to_string(),
            output: PathBuf::from("test.md"),
            format: OutputFormat::Markdown,
            save_tree: None,
            config: None,
            branch: None,
            exclude: None,
            timeout: None,
            temperature: 0.1,
            verbose: false,
            quiet: false,
            dry_run: false,
            init_config: false,
        }
    }

    #[test]
    fn test_validation_invalid_url() {
        let mut args = make_args();
        args.repo = Some("invalid-url".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_temperature() {
        let mut args = make_args();
        args.temperature = 1.5;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_timeout() {
        let mut args = make_args();
        args.timeout = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
