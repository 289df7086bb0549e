//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.yosummarizer.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Model settings.
    #[serde(default)]
    pub model: ModelConfig,

    /// Extractor settings.
    #[serde(default)]
    pub extractor: ExtractorConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Path the summarized tree JSON is saved to, when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_tree: Option<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
            save_tree: None,
        }
    }
}

fn default_output() -> String {
    "yosummary_report.md".to_string()
}

/// LLM model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Default model name.
    #[serde(default = "default_model")]
    pub name: String,

    /// Ollama API URL.
    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,

    /// Temperature for generation.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds for one backend call.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model(),
            ollama_url: default_ollama_url(),
            temperature: default_temperature(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_model() -> String {
    "mistral:latest".to_string()
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_timeout() -> u64 {
    300 // one summary call per fragment; five minutes is generous
}

/// Tree extractor settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Directory and file names to skip entirely.
    #[serde(default = "default_excludes")]
    pub excludes: Vec<String>,

    /// Extensions treated as binary without reading the file.
    #[serde(default = "default_binary_extensions")]
    pub binary_extensions: Vec<String>,

    /// Maximum file size in bytes; larger files get the binary placeholder.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            excludes: default_excludes(),
            binary_extensions: default_binary_extensions(),
            max_file_size: default_max_file_size(),
        }
    }
}

fn default_excludes() -> Vec<String> {
    vec![
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
    .collect()
}

fn default_binary_extensions() -> Vec<String> {
    vec![
        "jpg", "jpeg", "png", "gif", "svg", "ico", "pdf", "zip", "tar", "gz", "rar", "exe",
        "dll", "so", "pyc", "class", "woff", "woff2",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_max_file_size() -> u64 {
    1024 * 1024 // 1MB
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but
    /// can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".yosummarizer.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Try to load configuration from a repo directory.
    pub fn load_from_repo(repo_path: &Path) -> Result<Option<Self>> {
        let config_path = repo_path.join(".yosummarizer.toml");

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings. Optional
    /// arguments only override when explicitly provided.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        // Model settings - always override since they have defaults in CLI
        self.model.name = args.model.clone();
        self.model.ollama_url = args.ollama_url.clone();
        self.model.temperature = args.temperature;

        // Timeout - only override if explicitly provided via CLI
        if let Some(timeout) = args.timeout {
            self.model.timeout_seconds = timeout;
        }

        // Extractor settings - only override if provided
        if let Some(ref excludes) = args.exclude {
            self.extractor.excludes = excludes.clone();
        }

        // Tree persistence - only override if provided
        if let Some(ref save_tree) = args.save_tree {
            self.general.save_tree = Some(save_tree.display().to_string());
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.model.name, "mistral:latest");
        assert_eq!(config.model.timeout_seconds, 300);
        assert!(config
            .extractor
            .excludes
            .contains(&"node_modules".to_string()));
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output = "custom_report.md"
verbose = true

[model]
name = "codellama:13b"
temperature = 0.2

[extractor]
excludes = ["vendor", "tmp"]
max_file_size = 2048
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output, "custom_report.md");
        assert!(config.general.verbose);
        assert_eq!(config.model.name, "codellama:13b");
        assert_eq!(config.model.temperature, 0.2);
        assert_eq!(config.extractor.excludes, vec!["vendor", "tmp"]);
        assert_eq!(config.extractor.max_file_size, 2048);
        // Unset sections keep their defaults.
        assert_eq!(config.model.ollama_url, "http://localhost:11434");
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[model]"));
        assert!(toml_str.contains("[extractor]"));
    }
}
