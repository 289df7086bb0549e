//! Fixed prompt templates and fallback sentinels.
//!
//! Templates are not configurable at runtime. Each takes exactly one
//! parameter: the fragment's code, or the newline-joined child summary
//! lines.

/// Prompt for a single code fragment.
pub const FRAGMENT_PROMPT: &str = r#"You are a code-summarizer now, summarize this code snippet in one to three lines such that:
1) logic of the summary and code remains the same.
2) try to minimize the number of characters in summary.
3) make sure that no crucial information is lost
4) summary should be good enough such that any other LLM can regenerate the same code snippet from the summary.
5) Mention all the variables, functions, input-output used so that the summary is sufficient to regenerate the exact code.

CODE:
{code}
"#;

/// Prompt for a file, built from its fragment summaries.
pub const FILE_PROMPT: &str = r#"You are a code-summarizer now, summarize this file based on its snippets summaries in three to five lines such that:
1) the summary explains the overall purpose and functionality of the file.
2) highlight the key components, functions, or classes in the file.
3) mention how these components interact with each other.
4) the summary should provide enough context for someone to understand what this file does without reading the actual code.

SNIPPETS SUMMARIES:
{summaries}
"#;

/// Prompt for a directory, built from its child summaries.
pub const DIRECTORY_PROMPT: &str = r#"You are a code-summarizer now, summarize this directory based on its contained files and subdirectories in five to seven lines such that:
1) explain the overall purpose of this directory in the project.
2) highlight the key files and their roles.
3) explain how the files in this directory work together.
4) mention any important dependencies or relationships with other parts of the project if evident.
5) provide a high-level architectural view of this part of the project.

CONTAINED FILES AND DIRECTORIES SUMMARIES:
{summaries}
"#;

/// Substituted for a summary when a backend call fails.
pub const GENERATION_FAILED: &str =
    "Summary generation failed. Please ensure Ollama is running and the model is available.";

/// Assigned to files with absent or binary content. No backend call is made.
pub const FILE_NO_CONTENT: &str = "File with no code content or binary file.";

/// Assigned to directories whose children produced no summaries. No backend
/// call is made.
pub const DIRECTORY_EMPTY: &str = "Empty directory or directory with no summarizable content.";

/// Builds the fragment-level prompt for one slice of code.
pub fn fragment_prompt(code: &str) -> String {
    FRAGMENT_PROMPT.replace("{code}", code)
}

/// Builds the file-level prompt from "`id` (`kind`): `summary`" lines.
pub fn file_prompt(summaries: &str) -> String {
    FILE_PROMPT.replace("{summaries}", summaries)
}

/// Builds the directory-level prompt from "`name` (File|Directory): `summary`" lines.
pub fn directory_prompt(summaries: &str) -> String {
    DIRECTORY_PROMPT.replace("{summaries}", summaries)
}
