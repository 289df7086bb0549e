//! Repository acquisition.
//!
//! This module handles cloning GitHub repositories into local directories
//! before extraction.

pub mod cloner;

pub use cloner::{clone_repository, parse_github_url, CloneOptions};
