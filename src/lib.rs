//! DisamWiki: a Wikipedia disambiguation crawler
//!
//! This crate crawls a Wikipedia disambiguation page breadth-first to a bounded depth,
//! following the links found on each page, resolving normalizations, redirects and
//! section fragments, and writes the resulting page hierarchy to a nested directory of
//! plaintext files.

pub mod config;
pub mod crawler;
pub mod markup;
pub mod output;
pub mod tree;
pub mod wiki;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for DisamWiki operations
#[derive(Debug, Error)]
pub enum DisamError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Resolution failure: {0}")]
    Resolve(#[from] ResolveError),

    /// A `#Section` title was requested without a parent page to anchor it
    #[error("Invalid fragment request '{title}': a #section title needs a parent page")]
    InvalidFragmentRequest { title: String },

    #[error("File exists: {}", path.display())]
    FileCollision { path: PathBuf },

    #[error("Worker pool error: {0}")]
    WorkerPool(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised while talking to the wiki API or interpreting its answers
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Unexpected HTTP status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("API error {code}: {info}")]
    Api { code: String, info: String },

    #[error("Malformed API payload: {0}")]
    Malformed(String),
}

/// Result type alias for DisamWiki operations
pub type Result<T> = std::result::Result<T, DisamError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for wiki resolution operations
pub type ResolveResult<T> = std::result::Result<T, ResolveError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, CrawlOutcome};
pub use tree::{Page, PageId, PageTree};
pub use wiki::{HttpWikiApi, Resolver, WikiApi};
