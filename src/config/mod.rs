//! Configuration module for DisamWiki
//!
//! Configuration is an immutable value built once at startup: an optional TOML file
//! layered under command-line overrides, validated before the crawl starts.
//!
//! # Example
//!
//! ```no_run
//! use disamwiki::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("disamwiki.toml")).unwrap();
//! println!("Crawler will descend {} levels", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{
    ApiConfig, Config, CrawlerConfig, OutputConfig, UserAgentConfig, DEFAULT_ENDPOINT,
};

pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
