//! Crawler module for disambiguation page expansion
//!
//! This module contains the core crawling logic, including:
//! - Work items, batching and the per-level link budget
//! - The fetch-and-expand worker pool
//! - The coordinator loop and its idle detection
//! - Progress reporting

mod coordinator;
mod progress;
mod work;
mod worker;

pub use coordinator::Coordinator;
pub use progress::Progress;
pub use work::{
    chunk_requests, disambiguation_title, LinkBudget, LinkRequest, TitleSpec, WorkItem,
};
pub use worker::{process_item, CrawlEvent, Outstanding, WorkerPool};

use crate::config::Config;
use crate::tree::PageTree;
use crate::wiki::{Resolver, WikiApi};
use crate::DisamError;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Result of a crawl that did not fail
#[derive(Debug)]
pub enum CrawlOutcome {
    /// The disambiguation page resolved; `tree` is rooted at it
    Completed {
        tree: PageTree,
        started: DateTime<Utc>,
        finished: DateTime<Utc>,
    },
    /// The disambiguation page for `term` does not exist
    NotFound { term: String },
}

impl CrawlOutcome {
    pub fn tree(&self) -> Option<&PageTree> {
        match self {
            CrawlOutcome::Completed { tree, .. } => Some(tree),
            CrawlOutcome::NotFound { .. } => None,
        }
    }
}

/// Runs a complete crawl for `term`
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Spawn the worker pool
/// 2. Seed it with `"<term> (disambiguation)"`
/// 3. Expand pages level by level within the configured budget
/// 4. Return the finished tree once every worker is idle
///
/// # Errors
///
/// Returns the first fatal worker error (a failed API call or a `#section`
/// request without a parent).
///
/// # Example
///
/// ```no_run
/// use disamwiki::config::Config;
/// use disamwiki::crawler::{crawl, CrawlOutcome};
/// use disamwiki::HttpWikiApi;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config::default();
/// let api = Arc::new(HttpWikiApi::new(&config)?);
/// if let CrawlOutcome::Completed { tree, .. } = crawl(&config, api, "Mercury").await? {
///     println!("{} pages", tree.len());
/// }
/// # Ok(())
/// # }
/// ```
pub async fn crawl(
    config: &Config,
    api: Arc<dyn WikiApi>,
    term: &str,
) -> Result<CrawlOutcome, DisamError> {
    let started = Utc::now();
    let seed = disambiguation_title(term);
    tracing::info!(
        "Starting crawl of '{}' at {} (depth {}, {} workers)",
        seed,
        started.format("%Y-%m-%d %H:%M:%S UTC"),
        config.crawler.max_depth,
        config.crawler.workers
    );

    let coordinator = Coordinator::new(&config.crawler, Resolver::new(api));
    let tree = coordinator.run(&seed).await?;

    let found = tree
        .root()
        .map(|root| !tree.get(root).is_missing())
        .unwrap_or(false);
    if !found {
        tracing::warn!("No disambiguation page was found for {}", term);
        return Ok(CrawlOutcome::NotFound {
            term: term.to_string(),
        });
    }

    let finished = Utc::now();
    tracing::info!(
        "Crawl completed: {} pages in {}s",
        tree.len(),
        (finished - started).num_seconds()
    );
    Ok(CrawlOutcome::Completed {
        tree,
        started,
        finished,
    })
}
