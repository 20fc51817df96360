//! Work items and crawl policy
//!
//! A [`WorkItem`] is one batch of link requests sharing a parent. Requests name
//! their target with a [`TitleSpec`]; batches are capped so one item maps to one
//! API call for its plain titles.

use crate::config::CrawlerConfig;
use crate::markup::Link;
use crate::tree::PageId;

/// How a requested title addresses its page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleSpec<'a> {
    /// `Article`
    Plain(&'a str),
    /// `Article#Section`
    Fragment { article: &'a str, section: &'a str },
    /// `#Section` of the requesting page
    LocalFragment(&'a str),
}

impl<'a> TitleSpec<'a> {
    pub fn parse(title: &'a str) -> Self {
        match title.split_once('#') {
            None => TitleSpec::Plain(title),
            Some(("", section)) => TitleSpec::LocalFragment(section),
            Some((article, section)) => TitleSpec::Fragment { article, section },
        }
    }
}

/// One requested link: the display text it was reached by and its target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRequest {
    pub link_name: String,
    pub title: String,
}

impl LinkRequest {
    pub fn new(link_name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            link_name: link_name.into(),
            title: title.into(),
        }
    }
}

impl From<&Link> for LinkRequest {
    fn from(link: &Link) -> Self {
        Self::new(link.name.clone(), link.target.clone())
    }
}

/// A batch of requests sharing one parent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// `None` only for the seed request
    pub parent: Option<PageId>,
    pub requests: Vec<LinkRequest>,
}

impl WorkItem {
    /// The seed item: the disambiguation page with no parent
    pub fn seed(title: impl Into<String>) -> Self {
        Self {
            parent: None,
            requests: vec![LinkRequest::new(String::new(), title)],
        }
    }
}

/// Splits `requests` into work items of at most `batch_size` requests
pub fn chunk_requests(
    parent: Option<PageId>,
    requests: Vec<LinkRequest>,
    batch_size: usize,
) -> Vec<WorkItem> {
    let batch_size = batch_size.max(1);
    requests
        .chunks(batch_size)
        .map(|chunk| WorkItem {
            parent,
            requests: chunk.to_vec(),
        })
        .collect()
}

/// Title of the disambiguation page for `term`
pub fn disambiguation_title(term: &str) -> String {
    format!("{} (disambiguation)", term)
}

/// Depth and per-level fan-out limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkBudget {
    /// Pages at this level or deeper are never expanded
    pub max_depth: usize,

    /// Links followed from the root (`None` = all)
    pub seed_links: Option<usize>,

    /// Links followed from every other page
    pub page_links: usize,
}

impl LinkBudget {
    /// Number of links to follow from a page at `level`
    ///
    /// `Some(0)` means "expand nothing"; `None` means "follow every link".
    pub fn links_for(&self, level: usize) -> Option<usize> {
        if level >= self.max_depth {
            Some(0)
        } else if level == 0 {
            self.seed_links
        } else {
            Some(self.page_links)
        }
    }

    pub fn expands(&self, level: usize) -> bool {
        level < self.max_depth
    }
}

impl From<&CrawlerConfig> for LinkBudget {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            seed_links: config.disambig_links,
            page_links: config.page_links,
        }
    }
}
