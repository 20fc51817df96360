//! The wiki backend seam
//!
//! The resolver only ever talks to a [`WikiApi`]; the HTTP implementation lives in
//! `client.rs` and tests substitute in-memory wikis.

use crate::ResolveResult;
use async_trait::async_trait;

/// Page id reserved for pages the backend could not find
pub const MISSING_PAGE_ID: i64 = -1;

/// A `from -> to` title normalization reported by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleMapping {
    pub from: String,
    pub to: String,
}

/// A one-level redirect, optionally pointing at a section of the target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub from: String,
    pub to: String,
    pub to_fragment: Option<String>,
}

/// One page payload returned by a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagePayload {
    /// Page id; negative when the page does not exist
    pub page_id: i64,

    /// Title as the backend knows it
    pub title: String,

    /// The backend flagged this page as missing
    pub missing: bool,

    /// Raw wikitext of the requested revision/section
    pub content: Option<String>,
}

impl PagePayload {
    /// Returns true if the payload stands for a nonexistent page
    pub fn is_missing(&self) -> bool {
        self.missing || self.page_id < 0
    }
}

/// Everything a content query returns for a batch of titles
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryResult {
    pub normalized: Vec<TitleMapping>,
    pub redirects: Vec<Redirect>,
    pub pages: Vec<PagePayload>,
}

/// An entry of an article's section table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionHeading {
    /// Index usable as `rvsection`
    pub index: u32,

    /// Heading text as displayed
    pub heading: String,
}

/// Backend that answers title queries
///
/// Implementations must follow redirects one level and report normalizations,
/// redirects and page payloads separately so the resolver can map every requested
/// title back to its answer.
#[async_trait]
pub trait WikiApi: Send + Sync {
    /// Fetches content for `titles`, optionally limited to one section index
    async fn fetch(&self, titles: &[String], section: Option<u32>) -> ResolveResult<QueryResult>;

    /// Lists the section table of `title`; an unknown article yields an empty table
    async fn sections(&self, title: &str) -> ResolveResult<Vec<SectionHeading>>;
}
