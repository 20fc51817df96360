//! Page definitions for the crawl tree
//!
//! A page is created as soon as its resolution record is known, parsed once by the
//! coordinator, and attached under exactly one parent.

use crate::markup::Link;
use crate::wiki::ResolutionRecord;
use std::fmt;

/// Index of a page inside a [`PageTree`](crate::tree::PageTree)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(pub(crate) usize);

impl PageId {
    /// Position of the page in creation order
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Children reached through one link name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkGroup {
    pub link_name: String,
    pub pages: Vec<PageId>,
}

/// A node in the crawl tree
#[derive(Debug, Clone)]
pub struct Page {
    /// Wiki page id; negative when the page does not exist
    pub wiki_id: i64,

    /// Title as requested, before normalization and redirects
    pub search_title: String,

    /// Canonical title, `None` for missing pages
    pub title: Option<String>,

    /// Unparsed wikitext, `None` for missing pages
    pub raw_content: Option<String>,

    /// Extracted text, set once parsed
    pub plain_text: Option<String>,

    /// Outbound links in document order, set once parsed
    pub links: Option<Vec<Link>>,

    /// The page that linked here; `None` only for the crawl root
    pub parent: Option<PageId>,

    /// Children grouped by link name, in the order the names were first used
    pub children: Vec<LinkGroup>,
}

impl Page {
    /// Builds an unattached page from a resolution record
    pub fn from_record(record: ResolutionRecord) -> Self {
        let missing = record.is_missing();
        Self {
            wiki_id: record.page_id,
            search_title: record.search_title,
            title: (!missing).then_some(record.title),
            raw_content: if missing { None } else { record.content },
            plain_text: None,
            links: None,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn is_missing(&self) -> bool {
        self.wiki_id < 0
    }

    pub fn is_parsed(&self) -> bool {
        self.plain_text.is_some()
    }

    /// Resolved title, falling back to the search title for missing pages
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.search_title)
    }

    /// Children listed under `link_name`
    pub fn children_named(&self, link_name: &str) -> Option<&[PageId]> {
        self.children
            .iter()
            .find(|group| group.link_name == link_name)
            .map(|group| group.pages.as_slice())
    }

    /// First `limit` outbound links (all if `None`); empty until parsed
    pub fn links(&self, limit: Option<usize>) -> &[Link] {
        let links = self.links.as_deref().unwrap_or_default();
        match limit {
            Some(limit) => &links[..limit.min(links.len())],
            None => links,
        }
    }

    pub(crate) fn add_child(&mut self, link_name: &str, child: PageId) {
        match self
            .children
            .iter_mut()
            .find(|group| group.link_name == link_name)
        {
            Some(group) => group.pages.push(child),
            None => self.children.push(LinkGroup {
                link_name: link_name.to_string(),
                pages: vec![child],
            }),
        }
    }
}
