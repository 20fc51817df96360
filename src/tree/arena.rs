//! Page arena
//!
//! Pages live in a flat vector and refer to each other by [`PageId`]. Children
//! anchor pages top-down; the parent index is only a lookup aid.

use crate::markup::Link;
use crate::tree::page::{Page, PageId};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Separator used by [`PageTree::hierarchy_path`]
pub const HIERARCHY_SEPARATOR: &str = " --> ";

/// Owns every page of a crawl
#[derive(Debug, Clone, Default)]
pub struct PageTree {
    pages: Vec<Page>,
    root: Option<PageId>,
}

impl PageTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a page and returns its id
    ///
    /// The first page inserted without a parent becomes the root.
    pub fn insert(&mut self, page: Page) -> PageId {
        let id = PageId(self.pages.len());
        if page.parent.is_none() && self.root.is_none() {
            self.root = Some(id);
        }
        self.pages.push(page);
        id
    }

    /// Lists `child` under `parent` once per link name, in order, and points the
    /// child back at `parent`
    pub fn attach(&mut self, parent: PageId, child: PageId, link_names: &[String]) {
        self.pages[child.0].parent = Some(parent);
        let parent = &mut self.pages[parent.0];
        for name in link_names {
            parent.add_child(name, child);
        }
    }

    /// Stores the extraction result of a page
    pub fn set_parsed(&mut self, id: PageId, plain_text: String, links: Vec<Link>) {
        let page = &mut self.pages[id.0];
        page.plain_text = Some(plain_text);
        page.links = Some(links);
    }

    pub fn get(&self, id: PageId) -> &Page {
        &self.pages[id.0]
    }

    pub fn root(&self) -> Option<PageId> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// All page ids in creation order
    pub fn ids(&self) -> impl Iterator<Item = PageId> + '_ {
        (0..self.pages.len()).map(PageId)
    }

    /// Number of parent hops from `id` to the root
    pub fn level(&self, id: PageId) -> usize {
        self.ancestors(id).count()
    }

    /// Parents of `id`, nearest first
    pub fn ancestors(&self, id: PageId) -> impl Iterator<Item = PageId> + '_ {
        std::iter::successors(self.get(id).parent, move |p| self.get(*p).parent)
    }

    /// Root-to-page titles joined by ` --> `
    ///
    /// The page itself falls back to its search title when unresolved; ancestors
    /// always have a resolved title.
    pub fn hierarchy_path(&self, id: PageId) -> String {
        let mut titles = vec![self.get(id).display_title()];
        titles.extend(self.ancestors(id).map(|p| self.get(p).display_title()));
        titles.reverse();
        titles.join(HIERARCHY_SEPARATOR)
    }
}

/// A [`PageTree`] shared between the workers and the coordinator
///
/// Locks are held only for short insert/attach/update sections, never across an
/// await point.
#[derive(Debug, Clone, Default)]
pub struct SharedTree {
    inner: Arc<Mutex<PageTree>>,
}

impl SharedTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock(&self) -> MutexGuard<'_, PageTree> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Moves the tree out, leaving an empty one behind
    pub fn take(&self) -> PageTree {
        std::mem::take(&mut *self.lock())
    }
}
