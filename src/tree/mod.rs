//! In-memory page tree
//!
//! This module defines the crawl tree model:
//! - [`Page`]: one fetched (or missing) page with its link-name grouped children
//! - [`PageTree`]: the arena owning every page, addressed by [`PageId`]
//! - [`SharedTree`]: the arena behind a mutex for the worker pool

mod arena;
mod page;

pub use arena::{PageTree, SharedTree, HIERARCHY_SEPARATOR};
pub use page::{LinkGroup, Page, PageId};
