//! Wiki backend access and title resolution
//!
//! This module contains:
//! - The [`WikiApi`] trait and the payload types it returns
//! - [`HttpWikiApi`], the MediaWiki Action API client
//! - [`Resolver`], which turns requested titles into [`ResolutionRecord`]s

mod api;
mod client;
mod resolver;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{
    PagePayload, QueryResult, Redirect, SectionHeading, TitleMapping, WikiApi, MISSING_PAGE_ID,
};
pub use client::{build_http_client, HttpWikiApi};
pub use resolver::{ResolutionRecord, Resolver};
