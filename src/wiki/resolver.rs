//! Title resolution
//!
//! Maps requested titles to canonical titles, page ids and raw content. The backend
//! reports normalizations and redirects separately from the page payloads, so every
//! requested title is pushed through `normalize -> redirect` and matched back to the
//! payload carrying the resulting title. Redirects that land on a section are chased
//! with a second request for that section's index.

use crate::wiki::api::{QueryResult, WikiApi, MISSING_PAGE_ID};
use crate::ResolveResult;
use std::collections::HashMap;
use std::sync::Arc;

/// The answer for one requested title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionRecord {
    /// Title as requested, before normalization and redirects
    pub search_title: String,

    /// Title after normalization and redirects (`Article#Section` for fragments)
    pub title: String,

    /// Resolved page id, [`MISSING_PAGE_ID`] when the page does not exist
    pub page_id: i64,

    /// Raw wikitext, `None` when missing
    pub content: Option<String>,

    /// Section the redirect pointed into, if any
    pub to_fragment: Option<String>,
}

impl ResolutionRecord {
    /// Creates a record for a title that resolved to nothing
    pub fn missing(search_title: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            search_title: search_title.into(),
            title: title.into(),
            page_id: MISSING_PAGE_ID,
            content: None,
            to_fragment: None,
        }
    }

    /// Returns true if the backend had no page for this title
    pub fn is_missing(&self) -> bool {
        self.page_id < 0
    }
}

/// Resolves titles against a [`WikiApi`]
#[derive(Clone)]
pub struct Resolver {
    api: Arc<dyn WikiApi>,
}

impl Resolver {
    pub fn new(api: Arc<dyn WikiApi>) -> Self {
        Self { api }
    }

    /// Resolves `titles`, optionally restricted to one section index
    ///
    /// Returns exactly one record per input title, in input order. Titles that
    /// redirect into a section are re-resolved against that section; if the section
    /// does not exist the record is missing and titled `Article#Fragment`.
    pub async fn resolve(
        &self,
        titles: &[String],
        section: Option<u32>,
    ) -> ResolveResult<Vec<ResolutionRecord>> {
        let mut records = self.lookup(titles, section).await?;

        for record in records.iter_mut() {
            let Some(fragment) = record.to_fragment.take() else {
                continue;
            };
            tracing::debug!(
                "'{}' redirects to section '{}#{}'",
                record.search_title,
                record.title,
                fragment
            );
            let search_title = std::mem::take(&mut record.search_title);
            let mut resolved = self.resolve_fragment(&record.title, &fragment).await?;
            resolved.search_title = search_title;
            *record = resolved;
        }

        Ok(records)
    }

    /// Resolves one section of an article
    ///
    /// The record's title and search title are both `article#fragment`. A heading
    /// that does not exist in the article yields a missing record rather than an
    /// error.
    pub async fn resolve_fragment(
        &self,
        article: &str,
        fragment: &str,
    ) -> ResolveResult<ResolutionRecord> {
        let composite = format!("{}#{}", article, fragment);

        let sections = self.api.sections(article).await?;
        let Some(index) = sections
            .iter()
            .find(|s| s.heading == fragment)
            .map(|s| s.index)
        else {
            tracing::debug!("No section '{}' in '{}'", fragment, article);
            return Ok(ResolutionRecord::missing(composite.clone(), composite));
        };

        let mut records = self.lookup(&[article.to_string()], Some(index)).await?;
        let mut record = records
            .pop()
            .unwrap_or_else(|| ResolutionRecord::missing(article, article));
        record.search_title = composite.clone();
        record.title = composite;
        record.to_fragment = None;
        Ok(record)
    }

    /// One backend round trip: normalize, redirect and match payloads
    async fn lookup(
        &self,
        titles: &[String],
        section: Option<u32>,
    ) -> ResolveResult<Vec<ResolutionRecord>> {
        if titles.is_empty() {
            return Ok(Vec::new());
        }

        let result = self.api.fetch(titles, section).await?;
        Ok(match_records(titles, result))
    }
}

/// Maps each search title through the normalization and redirect tables and
/// attaches the payload whose title equals the result
fn match_records(titles: &[String], result: QueryResult) -> Vec<ResolutionRecord> {
    let normalized: HashMap<&str, &str> = result
        .normalized
        .iter()
        .map(|n| (n.from.as_str(), n.to.as_str()))
        .collect();
    let redirects: HashMap<&str, (&str, Option<&String>)> = result
        .redirects
        .iter()
        .map(|r| (r.from.as_str(), (r.to.as_str(), r.to_fragment.as_ref())))
        .collect();
    let payloads: HashMap<&str, _> = result
        .pages
        .iter()
        .map(|p| (p.title.as_str(), p))
        .collect();

    titles
        .iter()
        .map(|search_title| {
            let mut title = normalized
                .get(search_title.as_str())
                .copied()
                .unwrap_or(search_title.as_str());
            let mut to_fragment = None;
            if let Some((target, fragment)) = redirects.get(title) {
                title = *target;
                to_fragment = fragment.cloned();
            }

            match payloads.get(title) {
                Some(payload) if !payload.is_missing() => ResolutionRecord {
                    search_title: search_title.clone(),
                    title: title.to_string(),
                    page_id: payload.page_id,
                    content: Some(payload.content.clone().unwrap_or_default()),
                    to_fragment,
                },
                _ => ResolutionRecord::missing(search_title.clone(), title),
            }
        })
        .collect()
}
