//! In-memory wiki used by unit tests

use crate::wiki::api::{
    PagePayload, QueryResult, Redirect, SectionHeading, TitleMapping, WikiApi,
};
use crate::{ResolveError, ResolveResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

struct FakePage {
    id: i64,
    lead: String,
    sections: Vec<(u32, String, String)>,
}

impl FakePage {
    fn content(&self, section: Option<u32>) -> ResolveResult<String> {
        match section {
            None => {
                let mut full = self.lead.clone();
                for (_, heading, body) in &self.sections {
                    full.push_str(&format!("\n== {} ==\n{}", heading, body));
                }
                Ok(full)
            }
            Some(0) => Ok(self.lead.clone()),
            Some(index) => self
                .sections
                .iter()
                .find(|(i, _, _)| *i == index)
                .map(|(_, _, body)| body.clone())
                .ok_or_else(|| ResolveError::Api {
                    code: "nosuchsection".to_string(),
                    info: format!("There is no section {}.", index),
                }),
        }
    }
}

/// A wiki that answers from tables filled in by the test
#[derive(Default)]
pub(crate) struct FakeWiki {
    pages: HashMap<String, FakePage>,
    normalized: HashMap<String, String>,
    redirects: HashMap<String, (String, Option<String>)>,
    delays: HashMap<String, Duration>,
    failing: bool,
    calls: Mutex<Vec<(Vec<String>, Option<u32>)>>,
}

impl FakeWiki {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn page(mut self, id: i64, title: &str, lead: &str) -> Self {
        self.pages.insert(
            title.to_string(),
            FakePage {
                id,
                lead: lead.to_string(),
                sections: Vec::new(),
            },
        );
        self
    }

    pub(crate) fn section(mut self, title: &str, index: u32, heading: &str, body: &str) -> Self {
        if let Some(page) = self.pages.get_mut(title) {
            page.sections
                .push((index, heading.to_string(), body.to_string()));
        }
        self
    }

    pub(crate) fn normalize(mut self, from: &str, to: &str) -> Self {
        self.normalized.insert(from.to_string(), to.to_string());
        self
    }

    pub(crate) fn redirect(mut self, from: &str, to: &str, fragment: Option<&str>) -> Self {
        self.redirects.insert(
            from.to_string(),
            (to.to_string(), fragment.map(str::to_string)),
        );
        self
    }

    /// Delays every request that contains `title`
    pub(crate) fn delay(mut self, title: &str, delay: Duration) -> Self {
        self.delays.insert(title.to_string(), delay);
        self
    }

    pub(crate) fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Every `fetch` call made so far
    pub(crate) fn calls(&self) -> Vec<(Vec<String>, Option<u32>)> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn failure() -> ResolveError {
        ResolveError::Api {
            code: "internal_api_error".to_string(),
            info: "backend unavailable".to_string(),
        }
    }
}

#[async_trait]
impl WikiApi for FakeWiki {
    async fn fetch(&self, titles: &[String], section: Option<u32>) -> ResolveResult<QueryResult> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((titles.to_vec(), section));

        if self.failing {
            return Err(Self::failure());
        }

        let delay = titles.iter().filter_map(|t| self.delays.get(t)).max().copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut result = QueryResult::default();
        let mut next_missing = -1;
        for search_title in titles {
            let mut title = search_title.clone();
            if let Some(to) = self.normalized.get(&title) {
                result.normalized.push(TitleMapping {
                    from: title.clone(),
                    to: to.clone(),
                });
                title = to.clone();
            }
            if let Some((to, fragment)) = self.redirects.get(&title) {
                result.redirects.push(Redirect {
                    from: title.clone(),
                    to: to.clone(),
                    to_fragment: fragment.clone(),
                });
                title = to.clone();
            }
            if result.pages.iter().any(|p| p.title == title) {
                continue;
            }

            let payload = match self.pages.get(&title) {
                Some(page) => PagePayload {
                    page_id: page.id,
                    title,
                    missing: false,
                    content: Some(page.content(section)?),
                },
                None => {
                    next_missing -= 1;
                    PagePayload {
                        page_id: next_missing + 1,
                        title,
                        missing: true,
                        content: None,
                    }
                }
            };
            result.pages.push(payload);
        }

        Ok(result)
    }

    async fn sections(&self, title: &str) -> ResolveResult<Vec<SectionHeading>> {
        if self.failing {
            return Err(Self::failure());
        }

        Ok(self
            .pages
            .get(title)
            .map(|page| {
                page.sections
                    .iter()
                    .map(|(index, heading, _)| SectionHeading {
                        index: *index,
                        heading: heading.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}
