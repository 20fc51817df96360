//! HTTP client for the MediaWiki Action API
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the configured user agent and timeouts
//! - `action=query` content requests with redirect resolution
//! - `action=parse` section-table requests
//! - Decoding `formatversion=1` JSON payloads into [`QueryResult`]s
//!
//! No retries are attempted: any transport, status or payload problem is returned
//! as a [`ResolveError`] and ends the crawl.

use crate::config::{ApiConfig, Config, UserAgentConfig};
use crate::wiki::api::{
    PagePayload, QueryResult, Redirect, SectionHeading, TitleMapping, WikiApi,
};
use crate::{ConfigError, ResolveError, ResolveResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::IgnoredAny;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

/// API error codes that mean "no such page" for a parse request
const MISSING_TITLE_CODES: &[&str] = &["missingtitle", "invalidtitle"];

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use disamwiki::config::Config;
/// use disamwiki::wiki::build_http_client;
///
/// let config = Config::default();
/// let client = build_http_client(&config.api, &config.user_agent).unwrap();
/// ```
pub fn build_http_client(
    api: &ApiConfig,
    user_agent: &UserAgentConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_secs(api.request_timeout))
        .connect_timeout(Duration::from_secs(api.connect_timeout))
        .gzip(true)
        .build()
}

/// [`WikiApi`] over HTTP
#[derive(Debug, Clone)]
pub struct HttpWikiApi {
    client: Client,
    endpoint: Url,
}

impl HttpWikiApi {
    /// Creates a client for the endpoint and user agent in `config`
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let endpoint = Url::parse(&config.api.endpoint)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", config.api.endpoint, e)))?;
        let client = build_http_client(&config.api, &config.user_agent)
            .map_err(|e| ConfigError::Validation(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self { client, endpoint })
    }

    /// Wraps an existing client
    pub fn with_client(client: Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    /// Sends one GET request and returns the decoded JSON body
    ///
    /// An `error` object in the body is surfaced as [`ResolveError::Api`].
    async fn request_json(&self, params: &[(&str, String)]) -> ResolveResult<Value> {
        let url = self.endpoint.as_str().to_string();

        let response = self
            .client
            .get(self.endpoint.clone())
            .query(params)
            .query(&[("format", "json"), ("formatversion", "1")])
            .send()
            .await
            .map_err(|source| ResolveError::Http {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|source| ResolveError::Http { url, source })?;

        if let Some(error) = body.get("error") {
            let error: ApiErrorBody = serde_json::from_value(error.clone())
                .map_err(|e| ResolveError::Malformed(format!("error object: {}", e)))?;
            return Err(ResolveError::Api {
                code: error.code,
                info: error.info,
            });
        }

        Ok(body)
    }
}

#[async_trait]
impl WikiApi for HttpWikiApi {
    async fn fetch(&self, titles: &[String], section: Option<u32>) -> ResolveResult<QueryResult> {
        let mut params = vec![
            ("action", "query".to_string()),
            ("prop", "revisions".to_string()),
            ("rvprop", "content".to_string()),
            ("rvexpandtemplates", "1".to_string()),
            ("redirects", "1".to_string()),
            ("titles", titles.join("|")),
        ];
        if let Some(section) = section {
            params.push(("rvsection", section.to_string()));
        }

        tracing::debug!("Querying {} title(s), section {:?}", titles.len(), section);
        let body = self.request_json(&params).await?;
        decode_query(body)
    }

    async fn sections(&self, title: &str) -> ResolveResult<Vec<SectionHeading>> {
        let params = [
            ("action", "parse".to_string()),
            ("prop", "sections".to_string()),
            ("redirects", "1".to_string()),
            ("page", title.to_string()),
        ];

        let body = match self.request_json(&params).await {
            Ok(body) => body,
            Err(ResolveError::Api { code, .. }) if MISSING_TITLE_CODES.contains(&code.as_str()) => {
                tracing::debug!("No section table for '{}' ({})", title, code);
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        decode_sections(body)
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: String,
    #[serde(default)]
    info: String,
}

#[derive(Debug, Deserialize)]
struct QueryEnvelope {
    query: RawQuery,
}

#[derive(Debug, Deserialize)]
struct RawQuery {
    #[serde(default)]
    normalized: Vec<RawMapping>,
    #[serde(default)]
    redirects: Vec<RawRedirect>,
    #[serde(default)]
    pages: HashMap<String, RawPage>,
}

#[derive(Debug, Deserialize)]
struct RawMapping {
    from: String,
    to: String,
}

#[derive(Debug, Deserialize)]
struct RawRedirect {
    from: String,
    to: String,
    #[serde(default, rename = "tofragment")]
    to_fragment: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPage {
    title: String,
    #[serde(default)]
    missing: Option<IgnoredAny>,
    #[serde(default)]
    invalid: Option<IgnoredAny>,
    #[serde(default)]
    revisions: Vec<RawRevision>,
}

#[derive(Debug, Deserialize)]
struct RawRevision {
    #[serde(rename = "*")]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ParseEnvelope {
    parse: RawParse,
}

#[derive(Debug, Deserialize)]
struct RawParse {
    sections: Vec<RawSection>,
}

#[derive(Debug, Deserialize)]
struct RawSection {
    index: String,
    line: String,
}

/// Decodes an `action=query` response body
pub(crate) fn decode_query(body: Value) -> ResolveResult<QueryResult> {
    let envelope: QueryEnvelope = serde_json::from_value(body)
        .map_err(|e| ResolveError::Malformed(format!("query response: {}", e)))?;
    let raw = envelope.query;

    let mut pages = Vec::with_capacity(raw.pages.len());
    for (key, page) in raw.pages {
        let page_id: i64 = key
            .parse()
            .map_err(|_| ResolveError::Malformed(format!("page key '{}' is not an id", key)))?;
        let content = page.revisions.into_iter().next().and_then(|rev| rev.content);
        pages.push(PagePayload {
            page_id,
            title: page.title,
            missing: page.missing.is_some() || page.invalid.is_some(),
            content,
        });
    }
    // HashMap order is arbitrary; keep payloads deterministic
    pages.sort_by_key(|p| p.page_id);

    Ok(QueryResult {
        normalized: raw
            .normalized
            .into_iter()
            .map(|m| TitleMapping {
                from: m.from,
                to: m.to,
            })
            .collect(),
        redirects: raw
            .redirects
            .into_iter()
            .map(|r| Redirect {
                from: r.from,
                to: r.to,
                to_fragment: r.to_fragment.filter(|f| !f.is_empty()),
            })
            .collect(),
        pages,
    })
}

/// Decodes an `action=parse&prop=sections` response body
///
/// Sections transcluded from templates carry indices like `T-1`; they cannot be
/// requested through `rvsection` and are skipped.
pub(crate) fn decode_sections(body: Value) -> ResolveResult<Vec<SectionHeading>> {
    let envelope: ParseEnvelope = serde_json::from_value(body)
        .map_err(|e| ResolveError::Malformed(format!("parse response: {}", e)))?;

    Ok(envelope
        .parse
        .sections
        .into_iter()
        .filter_map(|s| {
            s.index.parse().ok().map(|index| SectionHeading {
                index,
                heading: s.line,
            })
        })
        .collect())
}
