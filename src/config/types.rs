use serde::Deserialize;
use std::path::PathBuf;

/// Default MediaWiki Action API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://en.wikipedia.org/w/api.php";

/// Main configuration structure for DisamWiki
///
/// Every section is optional in the TOML file; missing keys fall back to the
/// defaults used by the command line.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub crawler: CrawlerConfig,
    pub output: OutputConfig,
}

/// Wiki API connection settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Full URL of the `api.php` endpoint
    pub endpoint: String,

    /// Whole-request timeout (seconds)
    #[serde(rename = "request-timeout")]
    pub request_timeout: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout")]
    pub connect_timeout: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout: 30,
            connect_timeout: 10,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "DisambigWiki".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://www.utk.edu".to_string(),
            contact_email: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the header value: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        match &self.contact_email {
            Some(email) => format!(
                "{}/{} (+{}; {})",
                self.crawler_name, self.crawler_version, self.contact_url, email
            ),
            None => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, self.contact_url
            ),
        }
    }
}

/// Crawl breadth and concurrency settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Number of levels to descend below the disambiguation page
    #[serde(rename = "max-depth")]
    pub max_depth: usize,

    /// Links followed from the disambiguation page (`None` = all)
    #[serde(rename = "disambig-links")]
    pub disambig_links: Option<usize>,

    /// Links followed from every other page
    #[serde(rename = "page-links")]
    pub page_links: usize,

    /// Number of concurrent fetch workers
    pub workers: usize,

    /// Titles per API request
    #[serde(rename = "batch-size")]
    pub batch_size: usize,

    /// Print the in-place progress line to stdout
    pub progress: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 2,
            disambig_links: None,
            page_links: 5,
            workers: 15,
            batch_size: 5,
            progress: true,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the page hierarchy is written under
    pub directory: PathBuf,

    /// Replace files that already exist instead of aborting
    pub overwrite: bool,

    /// Optional path for a Graphviz rendering of the page tree
    #[serde(rename = "graph-path")]
    pub graph_path: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            overwrite: false,
            graph_path: None,
        }
    }
}
