use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for a crawl run
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub auth: Option<AuthConfig>,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Switches the configuration into test mode
    ///
    /// Caps the number of visited links at `max_links` and moves every output
    /// directory under `test_results/`.
    pub fn into_test_mode(mut self, max_links: usize) -> Self {
        self.crawler.max_links = Some(max_links);
        self.output.root = PathBuf::from("test_results").join(&self.output.root);
        self
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Base URL every section path is resolved against
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// File listing the initial section paths, one per line
    #[serde(rename = "sections-file")]
    pub sections_file: PathBuf,

    /// Number of concurrent worker tasks
    #[serde(rename = "max-workers", default = "default_max_workers")]
    pub max_workers: usize,

    /// Stop scheduling new links once this many URLs have been visited
    #[serde(rename = "max-links", default)]
    pub max_links: Option<usize>,

    /// How long an idle worker waits on an empty queue before exiting (milliseconds)
    #[serde(rename = "idle-timeout-ms", default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,

    /// Only follow links on the base URL's host
    #[serde(rename = "same-host-only", default = "default_true")]
    pub same_host_only: bool,

    /// URL path extensions routed to the downloader instead of the page parser
    #[serde(rename = "document-extensions", default = "default_document_extensions")]
    pub document_extensions: Vec<String>,
}

impl CrawlerConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }
}

/// HTTP fetch configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Attempts per fetch, including the first one
    #[serde(default = "default_fetch_retries")]
    pub retries: u32,

    /// Delay before the second attempt; doubles on every further attempt (milliseconds)
    #[serde(rename = "base-delay-ms", default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            retries: default_fetch_retries(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

/// Login configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(rename = "login-url")]
    pub login_url: String,

    /// JSON file holding `{"user": ..., "password": ...}`
    #[serde(rename = "credentials-path")]
    pub credentials_path: PathBuf,

    #[serde(default = "default_auth_retries")]
    pub retries: u32,

    #[serde(rename = "base-delay-ms", default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

/// Output layout configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory every other output directory lives under
    #[serde(default = "default_output_root")]
    pub root: PathBuf,

    /// Downloaded documents, named `{section}-{index}.{ext}`
    #[serde(rename = "documents-dir", default = "default_documents_dir")]
    pub documents_dir: PathBuf,

    /// Per-section landing page text, named `{section}.txt`
    #[serde(rename = "texts-dir", default = "default_texts_dir")]
    pub texts_dir: PathBuf,

    /// Raw HTML of fetched pages; pages are not kept when unset
    #[serde(rename = "pages-dir", default)]
    pub pages_dir: Option<PathBuf>,
}

impl OutputConfig {
    pub fn documents_path(&self) -> PathBuf {
        self.root.join(&self.documents_dir)
    }

    pub fn texts_path(&self) -> PathBuf {
        self.root.join(&self.texts_dir)
    }

    pub fn pages_path(&self) -> Option<PathBuf> {
        self.pages_dir.as_ref().map(|dir| self.root.join(dir))
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: default_output_root(),
            documents_dir: default_documents_dir(),
            texts_dir: default_texts_dir(),
            pages_dir: None,
        }
    }
}

fn default_max_workers() -> usize {
    4
}

fn default_idle_timeout_ms() -> u64 {
    100
}

fn default_true() -> bool {
    true
}

pub(crate) fn default_document_extensions() -> Vec<String> {
    [
        "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "zip", "jpg", "jpeg", "png", "gif",
    ]
    .iter()
    .map(|ext| ext.to_string())
    .collect()
}

fn default_user_agent() -> String {
    format!("canton-crawler/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_fetch_retries() -> u32 {
    3
}

fn default_auth_retries() -> u32 {
    5
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_output_root() -> PathBuf {
    PathBuf::from("output")
}

fn default_documents_dir() -> PathBuf {
    PathBuf::from("documentos")
}

fn default_texts_dir() -> PathBuf {
    PathBuf::from("textos")
}
