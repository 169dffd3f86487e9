//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the worker pool that coordinates the crawl:
//! - Seeding the frontier from the sections file
//! - Spawning workers that fetch, store and extract links
//! - Routing documents to the content-addressed store
//! - Waiting until every scheduled URL has been processed

use crate::auth::login_from_config;
use crate::config::{load_sections, Config};
use crate::crawler::frontier::{EnqueueOutcome, Frontier, FrontierEntry};
use crate::crawler::parser::extract_links;
use crate::crawler::{Fetch, HttpFetcher};
use crate::extract::extract_plain_text;
use crate::output::{CrawlCounters, CrawlStatistics};
use crate::storage::{save_section_text, DocumentStore, StoreOutcome, StorageError, StoredDocument};
use crate::url::{is_document, path_extension, resolve_section, same_host};
use crate::CantonError;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinSet;
use url::Url;

/// Main crawler coordinator structure
///
/// Cloning is cheap; every worker task owns a clone sharing the same
/// frontier, stores and counters.
#[derive(Clone)]
pub struct Coordinator {
    config: Arc<Config>,
    base_url: Url,
    fetcher: Arc<dyn Fetch>,
    frontier: Arc<Frontier>,
    documents: Arc<DocumentStore>,
    pages: Option<Arc<DocumentStore>>,
    texts_dir: PathBuf,
    counters: Arc<CrawlCounters>,
}

/// Marks a popped entry complete when dropped, even if the worker panics
struct Completion<'a>(&'a Frontier);

impl Drop for Completion<'_> {
    fn drop(&mut self) {
        self.0.complete();
    }
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The validated crawl configuration
    /// * `fetcher` - Fetch capability used for pages and documents
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(CantonError)` - The base URL could not be parsed
    pub fn new(config: Config, fetcher: Arc<dyn Fetch>) -> Result<Self, CantonError> {
        let base_url = Url::parse(&config.crawler.base_url)?;
        let frontier = Frontier::new(config.crawler.max_links);
        let documents = DocumentStore::new(config.output.documents_path());
        let pages = config
            .output
            .pages_path()
            .map(|dir| Arc::new(DocumentStore::new(dir)));
        let texts_dir = config.output.texts_path();

        Ok(Self {
            config: Arc::new(config),
            base_url,
            fetcher,
            frontier: Arc::new(frontier),
            documents: Arc::new(documents),
            pages,
            texts_dir,
            counters: Arc::new(CrawlCounters::default()),
        })
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    /// Resolves each section against the base URL and seeds the frontier
    ///
    /// Returns the number of URLs actually pushed; sections resolving to an
    /// already seeded URL are skipped.
    pub fn seed(&self, sections: &[String]) -> Result<usize, CantonError> {
        let mut seeded = 0;
        for section in sections {
            let url = resolve_section(&self.base_url, section)?;
            if self.frontier.seed(url.as_str(), section) {
                seeded += 1;
            } else {
                tracing::debug!("Section {} resolves to an already seeded URL {}", section, url);
            }
        }
        Ok(seeded)
    }

    /// Runs the crawl until the frontier is drained
    ///
    /// Loads the sections file, seeds the frontier and runs `max-workers`
    /// worker tasks. A worker exits once the queue stays empty for the idle
    /// timeout; the run only finishes when every scheduled entry has been
    /// completed, restarting the pool if work is still left at that point.
    pub async fn run(&self) -> Result<CrawlStatistics, CantonError> {
        let started_at = Utc::now();

        let sections = load_sections(&self.config.crawler.sections_file)?;
        let seeded = self.seed(&sections)?;
        tracing::info!(
            "Starting crawl of {} with {} sections and {} workers",
            self.base_url,
            seeded,
            self.config.crawler.max_workers
        );

        loop {
            let mut workers = JoinSet::new();
            for id in 0..self.config.crawler.max_workers {
                let worker = self.clone();
                workers.spawn(async move { worker.worker_loop(id).await });
            }

            while let Some(result) = workers.join_next().await {
                if let Err(e) = result {
                    tracing::error!("Worker task failed: {}", e);
                }
            }

            if self.frontier.is_drained() {
                break;
            }
            if self.frontier.queued() == 0 {
                tracing::warn!(
                    "{} entries never completed; stopping",
                    self.frontier.outstanding()
                );
                break;
            }
            tracing::debug!(
                "{} entries left after workers went idle, restarting pool",
                self.frontier.queued()
            );
        }

        let stats = self.counters.snapshot(
            started_at,
            Utc::now(),
            self.frontier.visited_count() as u64,
        );
        tracing::info!(
            "Crawl completed: {} URLs visited, {} pages fetched, {} failed, {} documents stored",
            stats.urls_visited,
            stats.pages_fetched,
            stats.pages_failed,
            stats.documents_stored
        );
        Ok(stats)
    }

    async fn worker_loop(&self, id: usize) {
        let idle_timeout = self.config.crawler.idle_timeout();
        while let Some(entry) = self.frontier.next(idle_timeout).await {
            let _completion = Completion(&self.frontier);
            self.crawl_page(&entry).await;
            self.frontier.mark_fetched(&entry.url);
        }
        tracing::debug!("Worker {} idle, exiting", id);
    }

    /// Processes one frontier entry
    ///
    /// Document URLs go to the downloader. Anything else is fetched; a fetch
    /// failure skips the URL silently. Non-HTML bodies are stored as
    /// documents. HTML pages are optionally saved, landing pages get their
    /// section text written, and every discovered link is offered to the
    /// frontier under the entry's section until the cap is reached.
    pub async fn crawl_page(&self, entry: &FrontierEntry) {
        let url = match Url::parse(&entry.url) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!("Skipping unparsable URL {}: {}", entry.url, e);
                self.counters.page_failed();
                return;
            }
        };

        if is_document(&url, &self.config.crawler.document_extensions) {
            let result = self
                .documents
                .download_file(self.fetcher.as_ref(), &entry.url, &entry.section)
                .await;
            self.record_document(&entry.url, result);
            return;
        }

        let response = match self.fetcher.fetch(&entry.url).await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("Skipping {}: {}", entry.url, e);
                self.counters.page_failed();
                return;
            }
        };

        tracing::debug!("Fetched {} (HTTP {})", entry.url, response.status);
        if response.final_url != entry.url {
            tracing::debug!("{} redirected to {}", entry.url, response.final_url);
        }

        if !response.is_html() {
            let ext = path_extension(&url);
            let result = self
                .documents
                .store_content(&entry.section, ext.as_deref(), &response.body)
                .await;
            self.record_document(&entry.url, result);
            return;
        }

        self.counters.page_fetched();
        let html = response.text();

        if let Some(pages) = &self.pages {
            if let Err(e) = pages
                .store_content(&entry.section, Some("html"), html.as_bytes())
                .await
            {
                tracing::warn!("Failed to save page {}: {}", entry.url, e);
            }
        }

        if self.is_landing_page(entry) {
            let text = extract_plain_text(&html);
            if let Err(e) = save_section_text(&self.texts_dir, &entry.section, &text).await {
                tracing::warn!("Failed to save text for section {}: {}", entry.section, e);
            }
        }

        for link in extract_links(&html, &url) {
            if self.config.crawler.same_host_only && !same_host(&link, &self.base_url) {
                continue;
            }

            match self.frontier.try_enqueue(link.as_str(), &entry.section) {
                EnqueueOutcome::Enqueued => {
                    self.counters.link_enqueued();
                    tracing::debug!("Enqueued {} ({})", link, entry.section);
                }
                EnqueueOutcome::AlreadyVisited => {}
                EnqueueOutcome::CapReached => {
                    self.counters.cap_hit();
                    tracing::debug!("Link cap reached while processing {}", entry.url);
                    break;
                }
            }
        }
    }

    /// The seeded URL of a section, as opposed to pages discovered under it
    fn is_landing_page(&self, entry: &FrontierEntry) -> bool {
        resolve_section(&self.base_url, &entry.section)
            .map(|url| url.as_str() == entry.url)
            .unwrap_or(false)
    }

    fn record_document(&self, url: &str, result: Result<StoredDocument, StorageError>) {
        match result {
            Ok(stored) => {
                match stored.outcome {
                    StoreOutcome::Written => self.counters.document_stored(),
                    StoreOutcome::Duplicate => self.counters.duplicate_resolved(),
                    StoreOutcome::Existing => self.counters.document_existing(),
                }
                tracing::debug!("{} stored as {}", url, stored.path.display());
            }
            Err(e) => {
                tracing::debug!("Skipping document {}: {}", url, e);
                self.counters.page_failed();
            }
        }
    }
}

/// Runs a complete crawl operation
///
/// Logs in first when the configuration has an `[auth]` table, otherwise
/// uses an anonymous client.
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Crawl completed
/// * `Err(CantonError)` - Login or setup failed
///
/// # Example
///
/// ```no_run
/// use canton_crawler::config::load_config;
/// use canton_crawler::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("crawler.toml"))?;
/// let stats = run_crawl(config).await?;
/// println!("{} pages", stats.pages_fetched);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<CrawlStatistics, CantonError> {
    let fetcher: Arc<dyn Fetch> = match &config.auth {
        Some(auth) => Arc::new(login_from_config(auth, &config.fetch).await?),
        None => Arc::new(HttpFetcher::new(&config.fetch)?),
    };

    Coordinator::new(config, fetcher)?.run().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CrawlerConfig, FetchConfig, OutputConfig};
    use crate::crawler::FetchResponse;
    use crate::state::UrlState;
    use crate::FetchError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use tempfile::TempDir;

    /// Serves canned HTML pages; unknown URLs fail with a 404
    struct PageMap(HashMap<String, String>);

    #[async_trait]
    impl Fetch for PageMap {
        async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
            match self.0.get(url) {
                Some(body) => Ok(FetchResponse {
                    final_url: url.to_string(),
                    status: 200,
                    content_type: Some("text/html".to_string()),
                    body: body.clone().into_bytes(),
                }),
                None => Err(FetchError::Status {
                    url: url.to_string(),
                    status: 404,
                }),
            }
        }
    }

    fn test_config(dir: &TempDir, max_links: Option<usize>) -> Config {
        Config {
            crawler: CrawlerConfig {
                base_url: "http://example.com/".to_string(),
                sections_file: dir.path().join("sections.txt"),
                max_workers: 2,
                max_links,
                idle_timeout_ms: 20,
                same_host_only: true,
                document_extensions: vec!["pdf".to_string()],
            },
            fetch: FetchConfig::default(),
            auth: None,
            output: OutputConfig {
                root: dir.path().join("out"),
                ..OutputConfig::default()
            },
        }
    }

    fn coordinator(dir: &TempDir, max_links: Option<usize>, pages: &[(&str, &str)]) -> Coordinator {
        let map = pages
            .iter()
            .map(|(url, body)| (url.to_string(), body.to_string()))
            .collect();
        Coordinator::new(test_config(dir, max_links), Arc::new(PageMap(map))).unwrap()
    }

    #[tokio::test]
    async fn test_cap_drops_second_link() {
        let dir = TempDir::new().unwrap();
        let coordinator = coordinator(
            &dir,
            Some(2),
            &[(
                "http://example.com/start",
                r#"<a href="p1">1</a><a href="p2">2</a>"#,
            )],
        );
        coordinator.seed(&["start".to_string()]).unwrap();
        let entry = coordinator.frontier().pop().unwrap();

        coordinator.crawl_page(&entry).await;

        let frontier = coordinator.frontier();
        assert_eq!(frontier.queued(), 1);
        assert_eq!(
            frontier.pop(),
            Some(FrontierEntry::new("http://example.com/p1", "start"))
        );
        assert_eq!(frontier.state_of("http://example.com/p2"), UrlState::Unseen);
    }

    #[tokio::test]
    async fn test_failed_fetch_enqueues_nothing() {
        let dir = TempDir::new().unwrap();
        let coordinator = coordinator(&dir, None, &[]);
        coordinator.seed(&["missing".to_string()]).unwrap();
        let entry = coordinator.frontier().pop().unwrap();

        coordinator.crawl_page(&entry).await;

        assert_eq!(coordinator.frontier().queued(), 0);
        assert_eq!(coordinator.frontier().visited_count(), 1);
    }

    #[tokio::test]
    async fn test_other_hosts_not_followed() {
        let dir = TempDir::new().unwrap();
        let coordinator = coordinator(
            &dir,
            None,
            &[(
                "http://example.com/s",
                r#"<a href="http://other.org/x">x</a><a href="/y">y</a>"#,
            )],
        );
        coordinator.seed(&["s".to_string()]).unwrap();
        let entry = coordinator.frontier().pop().unwrap();

        coordinator.crawl_page(&entry).await;

        assert_eq!(coordinator.frontier().queued(), 1);
        assert_eq!(
            coordinator.frontier().state_of("http://other.org/x"),
            UrlState::Unseen
        );
    }

    #[tokio::test]
    async fn test_landing_page_text_saved() {
        let dir = TempDir::new().unwrap();
        let coordinator = coordinator(
            &dir,
            None,
            &[("http://example.com/novedades", "<h1>Novedades</h1><p>Hoy</p>")],
        );
        coordinator.seed(&["novedades".to_string()]).unwrap();
        let entry = coordinator.frontier().pop().unwrap();

        coordinator.crawl_page(&entry).await;

        let text =
            std::fs::read_to_string(dir.path().join("out/textos/novedades.txt")).unwrap();
        assert_eq!(text, "Novedades Hoy");
    }

    #[tokio::test]
    async fn test_run_visits_every_page_once() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("sections.txt"), "a\n\nb\n").unwrap();
        let coordinator = coordinator(
            &dir,
            None,
            &[
                ("http://example.com/a", r#"<a href="/c">c</a><a href="/b">b</a>"#),
                ("http://example.com/b", r#"<a href="/c">c</a>"#),
                ("http://example.com/c", r#"<a href="/a">a</a>"#),
            ],
        );

        let stats = coordinator.run().await.unwrap();

        assert_eq!(stats.urls_visited, 3);
        assert_eq!(stats.pages_fetched, 3);
        assert_eq!(stats.links_enqueued, 1);
        assert!(coordinator.frontier().is_drained());
        for path in ["a", "b", "c"] {
            assert_eq!(
                coordinator
                    .frontier()
                    .state_of(&format!("http://example.com/{}", path)),
                UrlState::Fetched
            );
        }
    }
}
