//! Crawl run statistics
//!
//! Workers bump lock-free counters while the crawl runs; the coordinator
//! turns them into a `CrawlStatistics` snapshot once the frontier drains.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};

/// Crawl statistics summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlStatistics {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Size of the visited set at the end of the run
    pub urls_visited: u64,

    /// HTML pages fetched and parsed
    pub pages_fetched: u64,

    /// URLs whose fetch or download failed
    pub pages_failed: u64,

    /// Discovered links claimed by the frontier
    pub links_enqueued: u64,

    /// Pages that stopped offering links because of the cap
    pub cap_hits: u64,

    /// New files written to the document store
    pub documents_stored: u64,

    /// Downloads resolved to an identical file already on disk
    pub duplicates_resolved: u64,

    /// Downloads skipped because their candidate name already existed
    pub documents_existing: u64,
}

impl CrawlStatistics {
    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }

    /// Percentage of claimed URLs that were processed without error
    pub fn success_rate(&self) -> f64 {
        if self.urls_visited == 0 {
            return 0.0;
        }
        let succeeded = self.urls_visited.saturating_sub(self.pages_failed);
        (succeeded as f64 / self.urls_visited as f64) * 100.0
    }
}

/// Counters shared by all workers of one run
#[derive(Debug, Default)]
pub struct CrawlCounters {
    pages_fetched: AtomicU64,
    pages_failed: AtomicU64,
    links_enqueued: AtomicU64,
    cap_hits: AtomicU64,
    documents_stored: AtomicU64,
    duplicates_resolved: AtomicU64,
    documents_existing: AtomicU64,
}

impl CrawlCounters {
    pub fn page_fetched(&self) {
        self.pages_fetched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn page_failed(&self) {
        self.pages_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn link_enqueued(&self) {
        self.links_enqueued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cap_hit(&self) {
        self.cap_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn document_stored(&self) {
        self.documents_stored.fetch_add(1, Ordering::Relaxed);
    }

    pub fn duplicate_resolved(&self) {
        self.duplicates_resolved.fetch_add(1, Ordering::Relaxed);
    }

    pub fn document_existing(&self) {
        self.documents_existing.fetch_add(1, Ordering::Relaxed);
    }

    /// Freezes the counters into a statistics record
    pub fn snapshot(
        &self,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        urls_visited: u64,
    ) -> CrawlStatistics {
        CrawlStatistics {
            started_at,
            finished_at,
            urls_visited,
            pages_fetched: self.pages_fetched.load(Ordering::Relaxed),
            pages_failed: self.pages_failed.load(Ordering::Relaxed),
            links_enqueued: self.links_enqueued.load(Ordering::Relaxed),
            cap_hits: self.cap_hits.load(Ordering::Relaxed),
            documents_stored: self.documents_stored.load(Ordering::Relaxed),
            duplicates_resolved: self.duplicates_resolved.load(Ordering::Relaxed),
            documents_existing: self.documents_existing.load(Ordering::Relaxed),
        }
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Run:");
    println!("  Started:  {}", stats.started_at.to_rfc3339());
    println!("  Finished: {}", stats.finished_at.to_rfc3339());
    println!("  Duration: {} seconds", stats.duration_seconds());
    println!();

    println!("Pages:");
    println!("  URLs visited: {}", stats.urls_visited);
    println!("  Pages fetched: {}", stats.pages_fetched);
    println!("  Failed: {}", stats.pages_failed);
    println!("  Links enqueued: {}", stats.links_enqueued);
    if stats.cap_hits > 0 {
        println!("  Pages stopped by link cap: {}", stats.cap_hits);
    }
    println!();

    println!("Documents:");
    println!("  Stored: {}", stats.documents_stored);
    println!("  Duplicates resolved: {}", stats.duplicates_resolved);
    println!("  Already present: {}", stats.documents_existing);
    println!();

    println!(
        "Success Rate: {:.1}% ({} / {} URLs processed without error)",
        stats.success_rate(),
        stats.urls_visited.saturating_sub(stats.pages_failed),
        stats.urls_visited
    );
}
