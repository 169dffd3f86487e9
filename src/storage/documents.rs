//! Content-addressed document store
//!
//! Files are named `{section}-{index}.{ext}` where `index` comes from a
//! per-section counter. Before writing, the bytes are hashed and compared
//! against every file already in the directory; identical content resolves to
//! the existing file and leaves the counter untouched.

use crate::crawler::Fetch;
use crate::storage::hashing::{find_by_digest, sha256_bytes};
use crate::storage::{section_file_name, StorageError};
use crate::url::path_extension;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use url::Url;

/// How a store request was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    /// The candidate name already existed; nothing was fetched or written
    Existing,

    /// Same bytes were already stored under another name
    Duplicate,

    /// New file written and the section counter advanced
    Written,
}

/// A stored (or already present) document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    pub path: PathBuf,
    pub outcome: StoreOutcome,
}

type SectionCounter = Arc<tokio::sync::Mutex<usize>>;

/// Directory of deduplicated files with per-section sequential names
///
/// The whole name-check, hash-scan, write and counter-update sequence runs
/// under a per-section lock, so two workers never claim the same index.
/// The hash scan and the write also hold a store-wide lock, since identical
/// bytes must resolve to one file whichever section they arrive under.
#[derive(Debug)]
pub struct DocumentStore {
    dir: PathBuf,
    counters: Mutex<HashMap<String, SectionCounter>>,
    write_lock: tokio::sync::Mutex<()>,
}

impl DocumentStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            counters: Mutex::new(HashMap::new()),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Last index used for `section`, 0 if nothing was written yet
    pub async fn counter(&self, section: &str) -> usize {
        *self.section_counter(section).lock().await
    }

    /// Counters are keyed by file-name prefix, so labels that flatten to the
    /// same name share one sequence
    fn section_counter(&self, section: &str) -> SectionCounter {
        let mut counters = self.counters.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(counters.entry(section_file_name(section)).or_default())
    }

    fn candidate_path(&self, section: &str, index: usize, ext: Option<&str>) -> PathBuf {
        let stem = format!("{}-{}", section_file_name(section), index);
        match ext {
            Some(ext) => self.dir.join(format!("{}.{}", stem, ext)),
            None => self.dir.join(stem),
        }
    }

    /// Downloads `url` into the store under `section`
    ///
    /// # Behavior
    ///
    /// - If `{section}-{counter+1}.{ext}` already exists it is returned
    ///   without fetching and without touching the counter.
    /// - Otherwise the URL is fetched and its SHA-256 compared against every
    ///   file in the directory. A match is returned as is.
    /// - Only new content is written, after which the counter moves to the
    ///   index just used.
    ///
    /// # Errors
    ///
    /// Fetch failures and I/O errors on the directory propagate. Unreadable
    /// files met during the hash scan are skipped.
    pub async fn download_file(
        &self,
        fetcher: &dyn Fetch,
        url: &str,
        section: &str,
    ) -> Result<StoredDocument, StorageError> {
        let parsed = Url::parse(url).map_err(|e| StorageError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        let ext = path_extension(&parsed);

        tokio::fs::create_dir_all(&self.dir).await?;

        let counter = self.section_counter(section);
        let mut last = counter.lock().await;

        let index = *last + 1;
        let candidate = self.candidate_path(section, index, ext.as_deref());
        if tokio::fs::try_exists(&candidate).await? {
            tracing::debug!("{} already stored at {}", url, candidate.display());
            return Ok(StoredDocument {
                path: candidate,
                outcome: StoreOutcome::Existing,
            });
        }

        let response = fetcher.fetch(url).await?;
        let stored = self.persist(candidate, &response.body).await?;
        if stored.outcome == StoreOutcome::Written {
            *last = index;
        }

        tracing::debug!("{} -> {} ({:?})", url, stored.path.display(), stored.outcome);
        Ok(stored)
    }

    /// Stores bytes that were already fetched
    ///
    /// Indices whose file already exists are skipped rather than returned,
    /// since the content is known and may differ.
    pub async fn store_content(
        &self,
        section: &str,
        ext: Option<&str>,
        bytes: &[u8],
    ) -> Result<StoredDocument, StorageError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let counter = self.section_counter(section);
        let mut last = counter.lock().await;

        let mut index = *last + 1;
        let mut candidate = self.candidate_path(section, index, ext);
        while tokio::fs::try_exists(&candidate).await? {
            index += 1;
            candidate = self.candidate_path(section, index, ext);
        }

        let stored = self.persist(candidate, bytes).await?;
        if stored.outcome == StoreOutcome::Written {
            *last = index;
        }
        Ok(stored)
    }

    async fn persist(&self, candidate: PathBuf, bytes: &[u8]) -> Result<StoredDocument, StorageError> {
        let digest = sha256_bytes(bytes);
        let _write_guard = self.write_lock.lock().await;

        let dir = self.dir.clone();
        let lookup = digest.clone();
        let duplicate = tokio::task::spawn_blocking(move || find_by_digest(&dir, &lookup)).await??;

        if let Some(existing) = duplicate {
            return Ok(StoredDocument {
                path: existing,
                outcome: StoreOutcome::Duplicate,
            });
        }

        tokio::fs::write(&candidate, bytes).await?;
        Ok(StoredDocument {
            path: candidate,
            outcome: StoreOutcome::Written,
        })
    }
}
