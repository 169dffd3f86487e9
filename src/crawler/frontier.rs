//! Crawl frontier: the visited set and the work queue behind one lock
//!
//! Claiming a URL (check visited, check cap, mark visited, push) happens in a
//! single critical section so two workers can never schedule the same link.
//! The lock is never held across an `.await`.

use crate::state::UrlState;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;

/// A unit of crawl work: a URL and the section it was discovered under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: String,
    pub section: String,
}

impl FrontierEntry {
    pub fn new(url: impl Into<String>, section: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            section: section.into(),
        }
    }
}

/// Result of trying to claim a URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// Marked visited and pushed onto the queue
    Enqueued,

    /// Already in the visited set, nothing changed
    AlreadyVisited,

    /// The visited set has reached the cap; the caller stops offering links
    CapReached,
}

#[derive(Debug, Default)]
struct FrontierInner {
    visited: HashMap<String, UrlState>,
    queue: VecDeque<FrontierEntry>,
}

/// Shared visited set and FIFO work queue
#[derive(Debug)]
pub struct Frontier {
    inner: Mutex<FrontierInner>,

    /// Cap on the visited-set size for discovered links
    max_links: Option<usize>,

    /// Entries pushed but not yet completed by a worker
    outstanding: AtomicUsize,

    work_available: Notify,
}

impl Frontier {
    /// Creates an empty frontier
    ///
    /// # Arguments
    ///
    /// * `max_links` - Once the visited set holds this many URLs, no further
    ///   discovered links are claimed. Seeds are not subject to the cap.
    pub fn new(max_links: Option<usize>) -> Self {
        Self {
            inner: Mutex::new(FrontierInner::default()),
            max_links,
            outstanding: AtomicUsize::new(0),
            work_available: Notify::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FrontierInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Pre-marks a seed URL visited and pushes it with its own section label
    ///
    /// Returns false if the URL was already present (e.g. two sections
    /// resolving to the same URL).
    pub fn seed(&self, url: &str, section: &str) -> bool {
        let mut inner = self.lock();
        if inner.visited.contains_key(url) {
            return false;
        }
        self.push_locked(&mut inner, FrontierEntry::new(url, section));
        true
    }

    /// Atomically claims `url` if it is unseen and the cap allows it
    ///
    /// The visited check comes first, so an already-visited URL reports
    /// `AlreadyVisited` even when the cap has been reached.
    pub fn try_enqueue(&self, url: &str, section: &str) -> EnqueueOutcome {
        let mut inner = self.lock();

        if inner.visited.contains_key(url) {
            return EnqueueOutcome::AlreadyVisited;
        }

        if let Some(max) = self.max_links {
            if inner.visited.len() >= max {
                return EnqueueOutcome::CapReached;
            }
        }

        self.push_locked(&mut inner, FrontierEntry::new(url, section));
        EnqueueOutcome::Enqueued
    }

    fn push_locked(&self, inner: &mut FrontierInner, entry: FrontierEntry) {
        inner.visited.insert(entry.url.clone(), UrlState::Scheduled);
        inner.queue.push_back(entry);
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        self.work_available.notify_one();
    }

    /// Pops the next entry without waiting
    pub fn pop(&self) -> Option<FrontierEntry> {
        self.lock().queue.pop_front()
    }

    /// Pops the next entry, waiting up to `idle_timeout` for one to arrive
    ///
    /// Returns None when the queue stayed empty for the whole timeout; the
    /// calling worker should then exit.
    pub async fn next(&self, idle_timeout: Duration) -> Option<FrontierEntry> {
        if let Some(entry) = self.pop() {
            return Some(entry);
        }

        let _ = tokio::time::timeout(idle_timeout, self.work_available.notified()).await;
        self.pop()
    }

    /// Moves a claimed URL to its terminal state
    pub fn mark_fetched(&self, url: &str) {
        let mut inner = self.lock();
        if let Some(state) = inner.visited.get_mut(url) {
            if state.can_transition_to(UrlState::Fetched) {
                *state = UrlState::Fetched;
            }
        }
    }

    /// Records that a worker finished with one popped entry
    pub fn complete(&self) {
        let _ = self
            .outstanding
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
    }

    /// Returns true once every pushed entry has been completed
    pub fn is_drained(&self) -> bool {
        self.outstanding.load(Ordering::SeqCst) == 0
    }

    /// Number of entries pushed but not completed
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    /// Current size of the visited set
    pub fn visited_count(&self) -> usize {
        self.lock().visited.len()
    }

    /// Number of entries waiting in the queue
    pub fn queued(&self) -> usize {
        self.lock().queue.len()
    }

    /// State of `url`; `Unseen` if it was never claimed
    pub fn state_of(&self, url: &str) -> UrlState {
        self.lock()
            .visited
            .get(url)
            .copied()
            .unwrap_or(UrlState::Unseen)
    }
}
