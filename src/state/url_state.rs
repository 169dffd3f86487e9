/// URL state definitions for tracking crawl progress
///
/// A URL that has never been claimed is `Unseen`; it is never stored in the
/// visited set with that state.
use std::fmt;

/// Represents the current state of a URL in the crawl process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlState {
    /// Not yet discovered, or discovered but not claimed
    Unseen,

    /// Claimed and pushed onto the work queue
    Scheduled,

    /// A worker finished with it, successfully or not
    Fetched,
}

impl UrlState {
    /// Returns true if moving from `self` to `next` is allowed
    ///
    /// States only move forward: Unseen -> Scheduled -> Fetched.
    pub fn can_transition_to(&self, next: UrlState) -> bool {
        matches!(
            (self, next),
            (Self::Unseen, Self::Scheduled) | (Self::Scheduled, Self::Fetched)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unseen => "unseen",
            Self::Scheduled => "scheduled",
            Self::Fetched => "fetched",
        }
    }
}

impl fmt::Display for UrlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
