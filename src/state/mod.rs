//! State module for tracking crawl progress
//!
//! `UrlState` follows each discovered URL from the moment it is scheduled
//! until its fetch has finished.

mod url_state;

pub use url_state::UrlState;
