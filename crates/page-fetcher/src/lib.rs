//! Page fetching library
//!
//! This crate fetches single web pages on behalf of the API, honouring
//! robots.txt, and flattens the HTML into a title and visible text.

mod error;
mod extract;
mod fetcher;
mod robots;

pub use error::{FetchError, Result};
pub use extract::{extract_text, extract_title};
pub use fetcher::{FetchOutcome, FetcherConfig, PageContent, PageFetcher, BLOCKED_BY_ROBOTS};
pub use robots::RobotsRules;
