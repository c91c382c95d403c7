//! dealflow News Layer
//!
//! Fetches candidate business news for the extraction step:
//! - HTTP client construction with timeouts
//! - NewsAPI `everything` search per topic
//! - Concurrent multi-topic search with URL deduplication

pub mod client;
pub mod search;

pub use client::*;
pub use search::*;

/// Search topics associated with private-equity deal flow
pub const DEFAULT_TOPICS: &[&str] = &[
    "finance",
    "business",
    "economics",
    "investing",
    "private equity",
    "venture capital",
    "buyout",
    "fundraising",
    "mergers",
    "acquisitions",
    "portfolio companies",
    "investment opportunities",
    "capital markets",
    "growth equity",
    "financial transactions",
    "deal flow",
    "corporate finance",
    "investment strategy",
    "fund management",
    "capital raising",
];
