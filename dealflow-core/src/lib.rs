//! dealflow Core - Data model for news-derived deal-flow analysis
//!
//! This crate provides the foundational pieces:
//! - Article / Company / Sector records and their associations
//! - Validated read-only snapshots of those tables
//! - Two-phase parsing of language-model extraction output
//! - An in-memory article store with JSON persistence

pub mod model;
pub mod validation;
pub mod snapshot;
pub mod extraction;
pub mod store;

pub use model::*;
pub use validation::*;
pub use snapshot::*;
pub use extraction::*;
pub use store::*;

/// Lowest relevance an article may carry
pub const MIN_RELEVANCE: i64 = 1;

/// Highest relevance an article may carry
pub const MAX_RELEVANCE: i64 = 10;
