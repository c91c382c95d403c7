//! dealflow Analysis - Entity relevance and centrality engine
//!
//! Turns a validated [`dealflow_core::Snapshot`] into the ranked subset of
//! companies, sectors and articles handed to the report writer:
//! - **Stats**: per-entity average relevance, article count, weighted score
//! - **Graph**: weighted company-sector co-occurrence graph
//! - **Centrality**: eigenvector centrality by power iteration, min-max normalized
//! - **Filter**: percentile thresholds over the joined metrics
//! - **Report**: field-labeled records for the report generator
//!
//! Everything is recomputed per [`AnalysisContext`]; nothing is cached
//! between invocations.

pub mod config;
pub mod error;
pub mod stats;
pub mod graph;
pub mod centrality;
pub mod filter;
pub mod report;
pub mod context;

pub use config::*;
pub use error::*;
pub use stats::*;
pub use graph::*;
pub use centrality::*;
pub use filter::*;
pub use report::*;
pub use context::*;

/// Default percentile used for every threshold
pub const DEFAULT_PERCENTILE_CUTOFF: f64 = 0.5;

/// Default power-iteration budget
pub const DEFAULT_MAX_ITERATIONS: usize = 1000;

/// Default per-node convergence tolerance
pub const DEFAULT_TOLERANCE: f64 = 1e-4;
