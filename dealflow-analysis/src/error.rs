//! Errors raised by the analysis engine

use thiserror::Error;

/// Fatal failures of a ranking run. No fallback ranking is produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComputationError {
    #[error("co-occurrence graph is degenerate ({nodes} nodes, {edges} edges)")]
    DegenerateGraph { nodes: usize, edges: usize },

    #[error("eigenvector centrality did not converge within {iterations} iterations")]
    NotConverged { iterations: usize },

    #[error("invalid analysis configuration: {0}")]
    InvalidConfig(String),
}
