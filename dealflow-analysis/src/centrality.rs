//! Eigenvector centrality over the co-occurrence graph
//!
//! Power iteration on `(A + I)`, where `A` is the weighted adjacency matrix:
//! 1. Start from the uniform vector `1/n`
//! 2. `x' = x + A x`, then scale `x'` to unit L2 norm
//! 3. Stop once `sum |x' - x| < n * tolerance`
//!
//! The identity shift keeps bipartite graphs from oscillating between the
//! two sides. Running out of iterations is an error, never a partial result.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use dealflow_core::EntityKind;

use crate::{AnalysisConfig, CoOccurrenceGraph, ComputationError};

/// Centrality of one graph node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentralityRecord {
    pub kind: EntityKind,
    pub name: String,
    /// Unit-norm eigenvector component
    pub eigen_centrality: f64,
    /// Min-max scaled centrality in [0, 1]
    pub eigen_centrality_norm: f64,
}

/// Compute normalized eigenvector centrality for every node.
///
/// Records are sorted by raw centrality, highest first.
pub fn eigenvector_centrality(
    graph: &CoOccurrenceGraph,
    config: &AnalysisConfig,
) -> Result<Vec<CentralityRecord>, ComputationError> {
    config.validate()?;

    let n = graph.node_count();
    if n < 2 || graph.edge_count() == 0 {
        return Err(ComputationError::DegenerateGraph {
            nodes: n,
            edges: graph.edge_count(),
        });
    }

    let mut x = vec![1.0 / n as f64; n];
    for iteration in 1..=config.max_iterations {
        let last = x.clone();

        for idx in graph.node_indices() {
            for (neighbor, weight) in graph.weighted_neighbors(idx) {
                x[neighbor.index()] += last[idx.index()] * weight;
            }
        }

        let norm = x.iter().map(|v| v * v).sum::<f64>().sqrt();
        let norm = if norm == 0.0 { 1.0 } else { norm };
        for value in &mut x {
            *value /= norm;
        }

        let change: f64 = x.iter().zip(&last).map(|(a, b)| (a - b).abs()).sum();
        if change < n as f64 * config.tolerance {
            debug!("Eigenvector centrality converged after {} iterations", iteration);
            return Ok(build_records(graph, &x));
        }
    }

    Err(ComputationError::NotConverged {
        iterations: config.max_iterations,
    })
}

/// Min-max scale values into [0, 1].
///
/// When every value is equal the range is empty and all outputs are 0.0.
pub fn min_max_normalize(values: &[f64]) -> Vec<f64> {
    let Some(min) = values.iter().copied().reduce(f64::min) else {
        return Vec::new();
    };
    let max = values.iter().copied().fold(min, f64::max);
    let range = max - min;

    if range <= f64::EPSILON * max.abs() {
        warn!(
            "All {} centrality values are equal ({}), normalizing to 0",
            values.len(),
            max
        );
        return vec![0.0; values.len()];
    }

    values.iter().map(|v| (v - min) / range).collect()
}

fn build_records(graph: &CoOccurrenceGraph, raw: &[f64]) -> Vec<CentralityRecord> {
    let norm = min_max_normalize(raw);
    let mut records: Vec<CentralityRecord> = graph
        .node_indices()
        .map(|idx| {
            let node = graph.node_at(idx);
            CentralityRecord {
                kind: node.kind,
                name: node.name.clone(),
                eigen_centrality: raw[idx.index()],
                eigen_centrality_norm: norm[idx.index()],
            }
        })
        .collect();

    records.sort_by(|a, b| b.eigen_centrality.total_cmp(&a.eigen_centrality));
    records
}
