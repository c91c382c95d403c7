//! Company-sector co-occurrence graph
//!
//! Nodes are companies and sectors, keyed by kind and name so the two
//! namespaces never collide. An edge joins a company and a sector that
//! appear in the same article and carries that article's relevance.
//! When a pair recurs, the last processed triple's relevance replaces the
//! earlier weight; weights are never summed or averaged.

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use dealflow_core::{CoOccurrence, EntityKind};

/// A graph node: one company or one sector
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GraphNode {
    pub kind: EntityKind,
    pub name: String,
}

impl GraphNode {
    pub fn company(name: &str) -> Self {
        Self {
            kind: EntityKind::Company,
            name: name.to_string(),
        }
    }

    pub fn sector(name: &str) -> Self {
        Self {
            kind: EntityKind::Sector,
            name: name.to_string(),
        }
    }
}

/// Undirected weighted bipartite graph of company-sector co-occurrence
#[derive(Debug, Clone, Default)]
pub struct CoOccurrenceGraph {
    graph: UnGraph<GraphNode, f64>,
    /// node key -> index in `graph`
    index: HashMap<GraphNode, NodeIndex>,
}

impl CoOccurrenceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph from joined (company, sector, relevance) triples
    pub fn from_co_occurrences(triples: &[CoOccurrence<'_>]) -> Self {
        let mut graph = Self::new();
        for triple in triples {
            graph.link(triple.company, triple.sector, triple.relevance as f64);
        }
        debug!(
            "Built co-occurrence graph: {} nodes, {} edges from {} triples",
            graph.node_count(),
            graph.edge_count(),
            triples.len()
        );
        graph
    }

    /// Insert or overwrite the company-sector edge
    pub fn link(&mut self, company: &str, sector: &str, weight: f64) {
        let c = self.node(GraphNode::company(company));
        let s = self.node(GraphNode::sector(sector));
        self.graph.update_edge(c, s, weight);
    }

    fn node(&mut self, key: GraphNode) -> NodeIndex {
        if let Some(&idx) = self.index.get(&key) {
            return idx;
        }
        let idx = self.graph.add_node(key.clone());
        self.index.insert(key, idx);
        idx
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, kind: EntityKind, name: &str) -> bool {
        self.index.contains_key(&GraphNode {
            kind,
            name: name.to_string(),
        })
    }

    /// Weight of the company-sector edge, if the pair co-occurs
    pub fn weight(&self, company: &str, sector: &str) -> Option<f64> {
        let c = self.index.get(&GraphNode::company(company))?;
        let s = self.index.get(&GraphNode::sector(sector))?;
        let edge = self.graph.find_edge(*c, *s)?;
        self.graph.edge_weight(edge).copied()
    }

    /// Neighbors of a node with the connecting edge weight
    pub fn neighbors(&self, kind: EntityKind, name: &str) -> Vec<(&GraphNode, f64)> {
        let key = GraphNode {
            kind,
            name: name.to_string(),
        };
        let Some(&idx) = self.index.get(&key) else {
            return Vec::new();
        };
        self.weighted_neighbors(idx)
            .map(|(other, weight)| (&self.graph[other], weight))
            .collect()
    }

    /// All nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.graph.node_indices().map(move |idx| &self.graph[idx])
    }

    /// Neighbor indices and weights of `idx`, whichever endpoint it is
    pub(crate) fn weighted_neighbors(
        &self,
        idx: NodeIndex,
    ) -> impl Iterator<Item = (NodeIndex, f64)> + '_ {
        self.graph.edges(idx).map(move |edge| {
            let other = if edge.source() == idx {
                edge.target()
            } else {
                edge.source()
            };
            (other, *edge.weight())
        })
    }

    pub(crate) fn node_indices(&self) -> impl Iterator<Item = NodeIndex> {
        self.graph.node_indices()
    }

    pub(crate) fn node_at(&self, idx: NodeIndex) -> &GraphNode {
        &self.graph[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triple<'a>(company: &'a str, sector: &'a str, relevance: i64) -> CoOccurrence<'a> {
        CoOccurrence {
            company,
            sector,
            relevance,
        }
    }

    #[test]
    fn test_nodes_created_lazily() {
        let graph = CoOccurrenceGraph::from_co_occurrences(&[
            triple("C1", "S1", 9),
            triple("C1", "S2", 2),
            triple("C2", "S1", 1),
        ]);
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 3);
        assert!(graph.contains(EntityKind::Company, "C2"));
        assert!(!graph.contains(EntityKind::Sector, "C2"));
        assert_eq!(graph.weight("C1", "S2"), Some(2.0));
        assert_eq!(graph.weight("C2", "S2"), None);
    }

    #[test]
    fn test_repeated_pair_keeps_last_weight() {
        let graph = CoOccurrenceGraph::from_co_occurrences(&[
            triple("Acme", "Retail", 3),
            triple("Acme", "Retail", 8),
        ]);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.weight("Acme", "Retail"), Some(8.0));

        let reversed = CoOccurrenceGraph::from_co_occurrences(&[
            triple("Acme", "Retail", 8),
            triple("Acme", "Retail", 3),
        ]);
        assert_eq!(reversed.weight("Acme", "Retail"), Some(3.0));
    }

    #[test]
    fn test_bipartite_even_with_shared_names() {
        // A company and a sector may share a name without forming a self-loop
        let graph = CoOccurrenceGraph::from_co_occurrences(&[triple("Energy", "Energy", 6)]);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);

        for node in graph.nodes() {
            for (neighbor, _) in graph.neighbors(node.kind, &node.name) {
                assert_ne!(neighbor.kind, node.kind);
            }
        }
    }

    #[test]
    fn test_neighbors() {
        let graph = CoOccurrenceGraph::from_co_occurrences(&[
            triple("C1", "S1", 9),
            triple("C2", "S1", 1),
        ]);
        let mut neighbors = graph.neighbors(EntityKind::Sector, "S1");
        neighbors.sort_by(|a, b| a.0.name.cmp(&b.0.name));
        assert_eq!(neighbors.len(), 2);
        assert_eq!(neighbors[0].0, &GraphNode::company("C1"));
        assert_eq!(neighbors[0].1, 9.0);
        assert_eq!(neighbors[1].1, 1.0);
        assert!(graph.neighbors(EntityKind::Company, "missing").is_empty());
    }
}
