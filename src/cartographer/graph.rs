//! Graph Construction
//!
//! Step 1.2: The Map Maker
//!
//! Turns a snapshot set into a directed exchange graph. Edge weight is
//! `-ln(rate)`, so a trade loop that multiplies to more than 1 becomes a
//! cycle whose weights sum below zero.

use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use tracing::{debug, info};

use super::snapshot::{PoolSnapshot, Token};

/// Edge data in the exchange graph.
#[derive(Debug, Clone)]
pub struct EdgeData {
    /// `-ln(rate)`; always finite.
    pub weight: f64,
    /// Marginal exchange rate source → destination.
    pub rate: f64,
    /// Pool that priced this edge.
    pub pool_id: String,
}

/// The exchange graph. Built fresh each scan, read-only afterwards.
pub struct ExchangeGraph {
    pub graph: DiGraph<Token, EdgeData>,
    token_to_node: HashMap<Token, NodeIndex>,
}

impl ExchangeGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            token_to_node: HashMap::new(),
        }
    }

    /// Build the graph from a snapshot set. Degenerate pools are skipped,
    /// never an error: malformed single-pool data must not abort a scan.
    pub fn from_snapshots(pools: &[PoolSnapshot]) -> Self {
        let mut graph = Self::new();
        let mut skipped = 0;

        for pool in pools {
            if !graph.add_pool(pool) {
                skipped += 1;
            }
        }

        info!(
            "Graph built: {} nodes, {} edges ({} pools, {} skipped)",
            graph.node_count(),
            graph.edge_count(),
            pools.len(),
            skipped,
        );

        graph
    }

    /// Add every ordered token pair of one pool. Returns false if the pool
    /// was skipped as degenerate.
    fn add_pool(&mut self, pool: &PoolSnapshot) -> bool {
        if !pool.is_tradable() {
            debug!("Skipping degenerate pool {}", pool.id);
            return false;
        }

        for src in &pool.reserves {
            for dst in &pool.reserves {
                if src.token == dst.token {
                    continue;
                }
                let Some(rate) = pool.spot_rate(&src.token, &dst.token) else {
                    continue;
                };
                let weight = -rate.ln();
                if !weight.is_finite() {
                    continue;
                }
                let from = self.get_or_create_node(&src.token);
                let to = self.get_or_create_node(&dst.token);
                self.upsert_edge(
                    from,
                    to,
                    EdgeData {
                        weight,
                        rate,
                        pool_id: pool.id.clone(),
                    },
                );
            }
        }

        true
    }

    /// Keep at most one edge per ordered pair: the lowest weight wins,
    /// first-seen wins ties (snapshot order is the stable tiebreak).
    fn upsert_edge(&mut self, from: NodeIndex, to: NodeIndex, data: EdgeData) {
        match self.graph.find_edge(from, to) {
            Some(edge) => {
                let existing = &self.graph[edge];
                if data.weight < existing.weight {
                    self.graph[edge] = data;
                }
            }
            None => {
                self.graph.add_edge(from, to, data);
            }
        }
    }

    fn get_or_create_node(&mut self, token: &Token) -> NodeIndex {
        if let Some(&node) = self.token_to_node.get(token) {
            return node;
        }
        let node = self.graph.add_node(token.clone());
        self.token_to_node.insert(token.clone(), node);
        node
    }

    pub fn get_node(&self, token: &Token) -> Option<NodeIndex> {
        self.token_to_node.get(token).copied()
    }

    pub fn get_token(&self, node: NodeIndex) -> Option<&Token> {
        self.graph.node_weight(node)
    }

    /// The surviving edge for an ordered pair, if any.
    pub fn edge(&self, from: &Token, to: &Token) -> Option<&EdgeData> {
        let from = self.get_node(from)?;
        let to = self.get_node(to)?;
        let edge = self.graph.find_edge(from, to)?;
        Some(&self.graph[edge])
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

impl Default for ExchangeGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartographer::snapshot::Reserve;

    fn token(tag: &str) -> Token {
        Token::new(tag)
    }

    fn pool(id: &str, entries: &[(&str, f64, f64)]) -> PoolSnapshot {
        PoolSnapshot::new(
            id,
            entries
                .iter()
                .map(|(t, b, w)| Reserve::new(token(t), *b, *w))
                .collect(),
        )
    }

    #[test]
    fn test_empty_input_builds_empty_graph() {
        let graph = ExchangeGraph::from_snapshots(&[]);
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_two_token_pool_builds_both_directions() {
        let pools = vec![pool("p1", &[("a", 100.0, 0.5), ("b", 200.0, 0.5)])];
        let graph = ExchangeGraph::from_snapshots(&pools);

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 2);

        let ab = graph.edge(&token("a"), &token("b")).unwrap();
        let ba = graph.edge(&token("b"), &token("a")).unwrap();
        assert!((ab.rate - 2.0).abs() < 1e-12);
        // Reciprocal rates multiply to 1, weights cancel
        assert!((ab.rate * ba.rate - 1.0).abs() < 1e-12);
        assert!((ab.weight + ba.weight).abs() < 1e-12);
    }

    #[test]
    fn test_multi_token_pool_builds_all_pairs() {
        let pools = vec![pool(
            "tri",
            &[("a", 100.0, 0.4), ("b", 100.0, 0.3), ("c", 100.0, 0.3)],
        )];
        let graph = ExchangeGraph::from_snapshots(&pools);
        assert_eq!(graph.node_count(), 3);
        // Every ordered pair of 3 tokens
        assert_eq!(graph.edge_count(), 6);
    }

    #[test]
    fn test_parallel_pools_keep_best_rate() {
        // p2 gives a better a->b rate (3.0 vs 2.0), so it must win that
        // direction; p1 wins the reverse.
        let pools = vec![
            pool("p1", &[("a", 100.0, 0.5), ("b", 200.0, 0.5)]),
            pool("p2", &[("a", 100.0, 0.5), ("b", 300.0, 0.5)]),
        ];
        let graph = ExchangeGraph::from_snapshots(&pools);

        assert_eq!(graph.edge_count(), 2);
        let ab = graph.edge(&token("a"), &token("b")).unwrap();
        assert_eq!(ab.pool_id, "p2");
        assert!((ab.rate - 3.0).abs() < 1e-12);

        let ba = graph.edge(&token("b"), &token("a")).unwrap();
        assert_eq!(ba.pool_id, "p1");
        assert!((ba.rate - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_equal_rate_tie_keeps_first_pool() {
        let pools = vec![
            pool("first", &[("a", 100.0, 0.5), ("b", 200.0, 0.5)]),
            pool("second", &[("a", 50.0, 0.5), ("b", 100.0, 0.5)]),
        ];
        let graph = ExchangeGraph::from_snapshots(&pools);
        assert_eq!(graph.edge(&token("a"), &token("b")).unwrap().pool_id, "first");
    }

    #[test]
    fn test_zero_balance_pool_contributes_no_edges() {
        let pools = vec![
            pool("drained", &[("a", 0.0, 0.5), ("b", 200.0, 0.5)]),
            pool("healthy", &[("c", 10.0, 0.5), ("d", 10.0, 0.5)]),
        ];
        let graph = ExchangeGraph::from_snapshots(&pools);

        // Only the healthy pool's tokens made it in
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.get_node(&token("a")).is_none());
        assert!(graph.get_node(&token("b")).is_none());
    }
}
