//! Negative-Cycle Search
//!
//! Step 2.1: The Pathfinder
//!
//! Bellman-Ford relaxation over the exchange graph. Dijkstra-style queue
//! traversal is off the table here: it cannot safely explore negative
//! weights, and every profitable loop is exactly a negative-weight cycle.
//!
//! Instead of one run per source token, every distance starts at zero.
//! That is the virtual super-source with zero-weight edges to all tokens,
//! collapsed: one relaxation run covers every starting token.

use petgraph::visit::EdgeRef;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::cartographer::{ExchangeGraph, Token};

/// Improvements smaller than this are ln-rounding residue, not arbitrage.
/// Rate-consistent pools leave ~1e-16 of noise per hop; a real opportunity
/// clears this by many orders of magnitude.
const WEIGHT_EPSILON: f64 = 1e-9;

/// One negative cycle: the closed token path plus the predecessor hops
/// the relaxation recorded for it.
#[derive(Debug, Clone)]
pub struct CycleTrace {
    /// Closed path: `path[0] == path[last]`, length >= 3.
    pub path: Vec<Token>,
    /// Predecessor of each token along the cycle (`path[i+1]` came from `path[i]`).
    pub predecessors: HashMap<Token, Token>,
}

impl CycleTrace {
    pub fn hop_count(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    /// Starts and ends at the same token.
    pub fn is_closed(&self) -> bool {
        self.path.len() >= 3 && self.path.first() == self.path.last()
    }

    /// No repeated token other than the endpoints.
    pub fn is_simple(&self) -> bool {
        if !self.is_closed() {
            return false;
        }
        let interior = &self.path[..self.path.len() - 1];
        let unique: HashSet<&Token> = interior.iter().collect();
        unique.len() == interior.len()
    }
}

/// Negative-cycle finder over a built exchange graph.
pub struct CycleFinder<'a> {
    graph: &'a ExchangeGraph,
}

impl<'a> CycleFinder<'a> {
    pub fn new(graph: &'a ExchangeGraph) -> Self {
        Self { graph }
    }

    /// Run the relaxation and pull out every reachable negative cycle.
    ///
    /// Exact-duplicate closed paths are collapsed; rotations of the same
    /// loop found via different violating edges are reported as-is, in a
    /// stable order. An empty or single-node graph yields no cycles.
    pub fn find_cycles(&self) -> Vec<CycleTrace> {
        let n = self.graph.node_count();
        if n < 2 {
            return Vec::new();
        }

        // Node indices are dense 0..n for a freshly built graph.
        let edges: Vec<(usize, usize, f64)> = self
            .graph
            .graph
            .edge_references()
            .map(|e| (e.source().index(), e.target().index(), e.weight().weight))
            .collect();

        let mut dist = vec![0.0_f64; n];
        let mut pred: Vec<Option<usize>> = vec![None; n];

        // |V|-1 rounds, early exit once a round settles
        for round in 0..n - 1 {
            let mut updated = false;
            for &(u, v, w) in &edges {
                if dist[u] + w < dist[v] - WEIGHT_EPSILON {
                    dist[v] = dist[u] + w;
                    pred[v] = Some(u);
                    updated = true;
                }
            }
            if !updated {
                debug!("Relaxation settled after {} rounds", round + 1);
                break;
            }
        }

        // One more pass: any edge that still relaxes sits on or downstream
        // of a negative cycle. Apply the relaxation so the predecessor walk
        // from its target is anchored, then extract.
        let mut cycles = Vec::new();
        let mut seen: HashSet<Vec<usize>> = HashSet::new();

        for &(u, v, w) in &edges {
            if dist[u] + w < dist[v] - WEIGHT_EPSILON {
                dist[v] = dist[u] + w;
                pred[v] = Some(u);

                if let Some(cycle) = extract_cycle(v, &pred) {
                    if seen.insert(cycle.clone()) {
                        if let Some(trace) = self.to_trace(&cycle) {
                            debug!(
                                "Negative cycle entered at {} ({} traced hops)",
                                trace.path[0].short(),
                                trace.predecessors.len()
                            );
                            cycles.push(trace);
                        }
                    }
                }
            }
        }

        debug!("Found {} negative cycles", cycles.len());
        cycles
    }

    /// Map a closed cycle of node indices to tokens and record its hops.
    fn to_trace(&self, cycle: &[usize]) -> Option<CycleTrace> {
        let path: Option<Vec<Token>> = cycle
            .iter()
            .map(|&i| self.graph.get_token(petgraph::graph::NodeIndex::new(i)).cloned())
            .collect();
        let path = path?;

        let mut predecessors = HashMap::new();
        for hop in path.windows(2) {
            predecessors.insert(hop[1].clone(), hop[0].clone());
        }

        let trace = CycleTrace { path, predecessors };
        if trace.is_closed() && trace.is_simple() {
            Some(trace)
        } else {
            None
        }
    }
}

/// Walk predecessors `|V|` steps from `start` to guarantee landing inside a
/// cycle, then keep walking until a node repeats. The segment between the
/// two occurrences, put back in trade order and closed, is the cycle.
fn extract_cycle(start: usize, pred: &[Option<usize>]) -> Option<Vec<usize>> {
    let n = pred.len();

    let mut inside = start;
    for _ in 0..n {
        inside = pred[inside]?;
    }

    // Backward walk with a visited marker; the first repeat closes the loop.
    let mut walk = Vec::new();
    let mut seen = HashSet::new();
    let mut cur = inside;
    while seen.insert(cur) {
        walk.push(cur);
        cur = pred[cur]?;
    }

    // `cur` is the repeated node. The walk past it lists the cycle in
    // predecessor (reverse-trade) order.
    let entry = walk.iter().position(|&x| x == cur)?;
    let mut closed = Vec::with_capacity(walk.len() - entry + 1);
    closed.push(cur);
    closed.extend(walk[entry + 1..].iter().rev().copied());
    closed.push(cur);

    if closed.len() >= 3 {
        Some(closed)
    } else {
        None
    }
}
