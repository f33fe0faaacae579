//! Scan Pipeline
//!
//! One scan = build -> detect -> evaluate, as a pure function of the
//! snapshot set. No internal loop, no state carried between scans: the
//! driving loop in `main` decides the cadence, and every invocation prices
//! from fresh reserve data.

use serde::Serialize;
use tracing::debug;

use crate::brain::{CycleFinder, ProfitEvaluator};
use crate::cartographer::{ExchangeGraph, PoolSnapshot, Token};
use crate::error::ScanError;

/// A priced arbitrage loop, the shape handed to the sink.
#[derive(Debug, Clone, Serialize)]
pub struct Opportunity {
    /// Closed token path, first == last.
    pub path: Vec<Token>,
    /// Multiplicative return; > 1 is profitable before fees and slippage.
    pub profit: f64,
}

impl Opportunity {
    pub fn profit_percentage(&self) -> f64 {
        (self.profit - 1.0) * 100.0
    }
}

/// What one scan saw, for the driving loop's summary.
#[derive(Debug)]
pub struct ScanOutcome {
    pub opportunities: Vec<Opportunity>,
    pub node_count: usize,
    pub edge_count: usize,
    pub cycle_count: usize,
    pub unresolved_count: usize,
}

/// Run one full scan over a snapshot set.
pub fn scan(pools: &[PoolSnapshot]) -> ScanOutcome {
    let graph = ExchangeGraph::from_snapshots(pools);

    let cycles = CycleFinder::new(&graph).find_cycles();
    let cycle_count = cycles.len();

    let evaluator = ProfitEvaluator::new(pools);
    let mut unresolved_count = 0;
    let opportunities = cycles
        .into_iter()
        .filter_map(|trace| match evaluator.evaluate(&trace.path) {
            Ok(profit) => {
                debug!("Priced {}-hop loop at {:.6}x", trace.hop_count(), profit);
                Some(Opportunity {
                    path: trace.path,
                    profit,
                })
            }
            Err(ScanError::UnresolvedHop { from, to }) => {
                debug!("Dropping cycle with unpriceable hop {} -> {}", from, to);
                unresolved_count += 1;
                None
            }
            Err(e) => {
                debug!("Dropping cycle: {}", e);
                unresolved_count += 1;
                None
            }
        })
        .collect();

    ScanOutcome {
        opportunities,
        node_count: graph.node_count(),
        edge_count: graph.edge_count(),
        cycle_count,
        unresolved_count,
    }
}
