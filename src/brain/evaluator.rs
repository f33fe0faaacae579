//! Profit Evaluation
//!
//! Step 2.2: The Accountant
//!
//! Recomputes a cycle's return straight from the snapshot set, hop by hop,
//! rather than trusting the graph weights it was found with. The product of
//! marginal rates must agree with `exp(-sum of edge weights)` for the same
//! pool choices; any drift would mean the builder and the accountant
//! disagree about the market.

use tracing::debug;

use crate::cartographer::{PoolSnapshot, Token};
use crate::error::ScanError;

/// Walks token paths over a snapshot set and prices them.
pub struct ProfitEvaluator<'a> {
    pools: &'a [PoolSnapshot],
}

impl<'a> ProfitEvaluator<'a> {
    pub fn new(pools: &'a [PoolSnapshot]) -> Self {
        Self { pools }
    }

    /// Multiplicative return of trading along `path`. Greater than 1 means
    /// the loop is profitable before fees and slippage.
    ///
    /// Each hop uses the pool the graph builder would have selected: the
    /// one with the best marginal rate for that ordered pair, first-seen
    /// winning ties. A hop no pool can price fails the whole path with
    /// `UnresolvedHop`; the caller drops the candidate and moves on.
    pub fn evaluate(&self, path: &[Token]) -> Result<f64, ScanError> {
        let mut profit = 1.0_f64;

        for hop in path.windows(2) {
            let (from, to) = (&hop[0], &hop[1]);
            let rate = self.best_rate(from, to).ok_or_else(|| {
                debug!("No pool prices hop {} -> {}", from.short(), to.short());
                ScanError::UnresolvedHop {
                    from: from.clone(),
                    to: to.clone(),
                }
            })?;
            profit *= rate;
        }

        Ok(profit)
    }

    /// Best marginal rate over all tradable pools holding both tokens.
    /// Mirrors the builder's lowest-weight edge selection exactly:
    /// highest rate wins, snapshot order breaks ties.
    fn best_rate(&self, from: &Token, to: &Token) -> Option<f64> {
        let mut best: Option<f64> = None;
        for pool in self.pools {
            if let Some(rate) = pool.spot_rate(from, to) {
                if best.map_or(true, |b| rate > b) {
                    best = Some(rate);
                }
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartographer::{ExchangeGraph, Reserve};

    fn token(tag: &str) -> Token {
        Token::new(tag)
    }

    fn pool(id: &str, entries: &[(&str, f64)]) -> PoolSnapshot {
        PoolSnapshot::new(
            id,
            entries
                .iter()
                .map(|(t, b)| Reserve::new(token(t), *b, 1.0))
                .collect(),
        )
    }

    fn known_cycle_pools() -> Vec<PoolSnapshot> {
        // a->b = 2.0, b->c = 2.0, c->a = 0.4
        vec![
            pool("ab", &[("a", 100.0), ("b", 200.0)]),
            pool("bc", &[("b", 100.0), ("c", 200.0)]),
            pool("ca", &[("c", 250.0), ("a", 100.0)]),
        ]
    }

    #[test]
    fn test_known_cycle_profit() {
        let pools = known_cycle_pools();
        let evaluator = ProfitEvaluator::new(&pools);
        let path = vec![token("a"), token("b"), token("c"), token("a")];

        let profit = evaluator.evaluate(&path).unwrap();
        assert!(
            (profit - 1.6).abs() / 1.6 < 1e-9,
            "expected ~1.6, got {}",
            profit
        );
    }

    #[test]
    fn test_profit_matches_graph_weights() {
        let pools = known_cycle_pools();
        let graph = ExchangeGraph::from_snapshots(&pools);
        let evaluator = ProfitEvaluator::new(&pools);
        let path = vec![token("a"), token("b"), token("c"), token("a")];

        let profit = evaluator.evaluate(&path).unwrap();
        let total_weight: f64 = path
            .windows(2)
            .map(|hop| graph.edge(&hop[0], &hop[1]).unwrap().weight)
            .sum();

        let from_weights = (-total_weight).exp();
        assert!(
            (profit - from_weights).abs() / profit < 1e-9,
            "product {} vs exp(-sum) {}",
            profit,
            from_weights
        );
    }

    #[test]
    fn test_picks_best_pool_like_the_builder() {
        // Two pools price a->b; the better one (3.0) must be used.
        let pools = vec![
            pool("worse", &[("a", 100.0), ("b", 200.0)]),
            pool("better", &[("a", 100.0), ("b", 300.0)]),
        ];
        let evaluator = ProfitEvaluator::new(&pools);
        let out = evaluator.evaluate(&[token("a"), token("b")]).unwrap();
        assert!((out - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_missing_pool_is_unresolved() {
        let pools = known_cycle_pools();
        let evaluator = ProfitEvaluator::new(&pools);
        let path = vec![token("a"), token("b"), token("z"), token("a")];

        match evaluator.evaluate(&path) {
            Err(ScanError::UnresolvedHop { from, to }) => {
                assert_eq!(from, token("b"));
                assert_eq!(to, token("z"));
            }
            other => panic!("expected UnresolvedHop, got {:?}", other),
        }
    }

    #[test]
    fn test_degenerate_pool_cannot_price_a_hop() {
        let pools = vec![pool("drained", &[("a", 0.0), ("b", 200.0)])];
        let evaluator = ProfitEvaluator::new(&pools);
        assert!(evaluator.evaluate(&[token("a"), token("b")]).is_err());
    }

    #[test]
    fn test_empty_path_is_unit_profit() {
        let pools = known_cycle_pools();
        let evaluator = ProfitEvaluator::new(&pools);
        assert_eq!(evaluator.evaluate(&[]).unwrap(), 1.0);
    }
}
