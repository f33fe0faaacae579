//! Phase 2: The Brain
//!
//! Responsible for:
//! - Finding negative cycles (arbitrage loops) via Bellman-Ford
//! - Pricing each discovered loop straight from the snapshots

mod bellman_ford;
mod evaluator;

pub use bellman_ford::{CycleFinder, CycleTrace};
pub use evaluator::ProfitEvaluator;
