//! Phase 1: The Cartographer (Data Ingest)
//!
//! Pool census from the subgraph, snapshot types, and the exchange graph.

mod graph;
mod provider;
mod snapshot;

pub use graph::{EdgeData, ExchangeGraph};
pub use provider::PoolProvider;
pub use snapshot::{PoolSnapshot, Reserve, Token};
