//! Error types for the scanner.

use thiserror::Error;

use crate::cartographer::Token;

/// Failures the scan pipeline can surface. Everything else is either a
/// silent skip (degenerate pools, non-finite rates) or lives at the binary
/// edge as `eyre`.
#[derive(Error, Debug)]
pub enum ScanError {
    /// Pool data fetch failed; the driving loop retries next tick.
    #[error("pool provider failure: {0}")]
    Provider(String),

    /// A detected cycle has a hop no pool can price; the candidate is
    /// dropped, not a scan failure.
    #[error("no pool can price hop {from} -> {to}")]
    UnresolvedHop { from: Token, to: Token },
}

impl From<reqwest::Error> for ScanError {
    fn from(e: reqwest::Error) -> Self {
        ScanError::Provider(e.to_string())
    }
}
