//! Pool Snapshots
//!
//! Step 1.1b: The Ledger
//!
//! Strongly-typed view of one weighted pool at scan time. A snapshot is
//! immutable once captured; every scan fetches a fresh set.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A token identifier (lowercased address), compared by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    pub fn new(address: impl AsRef<str>) -> Self {
        Self(address.as_ref().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short display form: `0xc02aaa...` for addresses, the raw string otherwise.
    pub fn short(&self) -> String {
        if self.0.len() > 10 && self.0.starts_with("0x") {
            format!("0x{}...", &self.0[2..8])
        } else {
            self.0.clone()
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One reserve entry of a weighted pool.
#[derive(Debug, Clone)]
pub struct Reserve {
    pub token: Token,
    /// Symbol as reported by the provider, display only.
    pub symbol: Option<String>,
    pub balance: f64,
    pub weight: f64,
}

impl Reserve {
    pub fn new(token: Token, balance: f64, weight: f64) -> Self {
        Self { token, symbol: None, balance, weight }
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// A reserve prices trades only with a positive finite balance and weight.
    pub fn is_valid(&self) -> bool {
        self.balance.is_finite() && self.balance > 0.0 && self.weight.is_finite() && self.weight > 0.0
    }

    /// Weight-normalized balance, the quantity spot rates are built from.
    fn ratio(&self) -> f64 {
        self.balance / self.weight
    }
}

/// State of one pool at scan time.
#[derive(Debug, Clone)]
pub struct PoolSnapshot {
    pub id: String,
    pub reserves: Vec<Reserve>,
}

impl PoolSnapshot {
    pub fn new(id: impl Into<String>, reserves: Vec<Reserve>) -> Self {
        Self { id: id.into(), reserves }
    }

    pub fn reserve(&self, token: &Token) -> Option<&Reserve> {
        self.reserves.iter().find(|r| &r.token == token)
    }

    /// A pool contributes edges only when it has at least two reserves and
    /// every reserve is valid. A single drained reserve poisons marginal
    /// rates through the shared invariant, so the whole pool is skipped.
    pub fn is_tradable(&self) -> bool {
        self.reserves.len() >= 2 && self.reserves.iter().all(Reserve::is_valid)
    }

    /// Marginal exchange rate from `from` to `to`:
    /// `(balance_to / weight_to) / (balance_from / weight_from)`.
    ///
    /// `None` when the pool is not tradable, either token is missing, or the
    /// rate is not a positive finite number.
    pub fn spot_rate(&self, from: &Token, to: &Token) -> Option<f64> {
        if from == to || !self.is_tradable() {
            return None;
        }
        let src = self.reserve(from)?;
        let dst = self.reserve(to)?;
        let rate = dst.ratio() / src.ratio();
        if rate.is_finite() && rate > 0.0 {
            Some(rate)
        } else {
            None
        }
    }
}
