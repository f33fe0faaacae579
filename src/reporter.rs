//! Opportunity Sink
//!
//! Styled console lines for every priced loop, plus an append-only JSONL
//! log of the ones at or above the configured profit ratio. The engine
//! defines the record shape; persistence beyond the log file is someone
//! else's concern.

use chrono::{DateTime, Utc};
use console::style;
use eyre::Result;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::cartographer::{PoolSnapshot, Token};
use crate::engine::Opportunity;
use crate::tokens::known_symbol;

/// One JSONL record per reported opportunity.
#[derive(Debug, Clone, Serialize)]
pub struct OpportunityRecord {
    pub timestamp: DateTime<Utc>,
    pub path: Vec<Token>,
    pub symbols: Vec<String>,
    pub profit: f64,
}

impl OpportunityRecord {
    pub fn append_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = fs::OpenOptions::new().create(true).append(true).open(path)?;
        let json = serde_json::to_string(self)?;
        writeln!(file, "{}", json)?;

        Ok(())
    }
}

/// Symbol table for display: provider-reported symbols first, the known
/// mainnet registry as fallback.
pub fn symbol_table(pools: &[PoolSnapshot]) -> HashMap<Token, String> {
    let mut table = HashMap::new();
    for pool in pools {
        for reserve in &pool.reserves {
            if let Some(symbol) = &reserve.symbol {
                table.entry(reserve.token.clone()).or_insert_with(|| symbol.clone());
            }
        }
    }
    table
}

fn format_token(token: &Token, symbols: &HashMap<Token, String>) -> String {
    if let Some(symbol) = symbols.get(token) {
        return symbol.clone();
    }
    if let Some(symbol) = known_symbol(token) {
        return symbol.to_string();
    }
    token.short()
}

pub fn format_path(path: &[Token], symbols: &HashMap<Token, String>) -> String {
    path.iter()
        .map(|t| format_token(t, symbols))
        .collect::<Vec<_>>()
        .join(" → ")
}

/// Console + JSONL sink.
pub struct Reporter {
    min_profit_ratio: f64,
    log_path: Option<String>,
}

impl Reporter {
    pub fn new(min_profit_ratio: f64, log_path: Option<String>) -> Self {
        Self {
            min_profit_ratio,
            log_path,
        }
    }

    /// Emit every opportunity of one scan. Returns how many cleared the
    /// profit ratio.
    pub fn report(
        &self,
        opportunities: &[Opportunity],
        symbols: &HashMap<Token, String>,
    ) -> Result<usize> {
        if opportunities.is_empty() {
            println!("{}", style("No arbitrage loops this scan.").dim());
            return Ok(0);
        }

        let mut highlighted = 0;

        for opp in opportunities {
            let path = format_path(&opp.path, symbols);
            let profitable = opp.profit >= self.min_profit_ratio;

            let status = if profitable {
                style("💰 ARBITRAGE").green().bold()
            } else {
                style("○ below threshold").yellow()
            };

            println!(
                "  {} | {} | {:.6}x ({:+.4}%)",
                status,
                style(&path).cyan(),
                opp.profit,
                opp.profit_percentage()
            );

            if profitable {
                highlighted += 1;
                if let Some(log_path) = &self.log_path {
                    let record = OpportunityRecord {
                        timestamp: Utc::now(),
                        path: opp.path.clone(),
                        symbols: opp.path.iter().map(|t| format_token(t, symbols)).collect(),
                        profit: opp.profit,
                    };
                    record.append_to_file(log_path)?;
                }
            }
        }

        if highlighted > 0 {
            info!(
                "{} of {} loops at or above the {:.4}x threshold",
                highlighted,
                opportunities.len(),
                self.min_profit_ratio
            );
        }

        Ok(highlighted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartographer::Reserve;

    #[test]
    fn test_symbol_table_prefers_provider_symbols() {
        let weth = Token::new("0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2");
        let mystery = Token::new("0x00000000000000000000000000000000000000aa");

        let pools = vec![PoolSnapshot::new(
            "p",
            vec![
                Reserve::new(weth.clone(), 1.0, 0.5).with_symbol("WETH9"),
                Reserve::new(mystery.clone(), 1.0, 0.5),
            ],
        )];

        let table = symbol_table(&pools);
        assert_eq!(format_token(&weth, &table), "WETH9");
        // No provider symbol, not in the registry: truncated address
        assert_eq!(format_token(&mystery, &table), "0x000000...");
    }

    #[test]
    fn test_known_registry_fallback() {
        let weth = Token::new("0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2");
        let table = HashMap::new();
        assert_eq!(format_token(&weth, &table), "WETH");
    }

    #[test]
    fn test_format_path() {
        let a = Token::new("aaa");
        let b = Token::new("bbb");
        let mut table = HashMap::new();
        table.insert(a.clone(), "A".to_string());
        table.insert(b.clone(), "B".to_string());

        let path = vec![a.clone(), b, a];
        assert_eq!(format_path(&path, &table), "A → B → A");
    }
}
