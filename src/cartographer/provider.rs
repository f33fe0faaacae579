//! Pool Data Provider
//!
//! Step 1.1: The Census Taker
//!
//! Pulls the full weighted-pool set from a Balancer-style subgraph in
//! `first`/`skip` pages. Balances and weights arrive as decimal strings;
//! anything that fails to parse degrades to a non-tradable snapshot and is
//! filtered out downstream rather than failing the scan.

use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::error::ScanError;

use super::snapshot::{PoolSnapshot, Reserve, Token};

const POOLS_QUERY: &str = r#"
query ($first: Int!, $skip: Int!) {
  pools(
    first: $first
    skip: $skip
    where: { publicSwap: true, tokensCount_gte: 2 }
    orderBy: liquidity
    orderDirection: desc
  ) {
    id
    tokens {
      address
      symbol
      balance
      denormWeight
    }
  }
}
"#;

// ============================================
// SUBGRAPH RESPONSE SHAPE
// ============================================

#[derive(Debug, Deserialize)]
struct GraphResponse {
    data: Option<PoolsData>,
    errors: Option<Vec<GraphError>>,
}

#[derive(Debug, Deserialize)]
struct GraphError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct PoolsData {
    pools: Vec<RawPool>,
}

#[derive(Debug, Deserialize)]
struct RawPool {
    id: String,
    tokens: Vec<RawPoolToken>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPoolToken {
    address: String,
    symbol: Option<String>,
    balance: String,
    denorm_weight: String,
}

impl RawPool {
    fn into_snapshot(self) -> PoolSnapshot {
        let reserves = self
            .tokens
            .into_iter()
            .map(|t| {
                // Unparseable numbers become NaN and fail the validity gate
                let balance = t.balance.parse::<f64>().unwrap_or(f64::NAN);
                let weight = t.denorm_weight.parse::<f64>().unwrap_or(f64::NAN);
                let mut reserve = Reserve::new(Token::new(&t.address), balance, weight);
                if let Some(symbol) = t.symbol {
                    reserve = reserve.with_symbol(symbol);
                }
                reserve
            })
            .collect();
        PoolSnapshot::new(self.id, reserves)
    }
}

// ============================================
// PROVIDER
// ============================================

/// Subgraph-backed pool provider.
pub struct PoolProvider {
    http: Client,
    endpoint: String,
    page_size: usize,
    max_pools: usize,
}

impl PoolProvider {
    pub fn new(endpoint: impl Into<String>, page_size: usize, max_pools: usize) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.into(),
            page_size,
            max_pools,
        }
    }

    /// Fetch the current snapshot set. A transport or GraphQL-level failure
    /// aborts this fetch only; the driving loop retries on its next tick.
    pub async fn fetch_all_pools(&self) -> Result<Vec<PoolSnapshot>, ScanError> {
        let mut pools = Vec::new();
        let mut skip = 0;

        let spinner = ProgressBar::new_spinner().with_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message("Fetching pools...");

        loop {
            let page = self.fetch_page(skip).await?;
            let page_len = page.len();

            pools.extend(page.into_iter().map(RawPool::into_snapshot));
            spinner.set_message(format!("Fetched {} pools...", pools.len()));
            spinner.tick();

            if page_len < self.page_size || pools.len() >= self.max_pools {
                break;
            }
            skip += self.page_size;
        }

        spinner.finish_and_clear();
        pools.truncate(self.max_pools);

        let tradable = pools.iter().filter(|p| p.is_tradable()).count();
        if tradable < pools.len() {
            warn!("{} of {} pools are degenerate", pools.len() - tradable, pools.len());
        }
        debug!("Fetched {} pools ({} tradable)", pools.len(), tradable);

        Ok(pools)
    }

    async fn fetch_page(&self, skip: usize) -> Result<Vec<RawPool>, ScanError> {
        let body = json!({
            "query": POOLS_QUERY,
            "variables": { "first": self.page_size, "skip": skip },
        });

        let response = self
            .http
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScanError::Provider(format!(
                "subgraph returned HTTP {}",
                status
            )));
        }

        let parsed: GraphResponse = response.json().await?;

        if let Some(errors) = parsed.errors {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            return Err(ScanError::Provider(format!(
                "subgraph query failed: {}",
                messages.join("; ")
            )));
        }

        parsed
            .data
            .map(|d| d.pools)
            .ok_or_else(|| ScanError::Provider("subgraph response had no data".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subgraph_page() {
        let raw = r#"{
            "data": {
                "pools": [
                    {
                        "id": "0xpool1",
                        "tokens": [
                            { "address": "0xAAA", "symbol": "WETH", "balance": "100.5", "denormWeight": "25" },
                            { "address": "0xBBB", "symbol": "DAI", "balance": "250000", "denormWeight": "25" }
                        ]
                    }
                ]
            }
        }"#;

        let parsed: GraphResponse = serde_json::from_str(raw).unwrap();
        let pools = parsed.data.unwrap().pools;
        assert_eq!(pools.len(), 1);

        let snapshot = pools.into_iter().next().unwrap().into_snapshot();
        assert_eq!(snapshot.id, "0xpool1");
        assert!(snapshot.is_tradable());
        assert_eq!(snapshot.reserves[0].symbol.as_deref(), Some("WETH"));
        assert!((snapshot.reserves[0].balance - 100.5).abs() < 1e-12);
        // Addresses are normalized to lowercase
        assert_eq!(snapshot.reserves[0].token.as_str(), "0xaaa");
    }

    #[test]
    fn test_unparseable_balance_degrades_to_degenerate() {
        let raw = r#"{
            "data": {
                "pools": [
                    {
                        "id": "0xbroken",
                        "tokens": [
                            { "address": "0xAAA", "symbol": null, "balance": "not-a-number", "denormWeight": "25" },
                            { "address": "0xBBB", "symbol": null, "balance": "10", "denormWeight": "25" }
                        ]
                    }
                ]
            }
        }"#;

        let parsed: GraphResponse = serde_json::from_str(raw).unwrap();
        let snapshot = parsed
            .data
            .unwrap()
            .pools
            .into_iter()
            .next()
            .unwrap()
            .into_snapshot();
        assert!(!snapshot.is_tradable());
    }

    #[test]
    fn test_graphql_error_shape() {
        let raw = r#"{ "errors": [ { "message": "indexing error" } ] }"#;
        let parsed: GraphResponse = serde_json::from_str(raw).unwrap();
        assert!(parsed.data.is_none());
        assert_eq!(parsed.errors.unwrap()[0].message, "indexing error");
    }
}
