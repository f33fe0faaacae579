//! Scanner Configuration
//!
//! Everything the driving loop needs, from environment variables (with
//! `.env` support) or a TOML file. The engine itself takes no configuration:
//! a scan is a pure function of the snapshot set.

use eyre::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// Default Balancer subgraph endpoint (mainnet, weighted pools).
const DEFAULT_SUBGRAPH_URL: &str =
    "https://api.thegraph.com/subgraphs/name/balancer-labs/balancer";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // ========== Pool Provider ==========
    /// Subgraph endpoint serving the weighted-pool set
    pub subgraph_url: String,

    /// Pools per page (subgraph `first`, capped at 1000 by the service)
    pub page_size: usize,

    /// Hard cap on pools per scan
    pub max_pools: usize,

    // ========== Scan Cadence ==========
    /// Seconds between scans (~1 block by default)
    pub scan_interval_secs: u64,

    // ========== Reporting ==========
    /// Multiplicative return at which a loop is highlighted and logged
    /// (1.0 = anything that breaks even before fees)
    pub min_profit_ratio: f64,

    /// Enable the JSONL opportunity log
    pub opportunity_log: bool,

    /// Where the JSONL log goes
    pub opportunity_log_path: String,

    // ========== Safety ==========
    /// Consecutive provider failures before pausing
    pub max_consecutive_failures: u32,

    /// Pause duration after too many failures (seconds)
    pub failure_pause_secs: u64,
}

impl Config {
    /// Load configuration from environment variables and .env file
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            subgraph_url: env::var("SUBGRAPH_URL")
                .unwrap_or_else(|_| DEFAULT_SUBGRAPH_URL.to_string()),
            page_size: env::var("PAGE_SIZE")
                .unwrap_or_else(|_| "100".to_string())
                .parse()
                .unwrap_or(100),
            max_pools: env::var("MAX_POOLS")
                .unwrap_or_else(|_| "2000".to_string())
                .parse()
                .unwrap_or(2000),
            scan_interval_secs: env::var("SCAN_INTERVAL_SECS")
                .unwrap_or_else(|_| "12".to_string())
                .parse()
                .unwrap_or(12),
            min_profit_ratio: env::var("MIN_PROFIT_RATIO")
                .unwrap_or_else(|_| "1.0".to_string())
                .parse()
                .unwrap_or(1.0),
            opportunity_log: env::var("OPPORTUNITY_LOG")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
            opportunity_log_path: env::var("OPPORTUNITY_LOG_PATH")
                .unwrap_or_else(|_| "./logs/opportunities.log".to_string()),
            max_consecutive_failures: env::var("MAX_CONSECUTIVE_FAILURES")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .unwrap_or(5),
            failure_pause_secs: env::var("FAILURE_PAUSE_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap_or(60),
        })
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration before the first scan
    pub fn validate(&self) -> Result<()> {
        if self.subgraph_url.is_empty() || !self.subgraph_url.starts_with("http") {
            return Err(eyre::eyre!(
                "Invalid SUBGRAPH_URL - expected an http(s) endpoint"
            ));
        }
        if self.page_size == 0 || self.page_size > 1000 {
            return Err(eyre::eyre!(
                "PAGE_SIZE must be between 1 and 1000 (currently {})",
                self.page_size
            ));
        }
        if self.max_pools == 0 {
            return Err(eyre::eyre!("MAX_POOLS must be positive"));
        }
        if self.scan_interval_secs == 0 {
            return Err(eyre::eyre!("SCAN_INTERVAL_SECS must be at least 1"));
        }
        if self.min_profit_ratio <= 0.0 || !self.min_profit_ratio.is_finite() {
            return Err(eyre::eyre!(
                "MIN_PROFIT_RATIO must be a positive number (currently {})",
                self.min_profit_ratio
            ));
        }

        Ok(())
    }

    /// Print configuration summary
    pub fn print_summary(&self) {
        println!("╔════════════════════════════════════════════════════════════╗");
        println!("║              THE PROWLER - CONFIGURATION                   ║");
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ POOL PROVIDER                                              ║");
        println!("║ • Page Size:       {:^40} ║", self.page_size);
        println!("║ • Max Pools:       {:^40} ║", self.max_pools);
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ SCAN                                                       ║");
        println!("║ • Interval:        {:>36} secs ║", self.scan_interval_secs);
        println!("║ • Profit Ratio:    {:<40.4} ║", self.min_profit_ratio);
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ SAFETY                                                     ║");
        println!("║ • Max Failures:    {:^40} ║", self.max_consecutive_failures);
        println!("║ • Failure Pause:   {:>36} secs ║", self.failure_pause_secs);
        println!("║ • Opportunity Log: {:^40} ║",
            if self.opportunity_log { "✓ Enabled" } else { "✗ Disabled" }
        );
        println!("╚════════════════════════════════════════════════════════════╝");
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            subgraph_url: DEFAULT_SUBGRAPH_URL.to_string(),
            page_size: 100,
            max_pools: 2000,
            scan_interval_secs: 12,
            min_profit_ratio: 1.0,
            opportunity_log: true,
            opportunity_log_path: "./logs/opportunities.log".to_string(),
            max_consecutive_failures: 5,
            failure_pause_secs: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.scan_interval_secs, 12);
        assert_eq!(config.min_profit_ratio, 1.0);
    }

    #[test]
    fn test_bad_page_size_rejected() {
        let config = Config {
            page_size: 5000,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_endpoint_rejected() {
        let config = Config {
            subgraph_url: "not-a-url".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.subgraph_url, config.subgraph_url);
        assert_eq!(parsed.max_pools, config.max_pools);
    }
}
