//! Configuration for vixview
//!
//! Read from the environment (and `.env`) or a TOML file. The four endpoint
//! settings are required; a missing one is a startup error, never a
//! resolution error.

use alloy_primitives::Address;
use eyre::{eyre, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::session::WalletSession;

// ============================================
// DEFAULTS
// ============================================

/// Sepolia
const DEFAULT_CHAIN_ID: u64 = 11155111;

const DEFAULT_EXPLORER_URL: &str = "https://sepolia.etherscan.io";

/// Per network call (each eth_call and the market data fetch)
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Fractional digits shown for prices (exact value is always kept)
const DEFAULT_DISPLAY_DECIMALS: usize = 6;

// ============================================
// MAIN CONFIGURATION
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    // ========== Chain ==========
    /// JSON-RPC endpoint used for all view calls
    pub rpc_url: String,

    /// VIX pair data contract (`getVixData`, `vixTokensPrice`)
    pub vix_contract_address: Address,

    pub chain_id: u64,

    /// Block explorer base for token links
    pub explorer_url: String,

    // ========== Market Data ==========
    /// Market data API base URL (GeckoTerminal v2 layout)
    pub market_data_url: String,

    /// Network slug in market data URLs, e.g. `sepolia-testnet`
    pub network: String,

    // ========== Behaviour ==========
    pub request_timeout_secs: u64,

    pub display_decimals: usize,

    /// Wallets reported as connected by the session layer
    #[serde(default)]
    pub wallet_addresses: Vec<Address>,
}

impl Config {
    /// Load configuration from environment variables and .env file
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup (environment, map, ...)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| eyre!("Missing required configuration: {}", key))
        };

        let vix_contract = required("VIX_CONTRACT_ADDRESS")?;
        let vix_contract_address = Address::from_str(&vix_contract)
            .map_err(|e| eyre!("Invalid VIX_CONTRACT_ADDRESS {:?}: {}", vix_contract, e))?;

        let wallet_addresses = match lookup("WALLET_ADDRESSES") {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| {
                    Address::from_str(s).map_err(|e| eyre!("Invalid wallet address {:?}: {}", s, e))
                })
                .collect::<Result<Vec<_>>>()?,
            None => Vec::new(),
        };

        Ok(Self {
            rpc_url: required("RPC_URL")?,
            vix_contract_address,
            chain_id: lookup("CHAIN_ID")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_CHAIN_ID),
            explorer_url: lookup("EXPLORER_URL")
                .unwrap_or_else(|| DEFAULT_EXPLORER_URL.to_string()),
            market_data_url: required("MARKET_DATA_URL")?,
            network: required("NETWORK")?,
            request_timeout_secs: lookup("REQUEST_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            display_decimals: lookup("DISPLAY_DECIMALS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_DISPLAY_DECIMALS),
            wallet_addresses,
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

    /// Validate configuration before building any client
    pub fn validate(&self) -> Result<()> {
        for (key, url) in [
            ("RPC_URL", &self.rpc_url),
            ("MARKET_DATA_URL", &self.market_data_url),
            ("EXPLORER_URL", &self.explorer_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(eyre!("{} must be an http(s) URL (got {:?})", key, url));
            }
        }

        if self.network.contains('/') || self.network.trim().is_empty() {
            return Err(eyre!("NETWORK must be a bare slug (got {:?})", self.network));
        }
        if self.vix_contract_address == Address::ZERO {
            return Err(eyre!("VIX_CONTRACT_ADDRESS is the zero address"));
        }
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 120 {
            return Err(eyre!(
                "REQUEST_TIMEOUT_SECS should be between 1-120 (currently {})",
                self.request_timeout_secs
            ));
        }
        if self.display_decimals > 18 {
            return Err(eyre!(
                "DISPLAY_DECIMALS cannot exceed 18 (currently {})",
                self.display_decimals
            ));
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn wallet_sessions(&self) -> Vec<WalletSession> {
        self.wallet_addresses
            .iter()
            .map(|address| WalletSession {
                address: *address,
                chain_id: self.chain_id,
            })
            .collect()
    }

    /// Print configuration summary
    pub fn print_summary(&self) {
        println!("╔════════════════════════════════════════════════════════════╗");
        println!("║                 VIXVIEW - CONFIGURATION                    ║");
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ Chain ID:          {:^40} ║", self.chain_id);
        println!("║ Network:           {:^40} ║", self.network);
        println!("║ VIX Contract:      {:^40} ║", self.vix_contract_address.to_checksum(None));
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ Timeout:           {:>38}s ║", self.request_timeout_secs);
        println!("║ Price Decimals:    {:^40} ║", self.display_decimals);
        println!("║ Wallets:           {:^40} ║",
            if self.wallet_addresses.is_empty() {
                "✗ None connected".to_string()
            } else {
                format!("✓ {} connected", self.wallet_addresses.len())
            }
        );
        println!("╚════════════════════════════════════════════════════════════╝");
    }
}

// ============================================
// TESTS
// ============================================
