//! Core data model: pool identifiers, on-chain snapshot, market metadata and
//! the resolved `TokenPairView` handed to presentation collaborators.

use alloy_primitives::{Address, U256};
use chrono::{DateTime, Utc};
use eyre::eyre;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::units::{format_compact_usd, format_ether, truncate_decimal};

/// Shown for statistics neither the chain nor the market data API provides
pub const NOT_AVAILABLE: &str = "n/a";

// ============================================
// IDENTIFIERS
// ============================================

/// Address of the pool proxy a view is resolved for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoolId(Address);

impl PoolId {
    pub const fn new(address: Address) -> Self {
        Self(address)
    }

    pub fn address(&self) -> Address {
        self.0
    }
}

impl FromStr for PoolId {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let address = Address::from_str(s.trim())
            .map_err(|e| eyre!("invalid pool id {:?}: {}", s, e))?;
        Ok(Self::new(address))
    }
}

impl std::fmt::Display for PoolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_checksum(None))
    }
}

/// Which side of the pair `TokenPairView::price` shows
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum PriceSelector {
    #[default]
    High,
    Low,
}

impl PriceSelector {
    /// Badge text next to the pair name
    pub fn label(&self) -> &'static str {
        match self {
            PriceSelector::High => "HIGH",
            PriceSelector::Low => "LOW",
        }
    }
}

impl std::fmt::Display for PriceSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriceSelector::High => write!(f, "high"),
            PriceSelector::Low => write!(f, "low"),
        }
    }
}

// ============================================
// ON-CHAIN SNAPSHOT
// ============================================

/// One `getVixData` read. Never cached across resolutions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VixPoolData {
    pub high_token: Address,
    pub low_token: Address,
    pub circulation0: U256,
    pub circulation1: U256,
    /// Input to `vixTokensPrice` for the high token
    pub contract_holdings0: U256,
    /// Input to `vixTokensPrice` for the low token
    pub contract_holdings1: U256,
    pub reserve0: U256,
    pub reserve1: U256,
    pub pool_address: Address,
}

// ============================================
// MONEY
// ============================================

/// Exact 18-decimal fixed-point amount
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    raw: U256,
    decimal: String,
}

impl Money {
    pub fn from_raw(raw: U256) -> Self {
        Self {
            raw,
            decimal: format_ether(raw),
        }
    }

    pub fn raw(&self) -> U256 {
        self.raw
    }

    /// Exact decimal string, e.g. `"1.0"`
    pub fn decimal(&self) -> &str {
        &self.decimal
    }

    /// Truncated display form with the `$` suffix, e.g. `"0.052341$"`
    pub fn display(&self, places: usize) -> String {
        format!("{}$", truncate_decimal(&self.decimal, places))
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}$", self.decimal)
    }
}

// ============================================
// MARKET METADATA
// ============================================

/// Off-chain descriptive data for the real pool
#[derive(Debug, Clone, PartialEq)]
pub struct MarketMetadata {
    pub name: String,
    pub symbol: String,
    pub icon0: String,
    pub icon1: Option<String>,
    /// 24h price change in percent
    pub change_24h: Option<f64>,
    /// Market cap in USD, FDV when the API has no market cap
    pub market_cap_usd: Option<f64>,
    pub volume_24h_usd: Option<f64>,
}

// ============================================
// RESOLVED VIEW
// ============================================

/// High and low token prices from `vixTokensPrice`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairPrices {
    pub high: Money,
    pub low: Money,
}

/// The sole payload handed to chart, trading widget and link list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairView {
    pub id: PoolId,
    pub name: String,
    pub symbol: String,
    pub selector: PriceSelector,
    pub price: Money,
    pub high_price: Money,
    pub low_price: Money,
    #[serde(rename = "change24h")]
    pub change_24h: f64,
    pub market_cap: String,
    #[serde(rename = "averageIV")]
    pub average_iv: String,
    pub volume: String,
    pub icon0: String,
    pub icon1: Option<String>,
    pub high_token_address: Address,
    pub low_token_address: Address,
    pub real_pool_address: Address,
    pub resolved_at: DateTime<Utc>,
}

impl TokenPairView {
    /// Combine one on-chain snapshot, its prices and the market metadata.
    ///
    /// Token addresses are taken from `vix`, the same read whose holdings
    /// produced `prices`.
    pub fn assemble(
        pool: PoolId,
        selector: PriceSelector,
        vix: &VixPoolData,
        real_pool_address: Address,
        metadata: MarketMetadata,
        prices: PairPrices,
    ) -> Self {
        let price = match selector {
            PriceSelector::High => prices.high.clone(),
            PriceSelector::Low => prices.low.clone(),
        };

        Self {
            id: pool,
            name: metadata.name,
            symbol: metadata.symbol,
            selector,
            price,
            high_price: prices.high,
            low_price: prices.low,
            change_24h: metadata.change_24h.unwrap_or(0.0),
            market_cap: metadata
                .market_cap_usd
                .map(format_compact_usd)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            average_iv: NOT_AVAILABLE.to_string(),
            volume: metadata
                .volume_24h_usd
                .map(format_compact_usd)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            icon0: metadata.icon0,
            icon1: metadata.icon1,
            high_token_address: vix.high_token,
            low_token_address: vix.low_token,
            real_pool_address,
            resolved_at: Utc::now(),
        }
    }

    /// Re-project onto another selector. Pure: no network involved.
    pub fn with_selector(mut self, selector: PriceSelector) -> Self {
        self.price = match selector {
            PriceSelector::High => self.high_price.clone(),
            PriceSelector::Low => self.low_price.clone(),
        };
        self.selector = selector;
        self
    }

    /// Block explorer pages for the high and low token
    pub fn explorer_links(&self, explorer_url: &str) -> ExplorerLinks {
        let base = explorer_url.trim_end_matches('/');
        ExplorerLinks {
            high_token: format!("{}/address/{}", base, self.high_token_address.to_checksum(None)),
            low_token: format!("{}/address/{}", base, self.low_token_address.to_checksum(None)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerLinks {
    pub high_token: String,
    pub low_token: String,
}
