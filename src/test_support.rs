//! Shared fixtures and in-memory chain / market data doubles for unit tests

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use eyre::{eyre, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::chain::ChainReader;
use crate::error::ResolutionError;
use crate::market_data::MarketDataSource;
use crate::session::{NetworkContext, WalletSession};
use crate::types::{MarketMetadata, PoolId, VixPoolData};

pub const POOL_A: PoolId = PoolId::new(Address::with_last_byte(0xa1));
pub const POOL_B: PoolId = PoolId::new(Address::with_last_byte(0xb2));
pub const REAL_POOL: Address = Address::with_last_byte(0x99);
pub const WALLET: Address = Address::with_last_byte(0x77);
pub const ONE_ETHER: u128 = 1_000_000_000_000_000_000;

pub fn sample_vix_data() -> VixPoolData {
    VixPoolData {
        high_token: Address::with_last_byte(0x11),
        low_token: Address::with_last_byte(0x22),
        circulation0: U256::from(500u64),
        circulation1: U256::from(700u64),
        contract_holdings0: U256::from(1_000u64),
        contract_holdings1: U256::from(2_000u64),
        reserve0: U256::from(10_000u64),
        reserve1: U256::from(20_000u64),
        pool_address: Address::with_last_byte(0x33),
    }
}

pub fn sample_metadata() -> MarketMetadata {
    MarketMetadata {
        name: "BTC-VOL / USDT".to_string(),
        symbol: "BTC-VOL/USDT".to_string(),
        icon0: "https://img/btc.png".to_string(),
        icon1: None,
        change_24h: Some(2.4),
        market_cap_usd: Some(200_000.0),
        volume_24h_usd: Some(12_000_000.0),
    }
}

pub fn connected(chain: Arc<dyn ChainReader>) -> NetworkContext {
    NetworkContext::new(chain).with_wallet(WalletSession {
        address: WALLET,
        chain_id: 11155111,
    })
}

pub fn disconnected(chain: Arc<dyn ChainReader>) -> NetworkContext {
    NetworkContext::new(chain)
}

// ============================================
// CHAIN DOUBLE
// ============================================

#[derive(Default)]
pub struct MockChain {
    /// `None` makes `getVixData` revert
    pub vix: Option<VixPoolData>,
    /// `None` makes `getRealPoolAddress` revert
    pub real_pool: Option<Address>,
    /// holdings -> raw price; missing holdings revert
    pub prices: HashMap<U256, U256>,
    /// `getRealPoolAddress` never returns
    pub hang_real_pool: bool,
    /// `getVixData` for these pools waits until notified
    pub gates: HashMap<Address, Arc<Notify>>,
    pub calls: AtomicUsize,
}

impl MockChain {
    pub fn healthy() -> Self {
        let vix = sample_vix_data();
        let mut prices = HashMap::new();
        prices.insert(vix.contract_holdings0, U256::from(ONE_ETHER));
        prices.insert(vix.contract_holdings1, U256::from(ONE_ETHER / 4));

        Self {
            vix: Some(vix),
            real_pool: Some(REAL_POOL),
            prices,
            ..Default::default()
        }
    }

    /// Hold `getVixData` for `pool` until the returned handle is notified
    pub fn gate(&mut self, pool: PoolId) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.gates.insert(pool.address(), notify.clone());
        notify
    }
}

#[async_trait]
impl ChainReader for MockChain {
    async fn get_vix_data(&self, pool: Address) -> Result<VixPoolData> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = self.gates.get(&pool) {
            gate.notified().await;
        }
        self.vix.clone().ok_or_else(|| eyre!("execution reverted"))
    }

    async fn real_pool_address(&self, _pool: Address) -> Result<Address> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.hang_real_pool {
            std::future::pending::<()>().await;
        }
        self.real_pool.ok_or_else(|| eyre!("execution reverted"))
    }

    async fn vix_tokens_price(&self, contract_holdings: U256) -> Result<U256> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prices
            .get(&contract_holdings)
            .copied()
            .ok_or_else(|| eyre!("execution reverted: no price for {}", contract_holdings))
    }
}

// ============================================
// MARKET DATA DOUBLE
// ============================================

pub struct MockMarket {
    result: Result<MarketMetadata, ResolutionError>,
    /// Never answer, to exercise timeouts
    pub hang: bool,
    requested: Mutex<Vec<Address>>,
    pub calls: AtomicUsize,
}

impl MockMarket {
    pub fn healthy() -> Self {
        Self::with_result(Ok(sample_metadata()))
    }

    pub fn failing(error: ResolutionError) -> Self {
        Self::with_result(Err(error))
    }

    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Self::healthy()
        }
    }

    fn with_result(result: Result<MarketMetadata, ResolutionError>) -> Self {
        Self {
            result,
            hang: false,
            requested: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Real pool addresses fetched so far
    pub fn requested(&self) -> Vec<Address> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl MarketDataSource for MockMarket {
    async fn fetch_pool(&self, real_pool: Address) -> Result<MarketMetadata, ResolutionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().unwrap().push(real_pool);
        if self.hang {
            std::future::pending::<()>().await;
        }
        self.result.clone()
    }
}
