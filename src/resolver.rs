//! Pool View Resolver
//!
//! Turns a pool id into a `TokenPairView`:
//!
//! 1. Availability - no connected wallet means `NotReady`, nothing is sent
//! 2. `getVixData(poolId)` on the pair data contract
//! 3. `getRealPoolAddress()` on the pool proxy at `poolId`
//! 4. Market data for the real pool (after 3)
//! 5. `vixTokensPrice` for both holdings (after 2)
//! 6. Assembly
//!
//! 2+3 run concurrently, then 4+5. Every network call is bounded by the
//! configured timeout. Nothing is cached and nothing is retried here.

use alloy_primitives::Address;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, error, info};

use crate::error::{ResolutionError, ResolveStep};
use crate::market_data::MarketDataSource;
use crate::session::NetworkContext;
use crate::types::{Money, PairPrices, PoolId, PriceSelector, TokenPairView};

pub struct PoolViewResolver {
    market: Arc<dyn MarketDataSource>,
    call_timeout: Duration,
}

impl PoolViewResolver {
    pub fn new(market: Arc<dyn MarketDataSource>, call_timeout: Duration) -> Self {
        Self {
            market,
            call_timeout,
        }
    }

    /// Resolve `pool` into a view projected onto `selector`.
    ///
    /// Failures are logged with step and pool id before being returned.
    pub async fn resolve(
        &self,
        pool: PoolId,
        selector: PriceSelector,
        network: &NetworkContext,
    ) -> Result<TokenPairView, ResolutionError> {
        let result = self.run(pool, selector, network).await;

        match &result {
            Ok(_) => {}
            Err(e) if e.is_not_ready() => {
                debug!("⏳ No wallet connected yet, pool {} not resolved", pool);
            }
            Err(e) => {
                error!(step = %e.step(), pool = %pool, "❌ Resolution failed: {}", e);
            }
        }

        result
    }

    async fn run(
        &self,
        pool: PoolId,
        selector: PriceSelector,
        network: &NetworkContext,
    ) -> Result<TokenPairView, ResolutionError> {
        if !network.is_connected() {
            return Err(ResolutionError::NotReady);
        }

        let start = Instant::now();
        let chain = network.chain();
        let pool_address = pool.address();

        let (vix, real_pool) = futures::try_join!(
            self.chain_step(ResolveStep::VixData, chain.get_vix_data(pool_address)),
            self.chain_step(
                ResolveStep::RealPoolAddress,
                chain.real_pool_address(pool_address)
            ),
        )?;
        debug!(
            "📊 Pool {}: high {} / low {}, real pool {}",
            pool, vix.high_token, vix.low_token, real_pool
        );

        let (metadata, high_raw, low_raw) = futures::try_join!(
            self.metadata_step(real_pool),
            self.chain_step(
                ResolveStep::HighPrice,
                chain.vix_tokens_price(vix.contract_holdings0)
            ),
            self.chain_step(
                ResolveStep::LowPrice,
                chain.vix_tokens_price(vix.contract_holdings1)
            ),
        )?;

        let prices = PairPrices {
            high: Money::from_raw(high_raw),
            low: Money::from_raw(low_raw),
        };
        let view = TokenPairView::assemble(pool, selector, &vix, real_pool, metadata, prices);

        info!(
            "✓ Resolved {} ({}) in {:?}: high {} / low {}",
            view.name,
            pool,
            start.elapsed(),
            view.high_price,
            view.low_price
        );

        Ok(view)
    }

    async fn chain_step<T, F>(&self, step: ResolveStep, call: F) -> Result<T, ResolutionError>
    where
        F: Future<Output = eyre::Result<T>>,
    {
        match timeout(self.call_timeout, call).await {
            Ok(Ok(value)) => {
                debug!("  {} ok", step);
                Ok(value)
            }
            Ok(Err(e)) => Err(ResolutionError::chain(step, format!("{:#}", e))),
            Err(_) => Err(ResolutionError::chain(
                step,
                format!("timed out after {:?}", self.call_timeout),
            )),
        }
    }

    async fn metadata_step(
        &self,
        real_pool: Address,
    ) -> Result<crate::types::MarketMetadata, ResolutionError> {
        match timeout(self.call_timeout, self.market.fetch_pool(real_pool)).await {
            Ok(result) => result,
            Err(_) => Err(ResolutionError::MetadataFetch {
                status: None,
                reason: format!("timed out after {:?}", self.call_timeout),
            }),
        }
    }
}
