//! Chain reader - eth_call against the pair data contract and pool proxy
//!
//! One HTTP provider is built at startup and shared read-only by every
//! resolution. All calls are view functions; nothing here signs or sends.

use alloy_network::Ethereum;
use alloy_primitives::{Address, Bytes, U256};
use alloy_provider::{Provider, ProviderBuilder};
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use eyre::{eyre, Result};
use std::sync::Arc;
use tracing::trace;

use super::contracts::{IPoolProxy, IVixPair};
use crate::types::VixPoolData;

/// Shared HTTP provider
pub type SharedProvider = Arc<dyn Provider<Ethereum> + Send + Sync>;

/// Read-only view calls the resolver depends on
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// `getVixData(pool)` on the pair data contract
    async fn get_vix_data(&self, pool: Address) -> Result<VixPoolData>;

    /// `getRealPoolAddress()` on the proxy deployed at `pool`
    async fn real_pool_address(&self, pool: Address) -> Result<Address>;

    /// `vixTokensPrice(contractHoldings)` on the pair data contract
    async fn vix_tokens_price(&self, contract_holdings: U256) -> Result<U256>;
}

pub struct RpcChainReader {
    provider: SharedProvider,
    vix_contract: Address,
}

impl RpcChainReader {
    /// Connect an HTTP provider to `rpc_url`
    pub fn connect(rpc_url: &str, vix_contract: Address) -> Result<Self> {
        let url = rpc_url
            .parse()
            .map_err(|e| eyre!("Invalid RPC URL {:?}: {}", rpc_url, e))?;
        let provider = ProviderBuilder::new().connect_http(url);

        Ok(Self::with_provider(Arc::new(provider), vix_contract))
    }

    pub fn with_provider(provider: SharedProvider, vix_contract: Address) -> Self {
        Self {
            provider,
            vix_contract,
        }
    }

    pub fn vix_contract(&self) -> Address {
        self.vix_contract
    }

    async fn call_contract(&self, to: Address, calldata: Vec<u8>) -> Result<Bytes> {
        let tx = TransactionRequest::default()
            .to(to)
            .input(calldata.into());

        let result = self
            .provider
            .call(tx)
            .await
            .map_err(|e| eyre!("eth_call to {} failed: {}", to, e))?;

        trace!("eth_call {} -> {} bytes", to, result.len());
        Ok(result)
    }
}

#[async_trait]
impl ChainReader for RpcChainReader {
    async fn get_vix_data(&self, pool: Address) -> Result<VixPoolData> {
        let calldata = IVixPair::getVixDataCall { poolAdd: pool }.abi_encode();
        let output = self.call_contract(self.vix_contract, calldata).await?;
        let decoded = IVixPair::getVixDataCall::abi_decode_returns(&output)?;
        Ok(decoded.into())
    }

    async fn real_pool_address(&self, pool: Address) -> Result<Address> {
        let calldata = IPoolProxy::getRealPoolAddressCall {}.abi_encode();
        let output = self.call_contract(pool, calldata).await?;
        let real = IPoolProxy::getRealPoolAddressCall::abi_decode_returns(&output)?;
        Ok(real)
    }

    async fn vix_tokens_price(&self, contract_holdings: U256) -> Result<U256> {
        let calldata = IVixPair::vixTokensPriceCall {
            contractHoldings: contract_holdings,
        }
        .abi_encode();
        let output = self.call_contract(self.vix_contract, calldata).await?;
        let price = IVixPair::vixTokensPriceCall::abi_decode_returns(&output)?;
        Ok(price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_rejects_bad_url() {
        assert!(RpcChainReader::connect("not a url", Address::ZERO).is_err());
    }

    #[test]
    fn test_connect_keeps_contract() {
        let reader =
            RpcChainReader::connect("http://localhost:8545", Address::with_last_byte(1)).unwrap();
        assert_eq!(reader.vix_contract(), Address::with_last_byte(1));
    }
}
