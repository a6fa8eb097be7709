//! Read-only contract interfaces for the VIX pair data contract and the
//! pool proxy.

use alloy_sol_types::sol;

use crate::types::VixPoolData;

// ============================================
// SOLIDITY INTERFACES
// ============================================

sol! {
    /// VIX pair data contract
    #[derive(Debug)]
    interface IVixPair {
        function getVixData(address poolAdd) external view returns (
            address vixHighToken,
            address vixLowToken,
            uint256 circulation0,
            uint256 circulation1,
            uint256 contractHoldings0,
            uint256 contractHoldings1,
            uint256 reserve0,
            uint256 reserve1,
            address poolAddress
        );

        // Fixed-point price (1e18 scale) for a given holdings amount
        function vixTokensPrice(uint256 contractHoldings) external view returns (uint256);
    }

    /// Pool proxy deployed at the pool id; maps to the pool the market data
    /// API indexes
    #[derive(Debug)]
    interface IPoolProxy {
        function getRealPoolAddress() external view returns (address);
    }
}

impl From<IVixPair::getVixDataReturn> for VixPoolData {
    fn from(r: IVixPair::getVixDataReturn) -> Self {
        Self {
            high_token: r.vixHighToken,
            low_token: r.vixLowToken,
            circulation0: r.circulation0,
            circulation1: r.circulation1,
            contract_holdings0: r.contractHoldings0,
            contract_holdings1: r.contractHoldings1,
            reserve0: r.reserve0,
            reserve1: r.reserve1,
            pool_address: r.poolAddress,
        }
    }
}
