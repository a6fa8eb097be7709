//! Resolution error taxonomy
//!
//! Every failure of a single `resolve` call is one of these. None of them are
//! retried inside the resolver; retry is always the caller's decision.

use thiserror::Error;

/// The resolution step a failure originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolveStep {
    /// Wallet / provider availability check
    Availability,
    /// `getVixData(poolId)` on the pair data contract
    VixData,
    /// `getRealPoolAddress()` on the pool proxy
    RealPoolAddress,
    /// Off-chain market data fetch
    Metadata,
    /// `vixTokensPrice(contractHoldings0)`
    HighPrice,
    /// `vixTokensPrice(contractHoldings1)`
    LowPrice,
}

impl std::fmt::Display for ResolveStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveStep::Availability => write!(f, "availability"),
            ResolveStep::VixData => write!(f, "getVixData"),
            ResolveStep::RealPoolAddress => write!(f, "getRealPoolAddress"),
            ResolveStep::Metadata => write!(f, "market-data"),
            ResolveStep::HighPrice => write!(f, "vixTokensPrice(high)"),
            ResolveStep::LowPrice => write!(f, "vixTokensPrice(low)"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// No wallet connected yet. Not a failure: re-resolve once one connects.
    #[error("no wallet connected yet")]
    NotReady,

    #[error("chain read failed at {step}: {reason}")]
    ChainRead { step: ResolveStep, reason: String },

    /// `status` is `None` when the request never produced a response
    /// (connect error, timeout).
    #[error("market data fetch failed (status {status:?}): {reason}")]
    MetadataFetch { status: Option<u16>, reason: String },

    #[error("malformed market data response: {0}")]
    MalformedResponse(String),
}

impl ResolutionError {
    /// Step this error is attributed to, for logging
    pub fn step(&self) -> ResolveStep {
        match self {
            ResolutionError::NotReady => ResolveStep::Availability,
            ResolutionError::ChainRead { step, .. } => *step,
            ResolutionError::MetadataFetch { .. } | ResolutionError::MalformedResponse(_) => {
                ResolveStep::Metadata
            }
        }
    }

    /// Whether the caller should simply wait (wallet not yet connected)
    /// rather than show a failed state.
    pub fn is_not_ready(&self) -> bool {
        matches!(self, ResolutionError::NotReady)
    }

    pub(crate) fn chain(step: ResolveStep, err: impl std::fmt::Display) -> Self {
        ResolutionError::ChainRead {
            step,
            reason: err.to_string(),
        }
    }
}
