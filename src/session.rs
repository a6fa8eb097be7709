//! Explicit wallet session / network context passed into every resolution

use alloy_primitives::Address;
use std::sync::Arc;

use crate::chain::ChainReader;

/// A wallet the host's session layer reports as connected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletSession {
    pub address: Address,
    pub chain_id: u64,
}

/// Connected wallets plus the shared read-only chain connection.
///
/// Built by the caller from its own session management; the resolver never
/// looks at global wallet state.
#[derive(Clone)]
pub struct NetworkContext {
    wallets: Vec<WalletSession>,
    chain: Arc<dyn ChainReader>,
}

impl NetworkContext {
    /// Context with no wallet connected yet
    pub fn new(chain: Arc<dyn ChainReader>) -> Self {
        Self {
            wallets: Vec::new(),
            chain,
        }
    }

    pub fn with_wallet(mut self, wallet: WalletSession) -> Self {
        self.wallets.push(wallet);
        self
    }

    pub fn wallets(&self) -> &[WalletSession] {
        &self.wallets
    }

    pub fn primary_wallet(&self) -> Option<&WalletSession> {
        self.wallets.first()
    }

    pub fn is_connected(&self) -> bool {
        !self.wallets.is_empty()
    }

    pub fn chain(&self) -> &Arc<dyn ChainReader> {
        &self.chain
    }

    /// Identity of the connected wallet set, used to detect wallet changes.
    /// A wallet switching network counts as a change.
    pub fn wallet_key(&self) -> Vec<(Address, u64)> {
        self.wallets.iter().map(|w| (w.address, w.chain_id)).collect()
    }
}

impl std::fmt::Debug for NetworkContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkContext")
            .field("wallets", &self.wallets)
            .finish_non_exhaustive()
    }
}
