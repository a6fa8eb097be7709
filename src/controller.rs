//! Pool View Controller - explicit re-resolution trigger
//!
//! The caller reports every change of pool id, price selector or connected
//! wallets through `request`. The controller decides whether that needs
//! network I/O at all:
//!
//! - selector change on a ready view: re-projection only
//! - same pool + wallets while loading: coalesced into the in-flight run
//! - anything else: a new resolution, aborting the previous one
//!
//! State is published on a watch channel. Every resolution carries the
//! generation it was started under; results from older generations are
//! dropped, so a superseded pool can never overwrite a newer one.

use alloy_primitives::Address;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info};

use crate::error::ResolutionError;
use crate::resolver::PoolViewResolver;
use crate::session::NetworkContext;
use crate::types::{PoolId, PriceSelector, TokenPairView};

/// What collaborators render
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    /// Nothing requested yet
    Idle,
    /// Waiting for a wallet to connect
    AwaitingWallet { pool: PoolId },
    /// Resolution in flight; never shows stale or zero-valued data
    Loading { pool: PoolId, selector: PriceSelector },
    Ready(TokenPairView),
    Failed {
        pool: PoolId,
        selector: PriceSelector,
        error: ResolutionError,
    },
}

impl ViewState {
    /// No resolution pending for this state
    pub fn is_settled(&self) -> bool {
        !matches!(self, ViewState::Idle | ViewState::Loading { .. })
    }

    pub fn view(&self) -> Option<&TokenPairView> {
        match self {
            ViewState::Ready(view) => Some(view),
            _ => None,
        }
    }
}

/// How a `request` was handled
#[derive(Debug)]
pub enum RequestOutcome {
    /// Selector applied to the ready view, no network I/O
    Reprojected,
    /// Folded into the resolution already in flight
    Coalesced,
    /// New resolution spawned
    Started(JoinHandle<()>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Request {
    pool: PoolId,
    selector: PriceSelector,
    wallets: Vec<(Address, u64)>,
}

#[derive(Default)]
struct Inner {
    generation: u64,
    current: Option<Request>,
    in_flight: Option<AbortHandle>,
}

pub struct PoolViewController {
    resolver: Arc<PoolViewResolver>,
    state_tx: watch::Sender<ViewState>,
    inner: Mutex<Inner>,
}

impl PoolViewController {
    pub fn new(resolver: Arc<PoolViewResolver>) -> Arc<Self> {
        let (state_tx, _) = watch::channel(ViewState::Idle);
        Arc::new(Self {
            resolver,
            state_tx,
            inner: Mutex::new(Inner::default()),
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state_tx.subscribe()
    }

    pub fn state(&self) -> ViewState {
        self.state_tx.borrow().clone()
    }

    /// Generation of the most recently started resolution
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Wait until the current request settles
    pub async fn settled(&self) -> ViewState {
        let mut rx = self.subscribe();
        loop {
            {
                let state = rx.borrow_and_update();
                if state.is_settled() {
                    return state.clone();
                }
            }
            if rx.changed().await.is_err() {
                return self.state();
            }
        }
    }

    pub fn request(
        self: &Arc<Self>,
        pool: PoolId,
        selector: PriceSelector,
        network: NetworkContext,
    ) -> RequestOutcome {
        let request = Request {
            pool,
            selector,
            wallets: network.wallet_key(),
        };
        let mut inner = self.lock();

        let same_target = inner
            .current
            .as_ref()
            .map(|c| c.pool == pool && c.wallets == request.wallets)
            .unwrap_or(false);

        if same_target {
            let state = self.state();
            match state {
                ViewState::Loading { .. } => {
                    debug!("Coalescing request for {} ({}) into in-flight resolution", pool, selector);
                    inner.current = Some(request);
                    self.state_tx.send_replace(ViewState::Loading { pool, selector });
                    return RequestOutcome::Coalesced;
                }
                ViewState::Ready(view) if view.id == pool => {
                    if view.selector != selector {
                        debug!("Re-projecting {} onto {}", pool, selector);
                    }
                    inner.current = Some(request);
                    self.state_tx
                        .send_replace(ViewState::Ready(view.with_selector(selector)));
                    return RequestOutcome::Reprojected;
                }
                _ => {}
            }
        }

        inner.generation += 1;
        let generation = inner.generation;
        if let Some(previous) = inner.in_flight.take() {
            debug!("Aborting superseded resolution (generation {})", generation - 1);
            previous.abort();
        }
        inner.current = Some(request);
        self.state_tx.send_replace(ViewState::Loading { pool, selector });

        let this = Arc::clone(self);
        let task = tokio::spawn(async move {
            let result = this.resolver.resolve(pool, selector, &network).await;
            this.finish(generation, result);
        });
        inner.in_flight = Some(task.abort_handle());

        RequestOutcome::Started(task)
    }

    /// Publish a finished resolution if it is still the current one.
    ///
    /// Returns `false` when the result was stale and dropped.
    pub fn finish(
        &self,
        generation: u64,
        result: Result<TokenPairView, ResolutionError>,
    ) -> bool {
        let mut inner = self.lock();
        if generation != inner.generation {
            debug!(
                "Dropping stale resolution (generation {}, current {})",
                generation, inner.generation
            );
            return false;
        }
        let Some(current) = inner.current.clone() else {
            return false;
        };
        inner.in_flight = None;

        let state = match result {
            // The selector may have moved while loading
            Ok(view) => ViewState::Ready(view.with_selector(current.selector)),
            Err(ResolutionError::NotReady) => {
                info!("⏳ Waiting for a wallet before resolving {}", current.pool);
                ViewState::AwaitingWallet { pool: current.pool }
            }
            Err(error) => ViewState::Failed {
                pool: current.pool,
                selector: current.selector,
                error,
            },
        };
        self.state_tx.send_replace(state);
        true
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
