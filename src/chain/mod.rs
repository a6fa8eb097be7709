//! On-chain reads: VIX pair data, pool proxy mapping, token prices

mod contracts;
mod reader;

pub use reader::{ChainReader, RpcChainReader};
