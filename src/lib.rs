//! Unified interaction layer for router/factory AMM venues.
//!
//! One API over two protocol shapes: the standard two-sided router/factory
//! and the extended, tiered one. Token bookkeeping lives in [`token`], pool
//! lookup, reserves, swaps and liquidity in [`dex`], and the multi-step
//! acquisition workflows in [`executor`]. Every remote call goes through the
//! [`chain::ChainClient`] seam.

pub mod chain;
pub mod config;
pub mod dex;
pub mod errors;
pub mod executor;
pub mod models;
pub mod token;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;
