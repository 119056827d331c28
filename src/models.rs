//! Shared data structures used throughout the crate.

use std::fmt;
use std::time::SystemTime;

use bigdecimal::BigDecimal;
use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::utils::format_units;

/// Deadline sentinel far enough in the future that no router rejects it.
pub const FAR_FUTURE_DEADLINE: u64 = 1_000_000_000_000;

/// ERC20 token identity plus its immutable metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenHandle {
    pub address: Address,
    pub decimals: u8,
    pub symbol: String,
    pub name: String,
}

impl TokenHandle {
    /// Converts a raw base-unit amount of this token to its human form.
    pub fn to_human(&self, raw: U256) -> BigDecimal {
        format_units(raw, self.decimals)
    }
}

/// Fixed tier identifiers of an extended-protocol pool (e.g. weight and fee bucket).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TierParams {
    pub tier_a: u32,
    pub tier_b: u32,
}

impl TierParams {
    pub const fn new(tier_a: u32, tier_b: u32) -> Self {
        Self { tier_a, tier_b }
    }
}

/// Router/factory protocol shape of a venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProtocolVariant {
    /// Two-sided router/factory; pools keyed by the token pair only.
    Standard,
    /// Tiered router/factory; pools keyed by the token pair plus `tier`.
    Extended { tier: TierParams },
}

impl ProtocolVariant {
    pub fn name(&self) -> &'static str {
        match self {
            ProtocolVariant::Standard => "standard",
            ProtocolVariant::Extended { .. } => "extended",
        }
    }

    pub fn tier(&self) -> Option<TierParams> {
        match self {
            ProtocolVariant::Standard => None,
            ProtocolVariant::Extended { tier } => Some(*tier),
        }
    }

    /// Longest swap route the variant's router accepts, `None` when unbounded.
    pub fn max_route_len(&self) -> Option<usize> {
        match self {
            ProtocolVariant::Standard => None,
            ProtocolVariant::Extended { .. } => Some(2),
        }
    }
}

impl fmt::Display for ProtocolVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolVariant::Standard => f.write_str("standard"),
            ProtocolVariant::Extended { tier } => {
                write!(f, "extended({}/{})", tier.tier_a, tier.tier_b)
            }
        }
    }
}

/// One configured AMM deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Venue {
    pub label: String,
    pub factory: Address,
    pub router: Address,
    pub variant: ProtocolVariant,
}

/// A pool and its two tokens in protocol order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolHandle {
    pub address: Address,
    pub token0: Address,
    pub token1: Address,
}

impl PoolHandle {
    pub fn contains(&self, token: Address) -> bool {
        token == self.token0 || token == self.token1
    }

    /// Returns the other token of the pool, or `None` if `token` is not part of it.
    pub fn opposite(&self, token: Address) -> Option<Address> {
        if token == self.token0 {
            Some(self.token1)
        } else if token == self.token1 {
            Some(self.token0)
        } else {
            None
        }
    }
}

/// Point-in-time read of a pool's reserves. Never reuse across a mutating call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservesSnapshot {
    pub reserve0: U256,
    pub reserve1: U256,
    /// Pool-reported timestamp of the last reserve update.
    pub block_timestamp_last: u32,
    pub observed_at: SystemTime,
}

/// Pool composition seen from one of its tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct LpInfo {
    pub token_stacked: BigDecimal,
    pub opposite_token: Address,
    pub opposite_stacked: BigDecimal,
    /// Opposite-token units per target-token unit.
    pub price: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationPolicy {
    /// Return as soon as the node accepted the transaction.
    FireAndForget,
    /// Block until the transaction is mined.
    #[default]
    WaitForInclusion,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeadlineStrategy {
    #[default]
    FarFuture,
    /// Absolute unix timestamp in seconds.
    At(u64),
}

impl DeadlineStrategy {
    pub fn resolve(&self) -> U256 {
        match self {
            DeadlineStrategy::FarFuture => U256::from(FAR_FUTURE_DEADLINE),
            DeadlineStrategy::At(ts) => U256::from(*ts),
        }
    }
}

/// Per-operation execution settings, passed by value into every mutating call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkflowConfig {
    pub confirmation: ConfirmationPolicy,
    pub deadline: DeadlineStrategy,
}

impl WorkflowConfig {
    pub fn wait_for_inclusion() -> Self {
        Self {
            confirmation: ConfirmationPolicy::WaitForInclusion,
            deadline: DeadlineStrategy::FarFuture,
        }
    }

    pub fn fire_and_forget() -> Self {
        Self {
            confirmation: ConfirmationPolicy::FireAndForget,
            deadline: DeadlineStrategy::FarFuture,
        }
    }
}
