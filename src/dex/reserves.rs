use std::collections::HashMap;
use std::sync::Arc;
use std::time::SystemTime;

use bigdecimal::BigDecimal;
use ethers::types::{Address, U256};
use num_traits::ToPrimitive;
use tokio::sync::RwLock;
use tracing::debug;

use crate::chain::ChainClient;
use crate::errors::{AmmError, Result};
use crate::models::{LpInfo, PoolHandle, ReservesSnapshot};
use crate::token::TokenAccountant;
use crate::utils::format_units;

/// `(reserve1 * 2^112 / reserve0, reserve0 * 2^112 / reserve1)`, the
/// cumulative-price oracle encoding. Integer arithmetic only.
pub fn encode_q112_price(reserve0: U256, reserve1: U256) -> Result<(U256, U256)> {
    if reserve0.is_zero() || reserve1.is_zero() {
        return Err(AmmError::ZeroReserve { reserve0, reserve1 });
    }
    let q112 = U256::one() << 112;
    let price0 = reserve1
        .checked_mul(q112)
        .ok_or(AmmError::Overflow("reserve1 * 2^112"))?
        / reserve0;
    let price1 = reserve0
        .checked_mul(q112)
        .ok_or(AmmError::Overflow("reserve0 * 2^112"))?
        / reserve1;
    Ok((price0, price1))
}

/// Decimal-normalized spot price of `target`, quoted in the opposite token.
pub fn spot_price_from(
    pool: &PoolHandle,
    reserves: &ReservesSnapshot,
    decimals0: u8,
    decimals1: u8,
    target: Address,
) -> Result<f64> {
    let (target_reserve, opposite_reserve) = normalized_sides(pool, reserves, decimals0, decimals1, target)?;
    price_of(&target_reserve, &opposite_reserve, reserves)
}

fn normalized_sides(
    pool: &PoolHandle,
    reserves: &ReservesSnapshot,
    decimals0: u8,
    decimals1: u8,
    target: Address,
) -> Result<(BigDecimal, BigDecimal)> {
    let reserve0 = format_units(reserves.reserve0, decimals0);
    let reserve1 = format_units(reserves.reserve1, decimals1);
    if target == pool.token0 {
        Ok((reserve0, reserve1))
    } else if target == pool.token1 {
        Ok((reserve1, reserve0))
    } else {
        Err(AmmError::TokenNotInPool {
            pool: pool.address,
            token: target,
        })
    }
}

fn price_of(target: &BigDecimal, opposite: &BigDecimal, reserves: &ReservesSnapshot) -> Result<f64> {
    if reserves.reserve0.is_zero() || reserves.reserve1.is_zero() {
        return Err(AmmError::ZeroReserve {
            reserve0: reserves.reserve0,
            reserve1: reserves.reserve1,
        });
    }
    (opposite / target)
        .to_f64()
        .ok_or(AmmError::Overflow("spot price does not fit in f64"))
}

/// Pool reads. Token order is cached per pool; reserves never are.
pub struct ReserveReader {
    chain: Arc<dyn ChainClient>,
    tokens: Arc<TokenAccountant>,
    pools: RwLock<HashMap<Address, PoolHandle>>,
}

impl ReserveReader {
    pub fn new(chain: Arc<dyn ChainClient>, tokens: Arc<TokenAccountant>) -> Self {
        Self {
            chain,
            tokens,
            pools: RwLock::new(HashMap::new()),
        }
    }

    pub async fn pool(&self, pool: Address) -> Result<PoolHandle> {
        if let Some(handle) = self.pools.read().await.get(&pool) {
            return Ok(*handle);
        }
        let (token0, token1) = self.chain.pair_tokens(pool).await?;
        let handle = PoolHandle {
            address: pool,
            token0,
            token1,
        };
        self.pools.write().await.insert(pool, handle);
        Ok(handle)
    }

    pub async fn read_reserves(&self, pool: Address) -> Result<ReservesSnapshot> {
        let (reserve0, reserve1, block_timestamp_last) = self.chain.get_reserves(pool).await?;
        debug!(?pool, %reserve0, %reserve1, "[RESERVES] read");
        Ok(ReservesSnapshot {
            reserve0,
            reserve1,
            block_timestamp_last,
            observed_at: SystemTime::now(),
        })
    }

    pub async fn spot_price(&self, pool: Address, target: Address) -> Result<f64> {
        let handle = self.pool(pool).await?;
        if !handle.contains(target) {
            return Err(AmmError::TokenNotInPool { pool, token: target });
        }
        let reserves = self.read_reserves(pool).await?;
        let decimals0 = self.tokens.decimals_of(handle.token0).await?;
        let decimals1 = self.tokens.decimals_of(handle.token1).await?;
        spot_price_from(&handle, &reserves, decimals0, decimals1, target)
    }

    /// Pool composition from the point of view of `target`.
    pub async fn lp_info(&self, pool: Address, target: Address) -> Result<LpInfo> {
        let handle = self.pool(pool).await?;
        let opposite_token = handle
            .opposite(target)
            .ok_or(AmmError::TokenNotInPool { pool, token: target })?;
        let reserves = self.read_reserves(pool).await?;
        let decimals0 = self.tokens.decimals_of(handle.token0).await?;
        let decimals1 = self.tokens.decimals_of(handle.token1).await?;
        let (token_stacked, opposite_stacked) =
            normalized_sides(&handle, &reserves, decimals0, decimals1, target)?;
        let price = price_of(&token_stacked, &opposite_stacked, &reserves)?;
        Ok(LpInfo {
            token_stacked,
            opposite_token,
            opposite_stacked,
            price,
        })
    }
}
