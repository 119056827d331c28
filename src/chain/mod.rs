//! Remote-call seam.
//!
//! [`ChainClient`] lists every raw contract call the layer needs: ERC20 reads
//! and approvals, pair/factory reads, and the router entry points of both
//! protocol shapes. Mutating calls take the sending address and a
//! [`ConfirmationPolicy`] and return the transaction hash.

use async_trait::async_trait;
use ethers::types::{Address, TxHash, U256};

use crate::errors::Result;
use crate::models::{ConfirmationPolicy, TierParams};

pub mod client;

pub use client::EthersChain;

/// `swapExactTokensForTokens(amountIn, amountOutMin, path, to, deadline)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSwap {
    pub amount_in: U256,
    pub amount_out_min: U256,
    pub path: Vec<Address>,
    pub to: Address,
    pub deadline: U256,
}

/// `swapExactTokensForTokens(tokenIn, tokenOut, amountIn, amountOutMin, pools, to, deadline)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSwap {
    pub token_in: Address,
    pub token_out: Address,
    pub amount_in: U256,
    pub amount_out_min: U256,
    pub pools: Vec<Address>,
    pub to: Address,
    pub deadline: U256,
}

/// `swapETHForExactTokens(amountOut, path, to, deadline)` paying `value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeSwap {
    pub value: U256,
    pub amount_out: U256,
    pub path: Vec<Address>,
    pub to: Address,
    pub deadline: U256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiquidityDeposit {
    pub token_a: Address,
    pub token_b: Address,
    pub amount_a: U256,
    pub amount_b: U256,
    pub amount_a_min: U256,
    pub amount_b_min: U256,
    pub to: Address,
    pub deadline: U256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiquidityWithdrawal {
    pub token_a: Address,
    pub token_b: Address,
    pub liquidity: U256,
    pub amount_a_min: U256,
    pub amount_b_min: U256,
    pub to: Address,
    pub deadline: U256,
}

#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn native_balance(&self, owner: Address) -> Result<U256>;

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256>;
    async fn decimals(&self, token: Address) -> Result<u8>;
    async fn symbol(&self, token: Address) -> Result<String>;
    async fn name(&self, token: Address) -> Result<String>;

    async fn approve(
        &self,
        owner: Address,
        token: Address,
        spender: Address,
        amount: U256,
        policy: ConfirmationPolicy,
    ) -> Result<TxHash>;

    /// `deposit()` on the native-coin wrapper, paying `amount`.
    async fn deposit_native(
        &self,
        owner: Address,
        wrapper: Address,
        amount: U256,
        policy: ConfirmationPolicy,
    ) -> Result<TxHash>;

    /// `(token0, token1)` of a pool.
    async fn pair_tokens(&self, pool: Address) -> Result<(Address, Address)>;
    /// `(reserve0, reserve1, blockTimestampLast)` of a pool.
    async fn get_reserves(&self, pool: Address) -> Result<(U256, U256, u32)>;

    /// Standard factory `getPair(tokenA, tokenB)`. Zero address when absent.
    async fn get_pair(&self, factory: Address, token_a: Address, token_b: Address)
    -> Result<Address>;
    /// Extended factory `getPair(tokenA, tokenB, tierA, tierB)`. Zero address when absent.
    async fn get_tiered_pair(
        &self,
        factory: Address,
        token_a: Address,
        token_b: Address,
        tier: TierParams,
    ) -> Result<Address>;

    async fn swap_along_path(
        &self,
        from: Address,
        router: Address,
        swap: &PathSwap,
        policy: ConfirmationPolicy,
    ) -> Result<TxHash>;

    async fn swap_through_pools(
        &self,
        from: Address,
        router: Address,
        swap: &PoolSwap,
        policy: ConfirmationPolicy,
    ) -> Result<TxHash>;

    async fn swap_native_for_exact_tokens(
        &self,
        from: Address,
        router: Address,
        swap: &NativeSwap,
        policy: ConfirmationPolicy,
    ) -> Result<TxHash>;

    /// Standard router `addLiquidity`; the router creates the pool if needed.
    async fn add_liquidity(
        &self,
        from: Address,
        router: Address,
        deposit: &LiquidityDeposit,
        policy: ConfirmationPolicy,
    ) -> Result<TxHash>;

    /// Extended router `addLiquidity` into an existing `pool`.
    async fn add_liquidity_to_pool(
        &self,
        from: Address,
        router: Address,
        pool: Address,
        deposit: &LiquidityDeposit,
        policy: ConfirmationPolicy,
    ) -> Result<TxHash>;

    async fn remove_liquidity(
        &self,
        from: Address,
        router: Address,
        withdrawal: &LiquidityWithdrawal,
        policy: ConfirmationPolicy,
    ) -> Result<TxHash>;
}
