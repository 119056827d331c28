use std::sync::Arc;

use async_trait::async_trait;
use ethers::{
    abi::Detokenize,
    contract::{ContractCall, ContractError},
    providers::{Http, Middleware, Provider, ProviderError},
    types::{Address, TxHash, U64, U256},
};
use tracing::{debug, warn};

use super::{ChainClient, LiquidityDeposit, LiquidityWithdrawal, NativeSwap, PathSwap, PoolSwap};
use crate::errors::{AmmError, Result};
use crate::models::{ConfirmationPolicy, TierParams};

mod token {
    use ethers::contract::abigen;

    abigen!(
        Erc20Token,
        r"[
            function balanceOf(address owner) view returns (uint256)
            function decimals() view returns (uint8)
            function symbol() view returns (string)
            function name() view returns (string)
            function approve(address spender, uint256 amount) returns (bool)
        ]",
    );

    abigen!(
        WrappedNative,
        r"[
            function deposit() payable
        ]",
    );
}

mod standard {
    use ethers::contract::abigen;

    abigen!(
        UniswapV2Factory,
        r"[
            function getPair(address tokenA, address tokenB) view returns (address)
        ]",
    );

    abigen!(
        UniswapV2Pair,
        r"[
            function token0() view returns (address)
            function token1() view returns (address)
            function getReserves() view returns (uint112 reserve0, uint112 reserve1, uint32 blockTimestampLast)
        ]",
    );

    abigen!(
        UniswapV2Router,
        r"[
            function swapExactTokensForTokens(uint256 amountIn, uint256 amountOutMin, address[] path, address to, uint256 deadline) returns (uint256[] amounts)
            function swapETHForExactTokens(uint256 amountOut, address[] path, address to, uint256 deadline) payable returns (uint256[] amounts)
            function addLiquidity(address tokenA, address tokenB, uint256 amountADesired, uint256 amountBDesired, uint256 amountAMin, uint256 amountBMin, address to, uint256 deadline) returns (uint256 amountA, uint256 amountB, uint256 liquidity)
            function removeLiquidity(address tokenA, address tokenB, uint256 liquidity, uint256 amountAMin, uint256 amountBMin, address to, uint256 deadline) returns (uint256 amountA, uint256 amountB)
        ]",
    );
}

mod extended {
    use ethers::contract::abigen;

    abigen!(
        TieredFactory,
        r"[
            function getPair(address tokenA, address tokenB, uint32 tierA, uint32 tierB) view returns (address)
        ]",
    );

    abigen!(
        TieredRouter,
        r"[
            function swapExactTokensForTokens(address tokenIn, address tokenOut, uint256 amountIn, uint256 amountOutMin, address[] path, address to, uint256 deadline) returns (uint256[] amounts)
            function addLiquidity(address pair, address tokenA, address tokenB, uint256 amountADesired, uint256 amountBDesired, uint256 amountAMin, uint256 amountBMin, address to, uint256 deadline) returns (uint256 amountA, uint256 amountB, uint256 liquidity)
        ]",
    );
}

use extended::{TieredFactory, TieredRouter};
use standard::{UniswapV2Factory, UniswapV2Pair, UniswapV2Router};
use token::{Erc20Token, WrappedNative};

/// JSON-RPC backed [`ChainClient`].
///
/// Transactions are sent with an explicit `from`, so the node must be able to
/// sign for the sender (unlocked dev-node accounts).
#[derive(Clone)]
pub struct EthersChain<M = Provider<Http>> {
    client: Arc<M>,
}

impl EthersChain<Provider<Http>> {
    pub fn connect(rpc_url: &str) -> Result<Self> {
        let provider = Provider::<Http>::try_from(rpc_url)?;
        Ok(Self::new(Arc::new(provider)))
    }
}

impl<M> EthersChain<M>
where
    M: Middleware<Error = ProviderError> + 'static,
{
    pub fn new(client: Arc<M>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> Arc<M> {
        self.client.clone()
    }

    async fn submit<D>(
        &self,
        call: ContractCall<M, D>,
        from: Address,
        policy: ConfirmationPolicy,
    ) -> Result<TxHash>
    where
        D: Detokenize + Send + Sync,
    {
        let call = call.from(from);
        let pending = call.send().await.map_err(classify)?;
        let tx_hash = pending.tx_hash();
        debug!(?tx_hash, ?from, ?policy, "[TX] submitted");
        if policy == ConfirmationPolicy::FireAndForget {
            return Ok(tx_hash);
        }
        match pending.await? {
            None => {
                warn!(?tx_hash, "[TX] dropped before inclusion");
                Err(AmmError::TransactionDropped(tx_hash))
            }
            Some(receipt) if receipt.status == Some(U64::zero()) => {
                warn!(?tx_hash, block = ?receipt.block_number, "[TX] reverted");
                Err(AmmError::TransactionReverted(tx_hash))
            }
            Some(receipt) => {
                debug!(?tx_hash, block = ?receipt.block_number, "[TX] included");
                Ok(tx_hash)
            }
        }
    }
}

/// Transport failures surface as `Provider`, everything the contract side
/// produced (reverts, decoding) as `Contract`.
fn classify<M>(err: ContractError<M>) -> AmmError
where
    M: Middleware<Error = ProviderError>,
{
    match err {
        ContractError::MiddlewareError { e } | ContractError::ProviderError { e } => {
            AmmError::Provider(e)
        }
        ContractError::DecodingError(e) => AmmError::Contract(ContractError::DecodingError(e)),
        ContractError::AbiError(e) => AmmError::Contract(ContractError::AbiError(e)),
        ContractError::DetokenizationError(e) => {
            AmmError::Contract(ContractError::DetokenizationError(e))
        }
        ContractError::Revert(data) => AmmError::Contract(ContractError::Revert(data)),
        ContractError::ConstructorError => AmmError::Contract(ContractError::ConstructorError),
        ContractError::ContractNotDeployed => {
            AmmError::Contract(ContractError::ContractNotDeployed)
        }
    }
}

#[async_trait]
impl<M> ChainClient for EthersChain<M>
where
    M: Middleware<Error = ProviderError> + 'static,
{
    async fn native_balance(&self, owner: Address) -> Result<U256> {
        Ok(self.client.get_balance(owner, None).await?)
    }

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256> {
        let erc20 = Erc20Token::new(token, self.client.clone());
        erc20.balance_of(owner).call().await.map_err(classify)
    }

    async fn decimals(&self, token: Address) -> Result<u8> {
        let erc20 = Erc20Token::new(token, self.client.clone());
        erc20.decimals().call().await.map_err(classify)
    }

    async fn symbol(&self, token: Address) -> Result<String> {
        let erc20 = Erc20Token::new(token, self.client.clone());
        erc20.symbol().call().await.map_err(classify)
    }

    async fn name(&self, token: Address) -> Result<String> {
        let erc20 = Erc20Token::new(token, self.client.clone());
        erc20.name().call().await.map_err(classify)
    }

    async fn approve(
        &self,
        owner: Address,
        token: Address,
        spender: Address,
        amount: U256,
        policy: ConfirmationPolicy,
    ) -> Result<TxHash> {
        let erc20 = Erc20Token::new(token, self.client.clone());
        self.submit(erc20.approve(spender, amount), owner, policy)
            .await
    }

    async fn deposit_native(
        &self,
        owner: Address,
        wrapper: Address,
        amount: U256,
        policy: ConfirmationPolicy,
    ) -> Result<TxHash> {
        let weth = WrappedNative::new(wrapper, self.client.clone());
        self.submit(weth.deposit().value(amount), owner, policy)
            .await
    }

    async fn pair_tokens(&self, pool: Address) -> Result<(Address, Address)> {
        let pair = UniswapV2Pair::new(pool, self.client.clone());
        let token0 = pair.token_0().call().await.map_err(classify)?;
        let token1 = pair.token_1().call().await.map_err(classify)?;
        Ok((token0, token1))
    }

    async fn get_reserves(&self, pool: Address) -> Result<(U256, U256, u32)> {
        let pair = UniswapV2Pair::new(pool, self.client.clone());
        let (reserve0, reserve1, ts) = pair.get_reserves().call().await.map_err(classify)?;
        Ok((U256::from(reserve0), U256::from(reserve1), ts))
    }

    async fn get_pair(
        &self,
        factory: Address,
        token_a: Address,
        token_b: Address,
    ) -> Result<Address> {
        let factory = UniswapV2Factory::new(factory, self.client.clone());
        factory
            .get_pair(token_a, token_b)
            .call()
            .await
            .map_err(classify)
    }

    async fn get_tiered_pair(
        &self,
        factory: Address,
        token_a: Address,
        token_b: Address,
        tier: TierParams,
    ) -> Result<Address> {
        let factory = TieredFactory::new(factory, self.client.clone());
        factory
            .get_pair(token_a, token_b, tier.tier_a, tier.tier_b)
            .call()
            .await
            .map_err(classify)
    }

    async fn swap_along_path(
        &self,
        from: Address,
        router: Address,
        swap: &PathSwap,
        policy: ConfirmationPolicy,
    ) -> Result<TxHash> {
        let router = UniswapV2Router::new(router, self.client.clone());
        let call = router.swap_exact_tokens_for_tokens(
            swap.amount_in,
            swap.amount_out_min,
            swap.path.clone(),
            swap.to,
            swap.deadline,
        );
        self.submit(call, from, policy).await
    }

    async fn swap_through_pools(
        &self,
        from: Address,
        router: Address,
        swap: &PoolSwap,
        policy: ConfirmationPolicy,
    ) -> Result<TxHash> {
        let router = TieredRouter::new(router, self.client.clone());
        let call = router.swap_exact_tokens_for_tokens(
            swap.token_in,
            swap.token_out,
            swap.amount_in,
            swap.amount_out_min,
            swap.pools.clone(),
            swap.to,
            swap.deadline,
        );
        self.submit(call, from, policy).await
    }

    async fn swap_native_for_exact_tokens(
        &self,
        from: Address,
        router: Address,
        swap: &NativeSwap,
        policy: ConfirmationPolicy,
    ) -> Result<TxHash> {
        let router = UniswapV2Router::new(router, self.client.clone());
        let call = router
            .swap_eth_for_exact_tokens(swap.amount_out, swap.path.clone(), swap.to, swap.deadline)
            .value(swap.value);
        self.submit(call, from, policy).await
    }

    async fn add_liquidity(
        &self,
        from: Address,
        router: Address,
        deposit: &LiquidityDeposit,
        policy: ConfirmationPolicy,
    ) -> Result<TxHash> {
        let router = UniswapV2Router::new(router, self.client.clone());
        let call = router.add_liquidity(
            deposit.token_a,
            deposit.token_b,
            deposit.amount_a,
            deposit.amount_b,
            deposit.amount_a_min,
            deposit.amount_b_min,
            deposit.to,
            deposit.deadline,
        );
        self.submit(call, from, policy).await
    }

    async fn add_liquidity_to_pool(
        &self,
        from: Address,
        router: Address,
        pool: Address,
        deposit: &LiquidityDeposit,
        policy: ConfirmationPolicy,
    ) -> Result<TxHash> {
        let router = TieredRouter::new(router, self.client.clone());
        let call = router.add_liquidity(
            pool,
            deposit.token_a,
            deposit.token_b,
            deposit.amount_a,
            deposit.amount_b,
            deposit.amount_a_min,
            deposit.amount_b_min,
            deposit.to,
            deposit.deadline,
        );
        self.submit(call, from, policy).await
    }

    async fn remove_liquidity(
        &self,
        from: Address,
        router: Address,
        withdrawal: &LiquidityWithdrawal,
        policy: ConfirmationPolicy,
    ) -> Result<TxHash> {
        // both router shapes share this entry point
        let router = UniswapV2Router::new(router, self.client.clone());
        let call = router.remove_liquidity(
            withdrawal.token_a,
            withdrawal.token_b,
            withdrawal.liquidity,
            withdrawal.amount_a_min,
            withdrawal.amount_b_min,
            withdrawal.to,
            withdrawal.deadline,
        );
        self.submit(call, from, policy).await
    }
}
