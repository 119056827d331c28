//! Multi-step workflows: acquire tokens, then provide liquidity.

use std::sync::Arc;

use bigdecimal::BigDecimal;
use ethers::types::{Address, TxHash, U256};
use tracing::{info, warn};

use crate::config::{NativeWrap, VenueRegistry};
use crate::dex::{LiquidityManager, PairResolver, SwapRouter};
use crate::errors::{AmmError, Result};
use crate::models::{Venue, WorkflowConfig};
use crate::token::TokenAccountant;

/// How a token was acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquisition {
    Wrapped(TxHash),
    Swapped(TxHash),
}

/// Input of [`RouteExecutor::buy_tokens_and_add_liq`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvisionRequest {
    /// Factory whose router sells `token0`.
    pub factory0: Address,
    /// Factory whose router sells `token1`.
    pub factory1: Address,
    /// Factory of the pool receiving the liquidity.
    pub target_factory: Address,
    pub token0: Address,
    pub token0_opposite: Address,
    pub token1: Address,
    pub token1_opposite: Address,
    /// Amount of `token0_opposite` sold when `token0` has to be bought.
    pub amount0: U256,
    /// Amount of `token1_opposite` sold when `token1` has to be bought.
    pub amount1: U256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvisionOutcome {
    pub pool: Address,
    /// LP tokens gained by the signer.
    pub lp_minted: U256,
}

pub struct RouteExecutor {
    tokens: Arc<TokenAccountant>,
    swaps: SwapRouter,
    liquidity: LiquidityManager,
    resolver: PairResolver,
    venues: VenueRegistry,
    native: NativeWrap,
}

impl RouteExecutor {
    pub fn new(
        tokens: Arc<TokenAccountant>,
        swaps: SwapRouter,
        liquidity: LiquidityManager,
        resolver: PairResolver,
        venues: VenueRegistry,
        native: NativeWrap,
    ) -> Self {
        Self {
            tokens,
            swaps,
            liquidity,
            resolver,
            venues,
            native,
        }
    }

    /// Wraps native coin when `token` is the wrapper, otherwise sells
    /// `amount` of `opposite` for `token` on `venue`.
    ///
    /// Refuses with `NeedsFunding` when the signer holds no `opposite`; the
    /// funding token is never acquired recursively.
    pub async fn acquire_token(
        &self,
        signer: Address,
        venue: &Venue,
        token: Address,
        amount: U256,
        opposite: Address,
        workflow: WorkflowConfig,
    ) -> Result<Acquisition> {
        if token == self.native.wrapper {
            let tx = self
                .tokens
                .wrap_native(
                    signer,
                    self.native.wrapper,
                    self.native.reserve_amount,
                    workflow.confirmation,
                )
                .await?;
            return Ok(Acquisition::Wrapped(tx));
        }

        let funding = self.tokens.balance_of(opposite, signer).await?;
        if funding.is_zero() {
            let symbol = self.tokens.symbol_of(opposite).await?;
            warn!(%symbol, ?signer, "[ROUTE] signer has no funding token");
            return Err(AmmError::NeedsFunding {
                token: opposite,
                symbol,
            });
        }
        let tx = self
            .swaps
            .swap_exact_in(signer, &[opposite, token], amount, signer, venue, workflow)
            .await?;
        Ok(Acquisition::Swapped(tx))
    }

    /// Acquires `token` regardless of what the signer already holds.
    pub async fn buy_token(
        &self,
        signer: Address,
        venue: &Venue,
        token: Address,
        amount: U256,
        opposite: Address,
        workflow: WorkflowConfig,
    ) -> Result<Acquisition> {
        let handle = self.tokens.token(token).await?;
        let before = self.tokens.balance_of(token, signer).await?;
        info!(
            symbol = %handle.symbol,
            %amount,
            balance = %handle.to_human(before),
            "[ROUTE] try to buy"
        );
        self.acquire_token(signer, venue, token, amount, opposite, workflow)
            .await
    }

    /// Makes sure the signer holds both tokens, then deposits its whole
    /// balance of each into the `target_factory` pool.
    pub async fn buy_tokens_and_add_liq(
        &self,
        signer: Address,
        request: ProvisionRequest,
        workflow: WorkflowConfig,
    ) -> Result<ProvisionOutcome> {
        let legs = [
            (request.token0, request.token0_opposite, request.factory0, request.amount0),
            (request.token1, request.token1_opposite, request.factory1, request.amount1),
        ];
        for (token, opposite, factory, amount) in legs {
            // any existing balance satisfies the precondition
            if !self.tokens.balance_of(token, signer).await?.is_zero() {
                info!(?token, "[ROUTE] already held, skipping acquisition");
                continue;
            }
            let venue = self.venues.by_factory(factory)?;
            self.acquire_token(signer, venue, token, amount, opposite, workflow)
                .await?;
        }

        let target = self.venues.by_factory(request.target_factory)?;
        let pool_before = self
            .resolver
            .resolve_pair(request.token0, request.token1, target.factory, target.variant)
            .await?;
        let lp_before = match pool_before {
            Some(pool) => self.tokens.balance_of(pool, signer).await?,
            None => U256::zero(),
        };

        let amount0 = self.tokens.balance_of(request.token0, signer).await?;
        let amount1 = self.tokens.balance_of(request.token1, signer).await?;
        let pool = self
            .liquidity
            .add_liquidity(
                signer,
                request.token0,
                request.token1,
                amount0,
                amount1,
                target,
                workflow,
            )
            .await?;

        let lp_after = self.tokens.balance_of(pool, signer).await?;
        let lp_minted = lp_after.saturating_sub(lp_before);
        // the deposit already landed: metadata failures only degrade the log line
        match lp_label(&self.tokens, pool, lp_minted).await {
            Ok((name, minted)) => info!(%name, ?pool, %minted, "[ROUTE] add liq"),
            Err(e) => {
                warn!(?pool, %lp_minted, error = %e, "[ROUTE] add liq (LP metadata unreadable)")
            }
        }
        Ok(ProvisionOutcome { pool, lp_minted })
    }
}

async fn lp_label(
    tokens: &TokenAccountant,
    pool: Address,
    raw: U256,
) -> Result<(String, BigDecimal)> {
    let name = tokens.name_of(pool).await?;
    let minted = tokens.to_human(pool, raw).await?;
    Ok((name, minted))
}
