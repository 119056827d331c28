use std::sync::Arc;

use ethers::types::{Address, TxHash, U256};
use tracing::info;

use super::{PairResolver, adapter_for};
use crate::chain::{ChainClient, LiquidityDeposit, LiquidityWithdrawal};
use crate::errors::Result;
use crate::models::{Venue, WorkflowConfig};
use crate::token::TokenAccountant;

/// Minimum accepted amount of each underlying token: effectively unbounded slippage.
const MIN_UNDERLYING: u64 = 1;

/// Deposits into and withdrawals from a venue's pools.
#[derive(Clone)]
pub struct LiquidityManager {
    chain: Arc<dyn ChainClient>,
    tokens: Arc<TokenAccountant>,
    resolver: PairResolver,
}

impl LiquidityManager {
    pub fn new(
        chain: Arc<dyn ChainClient>,
        tokens: Arc<TokenAccountant>,
        resolver: PairResolver,
    ) -> Self {
        Self {
            chain,
            tokens,
            resolver,
        }
    }

    /// Deposits `amount_a`/`amount_b` and returns the pool address, resolved
    /// after the deposit since a standard router may just have created it.
    #[allow(clippy::too_many_arguments)]
    pub async fn add_liquidity(
        &self,
        sender: Address,
        token_a: Address,
        token_b: Address,
        amount_a: U256,
        amount_b: U256,
        venue: &Venue,
        workflow: WorkflowConfig,
    ) -> Result<Address> {
        self.tokens
            .ensure_balance(token_a, sender, amount_a)
            .await?;
        self.tokens
            .ensure_balance(token_b, sender, amount_b)
            .await?;

        self.tokens
            .approve(token_a, sender, venue.router, amount_a, workflow.confirmation)
            .await?;
        self.tokens
            .approve(token_b, sender, venue.router, amount_b, workflow.confirmation)
            .await?;

        let deposit = LiquidityDeposit {
            token_a,
            token_b,
            amount_a,
            amount_b,
            amount_a_min: U256::from(MIN_UNDERLYING),
            amount_b_min: U256::from(MIN_UNDERLYING),
            to: sender,
            deadline: workflow.deadline.resolve(),
        };
        let tx = adapter_for(venue.variant)
            .add_liquidity(self.chain.as_ref(), venue, sender, &deposit, workflow)
            .await?;

        let pool = self
            .resolver
            .require_pair(token_a, token_b, venue.factory, venue.variant)
            .await?;
        info!(venue = %venue.label, ?pool, %amount_a, %amount_b, ?tx, "[LIQ] liquidity added");
        Ok(pool)
    }

    /// Burns `lp_amount` of `lp_token` for the underlying `token_a`/`token_b`.
    #[allow(clippy::too_many_arguments)]
    pub async fn remove_liquidity(
        &self,
        sender: Address,
        lp_token: Address,
        token_a: Address,
        token_b: Address,
        lp_amount: U256,
        venue: &Venue,
        workflow: WorkflowConfig,
    ) -> Result<TxHash> {
        self.tokens
            .ensure_balance(lp_token, sender, lp_amount)
            .await?;
        self.tokens
            .approve(lp_token, sender, venue.router, lp_amount, workflow.confirmation)
            .await?;
        let withdrawal = LiquidityWithdrawal {
            token_a,
            token_b,
            liquidity: lp_amount,
            amount_a_min: U256::from(MIN_UNDERLYING),
            amount_b_min: U256::from(MIN_UNDERLYING),
            to: sender,
            deadline: workflow.deadline.resolve(),
        };
        let tx = adapter_for(venue.variant)
            .remove_liquidity(self.chain.as_ref(), venue, sender, &withdrawal, workflow)
            .await?;
        info!(venue = %venue.label, ?lp_token, %lp_amount, ?tx, "[LIQ] liquidity removed");
        Ok(tx)
    }
}
