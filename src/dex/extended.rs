use async_trait::async_trait;
use ethers::types::{Address, TxHash, U256};
use tracing::debug;

use super::ProtocolAdapter;
use crate::chain::{ChainClient, LiquidityDeposit, PoolSwap};
use crate::errors::{AmmError, Result};
use crate::models::{ProtocolVariant, TierParams, Venue, WorkflowConfig};

/// Tiered router/factory: pool lookup needs the configured tier, swaps and
/// deposits name the pool explicitly and only direct pairs are routable.
#[derive(Debug, Clone, Copy)]
pub struct ExtendedAdapter {
    tier: TierParams,
}

impl ExtendedAdapter {
    pub fn new(tier: TierParams) -> Self {
        Self { tier }
    }

    async fn existing_pool(
        &self,
        chain: &dyn ChainClient,
        factory: Address,
        token_a: Address,
        token_b: Address,
    ) -> Result<Address> {
        let pool = self.lookup_pair(chain, factory, token_a, token_b).await?;
        if pool.is_zero() {
            return Err(AmmError::PoolNotFound {
                token_a,
                token_b,
                factory,
            });
        }
        debug!(?pool, tier_a = self.tier.tier_a, tier_b = self.tier.tier_b, "[PAIR] tiered pool");
        Ok(pool)
    }
}

#[async_trait]
impl ProtocolAdapter for ExtendedAdapter {
    fn variant(&self) -> ProtocolVariant {
        ProtocolVariant::Extended { tier: self.tier }
    }

    async fn lookup_pair(
        &self,
        chain: &dyn ChainClient,
        factory: Address,
        token_a: Address,
        token_b: Address,
    ) -> Result<Address> {
        chain
            .get_tiered_pair(factory, token_a, token_b, self.tier)
            .await
    }

    async fn swap_exact_in(
        &self,
        chain: &dyn ChainClient,
        venue: &Venue,
        sender: Address,
        route: &[Address],
        amount_in: U256,
        recipient: Address,
        workflow: WorkflowConfig,
    ) -> Result<TxHash> {
        self.validate_route(route)?;
        let (token_in, token_out) = (route[0], route[1]);
        let pool = self
            .existing_pool(chain, venue.factory, token_in, token_out)
            .await?;
        let swap = PoolSwap {
            token_in,
            token_out,
            amount_in,
            amount_out_min: U256::zero(),
            pools: vec![pool],
            to: recipient,
            deadline: workflow.deadline.resolve(),
        };
        chain
            .swap_through_pools(sender, venue.router, &swap, workflow.confirmation)
            .await
    }

    async fn add_liquidity(
        &self,
        chain: &dyn ChainClient,
        venue: &Venue,
        sender: Address,
        deposit: &LiquidityDeposit,
        workflow: WorkflowConfig,
    ) -> Result<TxHash> {
        let pool = self
            .existing_pool(chain, venue.factory, deposit.token_a, deposit.token_b)
            .await?;
        chain
            .add_liquidity_to_pool(sender, venue.router, pool, deposit, workflow.confirmation)
            .await
    }
}
