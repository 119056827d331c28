use async_trait::async_trait;
use ethers::types::{Address, TxHash, U256};

use super::ProtocolAdapter;
use crate::chain::{ChainClient, LiquidityDeposit, PathSwap};
use crate::errors::Result;
use crate::models::{ProtocolVariant, Venue, WorkflowConfig};

/// Two-sided router/factory: pools keyed by the token pair, multi-hop paths
/// go straight to the router.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardAdapter;

#[async_trait]
impl ProtocolAdapter for StandardAdapter {
    fn variant(&self) -> ProtocolVariant {
        ProtocolVariant::Standard
    }

    async fn lookup_pair(
        &self,
        chain: &dyn ChainClient,
        factory: Address,
        token_a: Address,
        token_b: Address,
    ) -> Result<Address> {
        chain.get_pair(factory, token_a, token_b).await
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
        let swap = PathSwap {
            amount_in,
            amount_out_min: U256::zero(),
            path: route.to_vec(),
            to: recipient,
            deadline: workflow.deadline.resolve(),
        };
        chain
            .swap_along_path(sender, venue.router, &swap, workflow.confirmation)
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
        chain
            .add_liquidity(sender, venue.router, deposit, workflow.confirmation)
            .await
    }
}
