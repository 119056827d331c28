//! DEX integration for router/factory AMM venues.
//!
//! Both protocol shapes sit behind [`ProtocolAdapter`]; the managers in this
//! module only ever talk to the trait object returned by [`adapter_for`].

use async_trait::async_trait;
use ethers::types::{Address, TxHash, U256};

use crate::chain::{ChainClient, LiquidityDeposit, LiquidityWithdrawal};
use crate::errors::{AmmError, Result};
use crate::models::{ProtocolVariant, Venue, WorkflowConfig};

pub mod extended;
pub mod liquidity;
pub mod pair;
pub mod reserves;
pub mod standard;
pub mod swap;

pub use extended::ExtendedAdapter;
pub use liquidity::LiquidityManager;
pub use pair::{PairResolver, sort_tokens};
pub use reserves::{ReserveReader, encode_q112_price};
pub use standard::StandardAdapter;
pub use swap::SwapRouter;

/// Capabilities every protocol shape provides, expressed in its own call signatures.
#[async_trait]
pub trait ProtocolAdapter: Send + Sync {
    fn variant(&self) -> ProtocolVariant;

    /// Local route check; never touches the chain.
    fn validate_route(&self, route: &[Address]) -> Result<()> {
        let variant = self.variant();
        let too_long = variant.max_route_len().is_some_and(|max| route.len() > max);
        if route.len() < 2 || too_long {
            return Err(AmmError::UnsupportedRoute {
                variant,
                len: route.len(),
            });
        }
        Ok(())
    }

    /// Raw factory lookup. Zero address when the pool does not exist.
    async fn lookup_pair(
        &self,
        chain: &dyn ChainClient,
        factory: Address,
        token_a: Address,
        token_b: Address,
    ) -> Result<Address>;

    /// Calls the router's exact-input swap. Route, balance and allowance are
    /// already checked by the caller.
    #[allow(clippy::too_many_arguments)]
    async fn swap_exact_in(
        &self,
        chain: &dyn ChainClient,
        venue: &Venue,
        sender: Address,
        route: &[Address],
        amount_in: U256,
        recipient: Address,
        workflow: WorkflowConfig,
    ) -> Result<TxHash>;

    async fn add_liquidity(
        &self,
        chain: &dyn ChainClient,
        venue: &Venue,
        sender: Address,
        deposit: &LiquidityDeposit,
        workflow: WorkflowConfig,
    ) -> Result<TxHash>;

    async fn remove_liquidity(
        &self,
        chain: &dyn ChainClient,
        venue: &Venue,
        sender: Address,
        withdrawal: &LiquidityWithdrawal,
        workflow: WorkflowConfig,
    ) -> Result<TxHash> {
        chain
            .remove_liquidity(sender, venue.router, withdrawal, workflow.confirmation)
            .await
    }
}

pub fn adapter_for(variant: ProtocolVariant) -> Box<dyn ProtocolAdapter> {
    match variant {
        ProtocolVariant::Standard => Box::new(StandardAdapter),
        ProtocolVariant::Extended { tier } => Box::new(ExtendedAdapter::new(tier)),
    }
}
