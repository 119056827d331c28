use std::sync::Arc;

use ethers::types::{Address, TxHash, U256};
use tracing::info;

use super::adapter_for;
use crate::chain::{ChainClient, NativeSwap};
use crate::errors::{AmmError, Result};
use crate::models::{ProtocolVariant, Venue, WorkflowConfig};
use crate::token::TokenAccountant;
use crate::utils::format_units;

/// Native coin left untouched by [`SwapRouter::swap_native_for_exact_tokens`] to pay for gas.
const NATIVE_GAS_RESERVE: u64 = 100_000_000_000_000_000;

/// Exact-input swaps through a venue's router.
///
/// No slippage protection: the output floor is always zero.
#[derive(Clone)]
pub struct SwapRouter {
    chain: Arc<dyn ChainClient>,
    tokens: Arc<TokenAccountant>,
}

impl SwapRouter {
    pub fn new(chain: Arc<dyn ChainClient>, tokens: Arc<TokenAccountant>) -> Self {
        Self { chain, tokens }
    }

    /// Sells exactly `amount_in` of `route[0]` along `route`.
    ///
    /// Order of effects: route check, balance check, exact approval, swap.
    pub async fn swap_exact_in(
        &self,
        sender: Address,
        route: &[Address],
        amount_in: U256,
        recipient: Address,
        venue: &Venue,
        workflow: WorkflowConfig,
    ) -> Result<TxHash> {
        let adapter = adapter_for(venue.variant);
        adapter.validate_route(route)?;
        let token_in = route[0];
        self.tokens
            .ensure_balance(token_in, sender, amount_in)
            .await?;
        self.tokens
            .approve(token_in, sender, venue.router, amount_in, workflow.confirmation)
            .await?;
        let tx = adapter
            .swap_exact_in(
                self.chain.as_ref(),
                venue,
                sender,
                route,
                amount_in,
                recipient,
                workflow,
            )
            .await?;
        info!(
            venue = %venue.label,
            hops = route.len() - 1,
            %amount_in,
            ?tx,
            "[SWAP] exact-in swap sent"
        );
        Ok(tx)
    }

    /// Buys exactly `amount_out` of the last token of `path`, paying with the
    /// sender's native balance minus a 0.1 coin gas reserve. Standard venues only.
    pub async fn swap_native_for_exact_tokens(
        &self,
        sender: Address,
        path: &[Address],
        amount_out: U256,
        venue: &Venue,
        workflow: WorkflowConfig,
    ) -> Result<TxHash> {
        if venue.variant != ProtocolVariant::Standard || path.len() < 2 {
            return Err(AmmError::UnsupportedRoute {
                variant: venue.variant,
                len: path.len(),
            });
        }
        let reserve = U256::from(NATIVE_GAS_RESERVE);
        let native = self.chain.native_balance(sender).await?;
        if native <= reserve {
            return Err(AmmError::InsufficientBalance {
                symbol: "native".to_string(),
                required: format_units(reserve, 18),
                available: format_units(native, 18),
                shortfall: format_units(reserve - native, 18),
            });
        }
        let swap = NativeSwap {
            value: native - reserve,
            amount_out,
            path: path.to_vec(),
            to: sender,
            deadline: workflow.deadline.resolve(),
        };
        let tx = self
            .chain
            .swap_native_for_exact_tokens(sender, venue.router, &swap, workflow.confirmation)
            .await?;
        info!(venue = %venue.label, value = %format_units(swap.value, 18), %amount_out, ?tx, "[SWAP] native swap sent");
        Ok(tx)
    }
}
