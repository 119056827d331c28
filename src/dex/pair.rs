use std::sync::Arc;

use ethers::types::Address;
use tracing::debug;

use super::adapter_for;
use crate::chain::ChainClient;
use crate::errors::{AmmError, Result};
use crate::models::ProtocolVariant;

/// Standard-variant token order: lower address first.
pub fn sort_tokens(token_a: Address, token_b: Address) -> (Address, Address) {
    if token_a < token_b {
        (token_a, token_b)
    } else {
        (token_b, token_a)
    }
}

/// Factory pool lookup for either protocol shape.
#[derive(Clone)]
pub struct PairResolver {
    chain: Arc<dyn ChainClient>,
}

impl PairResolver {
    pub fn new(chain: Arc<dyn ChainClient>) -> Self {
        Self { chain }
    }

    /// Returns `None` when the factory reports no pool (zero address).
    pub async fn resolve_pair(
        &self,
        token_a: Address,
        token_b: Address,
        factory: Address,
        variant: ProtocolVariant,
    ) -> Result<Option<Address>> {
        let pool = adapter_for(variant)
            .lookup_pair(self.chain.as_ref(), factory, token_a, token_b)
            .await?;
        debug!(?token_a, ?token_b, ?factory, %variant, ?pool, "[PAIR] resolved");
        Ok((!pool.is_zero()).then_some(pool))
    }

    pub async fn require_pair(
        &self,
        token_a: Address,
        token_b: Address,
        factory: Address,
        variant: ProtocolVariant,
    ) -> Result<Address> {
        self.resolve_pair(token_a, token_b, factory, variant)
            .await?
            .ok_or(AmmError::PoolNotFound {
                token_a,
                token_b,
                factory,
            })
    }
}
